use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No usable entries in {0}")]
    Empty(String),
}

/// Load the recipient list: first column of each non-empty row.
pub fn load_recipients(path: &Path) -> Result<Vec<String>, RosterError> {
    let content = fs::read_to_string(path)?;

    let recipients: Vec<String> = content
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect();

    if recipients.is_empty() {
        return Err(RosterError::Empty(path.display().to_string()));
    }
    Ok(recipients)
}

/// Load the SMTP password, trimmed. The caller must never log it.
pub fn load_password(path: &Path) -> Result<String, RosterError> {
    let content = fs::read_to_string(path)?;
    let password = content.trim();

    if password.is_empty() {
        return Err(RosterError::Empty(path.display().to_string()));
    }
    Ok(password.to_string())
}
