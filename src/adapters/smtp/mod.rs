mod mailer;
mod roster;

pub use mailer::SmtpMailer;
pub use roster::{load_password, load_recipients, RosterError};
