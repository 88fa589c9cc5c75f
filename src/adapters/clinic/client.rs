use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{ListingPage, PageSource};

/// Page source backed by the live clinic search endpoint
pub struct ClinicPageClient {
    client: reqwest::Client,
    url: String,
    query: Vec<(String, String)>,
}

impl ClinicPageClient {
    pub fn new(
        url: impl Into<String>,
        query: Vec<(String, String)>,
        timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            query,
        })
    }

    /// Query string assembled verbatim; values like "50+miles" are what the
    /// endpoint expects and must not be re-encoded.
    fn request_url(&self) -> String {
        let params = self
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.url, params)
    }
}

#[async_trait]
impl PageSource for ClinicPageClient {
    async fn fetch_listing(&self) -> Result<ListingPage, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .client
            .get(self.request_url())
            .send()
            .await?
            .error_for_status()?;

        let resolved_url = response.url().to_string();
        let body = response.text().await?;
        Ok(ListingPage { body, resolved_url })
    }
}

/// Debug page source that replays a saved copy of the listing page
pub struct FixtureFileSource {
    path: PathBuf,
}

impl FixtureFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for FixtureFileSource {
    async fn fetch_listing(&self) -> Result<ListingPage, Box<dyn std::error::Error + Send + Sync>> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        Ok(ListingPage {
            body,
            resolved_url: format!("file://{}", self.path.display()),
        })
    }
}
