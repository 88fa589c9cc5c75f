use async_trait::async_trait;

/// One fetched copy of the clinic listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub body: String,
    /// Final URL after redirects; embedded into the alert body
    pub resolved_url: String,
}

/// Port for fetching the clinic listing page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the current listing page
    async fn fetch_listing(&self) -> Result<ListingPage, Box<dyn std::error::Error + Send + Sync>>;
}
