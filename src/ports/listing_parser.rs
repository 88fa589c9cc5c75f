use crate::domain::Snapshot;

/// Port for turning raw listing-page HTML into a site snapshot
pub trait ListingParser: Send + Sync {
    /// Parse the page. A block missing an expected field fails the whole
    /// parse rather than being silently skipped.
    fn parse(&self, html: &str) -> Result<Snapshot, Box<dyn std::error::Error + Send + Sync>>;
}
