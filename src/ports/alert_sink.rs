use async_trait::async_trait;

/// A rendered alert ready for delivery
#[derive(Debug, Clone)]
pub struct Alert {
    pub subject: String,
    pub body: String,
    /// All recipients of the single message (one send, multiple To addresses)
    pub recipients: Vec<String>,
}

/// Port for delivering alerts
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
