use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::domain::classify;
use crate::ports::{Alert, AlertSink, ListingParser, PageSource, SnapshotStore};

const ALERT_SUBJECT: &str = "Vaccine Site Availability Alert";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Per-cycle failure taxonomy. Fetch, parse and delivery failures are
/// recoverable: the loop logs them and waits for the next poll. Store
/// failures are fatal - corrupt or unwritable history would silently break
/// "new since last known" detection, so the process stops instead.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[source] BoxError),

    #[error("parse failed: {0}")]
    Parse(#[source] BoxError),

    #[error("snapshot store failed: {0}")]
    Store(#[source] BoxError),

    #[error("delivery failed: {0}")]
    Delivery(#[source] BoxError),
}

impl CycleError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CycleError::Store(_))
    }
}

/// What one active cycle concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// New matches were found and the alert went out
    Alerted { new_sites: usize, old_sites: usize },
    /// Nothing notification-worthy this cycle
    NoChange,
}

/// Orchestrates one poll cycle and the long-running loop around it:
/// fetch, parse, persist, classify, notify.
pub struct WatcherService {
    page_source: Arc<dyn PageSource>,
    parser: Arc<dyn ListingParser>,
    store: Arc<dyn SnapshotStore>,
    sink: Arc<dyn AlertSink>,
    recipients: Vec<String>,
    config: Config,
}

impl WatcherService {
    pub fn new(
        page_source: Arc<dyn PageSource>,
        parser: Arc<dyn ListingParser>,
        store: Arc<dyn SnapshotStore>,
        sink: Arc<dyn AlertSink>,
        recipients: Vec<String>,
        config: Config,
    ) -> Self {
        Self {
            page_source,
            parser,
            store,
            sink,
            recipients,
            config,
        }
    }

    /// Run one full cycle.
    ///
    /// The current snapshot is persisted right after the previous one is
    /// loaded, before any classification or delivery, so the comparison base
    /// is always exactly one cycle old even when a later step fails.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let page = self
            .page_source
            .fetch_listing()
            .await
            .map_err(CycleError::Fetch)?;
        let current = self.parser.parse(&page.body).map_err(CycleError::Parse)?;
        debug!("parsed {} site(s) from {}", current.len(), page.resolved_url);

        let previous = self.store.load().map_err(CycleError::Store)?;
        self.store.save(&current).map_err(CycleError::Store)?;

        let report = classify(
            previous.as_ref(),
            &current,
            &self.config.target_address,
            self.config.match_policy,
        );
        if !report.is_actionable() {
            return Ok(CycleOutcome::NoChange);
        }

        let alert = Alert {
            subject: ALERT_SUBJECT.to_string(),
            body: report.render_email(&page.resolved_url),
            recipients: self.recipients.clone(),
        };
        self.sink.deliver(&alert).await.map_err(CycleError::Delivery)?;

        info!(
            "alerted {} recipient(s): {} new, {} old",
            self.recipients.len(),
            report.new_sites.len(),
            report.old_sites.len()
        );
        Ok(CycleOutcome::Alerted {
            new_sites: report.new_sites.len(),
            old_sites: report.old_sites.len(),
        })
    }

    /// Whether the cycle body should run this iteration. Debug mode ignores
    /// the window.
    fn is_active(&self, hour: u32) -> bool {
        self.config.debug || self.config.active_hours.contains(hour)
    }

    /// Poll indefinitely. Returns only on a fatal cycle error; everything
    /// else is logged and the loop sleeps until the next iteration.
    pub async fn run(&self) -> Result<(), CycleError> {
        let interval = Duration::from_secs(self.config.poll_interval_minutes * 60);

        loop {
            let now = Local::now();
            if self.is_active(now.hour()) {
                match self.run_cycle().await {
                    Ok(outcome) => info!("cycle complete at {}: {:?}", now.to_rfc3339(), outcome),
                    Err(e) if e.is_fatal() => {
                        error!("fatal: {e}");
                        return Err(e);
                    }
                    Err(e @ CycleError::Delivery(_)) => error!("{e}"),
                    Err(e) => warn!("{e}"),
                }
            } else {
                debug!("outside active hours (hour {}), skipping", now.hour());
            }

            tokio::time::sleep(interval).await;
        }
    }
}
