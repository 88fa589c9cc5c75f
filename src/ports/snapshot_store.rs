use crate::domain::Snapshot;

/// Port for persisting the most recent site snapshot.
///
/// Single-process, single-writer: the watcher loads at the start of a cycle
/// and saves exactly once immediately after, keeping a one-snapshot history.
pub trait SnapshotStore: Send + Sync {
    /// Previously persisted snapshot, or `None` on the first run.
    /// Present-but-malformed state is an error, never `None`.
    fn load(&self) -> Result<Option<Snapshot>, Box<dyn std::error::Error + Send + Sync>>;

    /// Durably overwrite the persisted state.
    fn save(&self, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
