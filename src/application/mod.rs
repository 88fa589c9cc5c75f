mod watcher;

pub use watcher::{CycleError, CycleOutcome, WatcherService};
