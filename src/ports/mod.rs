pub mod alert_sink;
pub mod listing_parser;
pub mod page_source;
pub mod snapshot_store;

pub use alert_sink::{Alert, AlertSink};
pub use listing_parser::ListingParser;
pub use page_source::{ListingPage, PageSource};
pub use snapshot_store::SnapshotStore;
