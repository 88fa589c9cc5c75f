pub mod change;
pub mod site;

pub use change::{classify, find_first_match, find_matches, ChangeReport, MatchPolicy, MatchedSite};
pub use site::{SiteInfo, Snapshot};
