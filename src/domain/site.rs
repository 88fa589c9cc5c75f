use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Displayed details for one clinic site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub date: String,
    pub address: String,
    pub vaccinations_offered: String,
    pub appointments: u32,
}

/// All vaccine sites parsed from one fetch of the listing page, keyed by
/// unique site name. Persisted as a single JSON object; absence of a name
/// means the site was not listed at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    sites: BTreeMap<String, SiteInfo>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, info: SiteInfo) -> Option<SiteInfo> {
        self.sites.insert(name.into(), info)
    }

    pub fn get(&self, name: &str) -> Option<&SiteInfo> {
        self.sites.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SiteInfo)> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
