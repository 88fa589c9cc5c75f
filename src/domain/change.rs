use std::collections::HashSet;

use serde::Deserialize;

use super::{SiteInfo, Snapshot};

/// A snapshot entry whose address contains the target substring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSite {
    pub name: String,
    pub info: SiteInfo,
}

impl MatchedSite {
    fn new(name: &str, info: &SiteInfo) -> Self {
        Self {
            name: name.to_string(),
            info: info.clone(),
        }
    }

    /// Plain-text block used in the alert body
    fn describe(&self) -> String {
        format!(
            "site: {}\ndate: {}\naddress: {}\nvaccinations offered: {}\nappointments: {}\n",
            self.name,
            self.info.date,
            self.info.address,
            self.info.vaccinations_offered,
            self.info.appointments
        )
    }
}

/// How current matches are compared against the previous cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Bucket every current match into new vs. already-known by (name, date)
    All,
    /// Single-site behavior: first match only, any prior match suppresses
    First,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::All
    }
}

/// Result of comparing the current matches against the previous cycle's.
///
/// `new_sites` and `old_sites` are disjoint; an alert is warranted exactly
/// when `new_sites` is non-empty. A site counts as already known only if
/// both its name and its displayed date are unchanged - a name match with a
/// changed date is a rescheduled slot and lands in `new_sites`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    pub new_sites: Vec<MatchedSite>,
    pub old_sites: Vec<MatchedSite>,
}

impl ChangeReport {
    pub fn is_actionable(&self) -> bool {
        !self.new_sites.is_empty()
    }

    /// Render the plain-text alert body: greeting, NEW sites, OLD sites
    /// (if any), link back to the source query, signature.
    pub fn render_email(&self, source_url: &str) -> String {
        let mut text = String::from(
            "Hello!\n\nI found a recently-available vaccination site that may interest you!\n\n\
             NEW vaccination sites:\n\n",
        );
        for site in &self.new_sites {
            text.push_str(&site.describe());
            text.push('\n');
        }
        if !self.old_sites.is_empty() {
            text.push_str("\nOLD vaccination sites:\n\n");
            for site in &self.old_sites {
                text.push_str(&site.describe());
                text.push('\n');
            }
        }
        text.push_str(&format!(
            "\nSearch results are at: {source_url}\n\nThis is an automated message from vaxwatch.\n"
        ));
        text
    }
}

/// All snapshot entries whose address contains `target`, case-insensitively.
pub fn find_matches(snapshot: &Snapshot, target: &str) -> Vec<MatchedSite> {
    let needle = target.to_lowercase();
    snapshot
        .iter()
        .filter(|(_, info)| info.address.to_lowercase().contains(&needle))
        .map(|(name, info)| MatchedSite::new(name, info))
        .collect()
}

/// First matching entry in snapshot order, if any.
pub fn find_first_match(snapshot: &Snapshot, target: &str) -> Option<MatchedSite> {
    let needle = target.to_lowercase();
    snapshot
        .iter()
        .find(|(_, info)| info.address.to_lowercase().contains(&needle))
        .map(|(name, info)| MatchedSite::new(name, info))
}

/// Compare the current snapshot against the previous one and bucket the
/// target matches. `previous` is `None` on the very first cycle; every
/// current match is then new.
pub fn classify(
    previous: Option<&Snapshot>,
    current: &Snapshot,
    target: &str,
    policy: MatchPolicy,
) -> ChangeReport {
    match policy {
        MatchPolicy::All => {
            let previous_matches = previous.map(|s| find_matches(s, target)).unwrap_or_default();
            let known: HashSet<(&str, &str)> = previous_matches
                .iter()
                .map(|m| (m.name.as_str(), m.info.date.as_str()))
                .collect();

            let (old_sites, new_sites) = find_matches(current, target)
                .into_iter()
                .partition(|m| known.contains(&(m.name.as_str(), m.info.date.as_str())));

            ChangeReport {
                new_sites,
                old_sites,
            }
        }
        MatchPolicy::First => {
            let found_before = previous
                .map(|s| find_first_match(s, target).is_some())
                .unwrap_or(false);

            match find_first_match(current, target) {
                Some(site) if !found_before => ChangeReport {
                    new_sites: vec![site],
                    old_sites: Vec::new(),
                },
                Some(site) => ChangeReport {
                    new_sites: Vec::new(),
                    old_sites: vec![site],
                },
                None => ChangeReport::default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(date: &str, address: &str) -> SiteInfo {
        SiteInfo {
            date: date.to_string(),
            address: address.to_string(),
            vaccinations_offered: "Moderna".to_string(),
            appointments: 5,
        }
    }

    fn snapshot(entries: &[(&str, &str, &str)]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (name, date, address) in entries {
            snapshot.insert(*name, info(date, address));
        }
        snapshot
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let current = snapshot(&[
            ("Clinic A", "2021-04-01", "123 Main St, BOZEMAN, MT"),
            ("Clinic B", "2021-04-01", "1340 Harrison Ave, Butte, MT"),
            ("Clinic C", "2021-04-01", "500 bozeMan Trail Rd"),
        ]);

        let matches = find_matches(&current, "Bozeman");
        let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Clinic A", "Clinic C"]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let current = snapshot(&[("Clinic B", "2021-04-01", "Butte, MT")]);
        assert!(find_matches(&current, "Bozeman").is_empty());
        assert!(find_first_match(&current, "Bozeman").is_none());
    }

    #[test]
    fn test_first_run_match_is_new() {
        let current = snapshot(&[("Clinic A", "2021-04-01", "123 Main St, Bozeman, MT")]);
        let report = classify(None, &current, "Bozeman", MatchPolicy::All);

        assert!(report.is_actionable());
        assert_eq!(report.new_sites.len(), 1);
        assert!(report.old_sites.is_empty());
    }

    #[test]
    fn test_first_run_without_match_is_not_actionable() {
        let current = snapshot(&[("Clinic B", "2021-04-01", "Butte, MT")]);
        let report = classify(None, &current, "Bozeman", MatchPolicy::All);
        assert!(!report.is_actionable());
    }

    #[test]
    fn test_unchanged_site_is_old() {
        let previous = snapshot(&[("Clinic A", "2021-04-01", "123 Main St, Bozeman, MT")]);
        let current = previous.clone();
        let report = classify(Some(&previous), &current, "Bozeman", MatchPolicy::All);

        assert!(!report.is_actionable());
        assert_eq!(report.old_sites.len(), 1);
    }

    #[test]
    fn test_rescheduled_site_is_new() {
        let previous = snapshot(&[("Clinic A", "2021-04-01", "123 Main St, Bozeman, MT")]);
        let current = snapshot(&[("Clinic A", "2021-04-08", "123 Main St, Bozeman, MT")]);
        let report = classify(Some(&previous), &current, "Bozeman", MatchPolicy::All);

        assert!(report.is_actionable());
        assert_eq!(report.new_sites[0].info.date, "2021-04-08");
        assert!(report.old_sites.is_empty());
    }

    #[test]
    fn test_disappearance_is_not_actionable() {
        let previous = snapshot(&[("Clinic A", "2021-04-01", "123 Main St, Bozeman, MT")]);
        let current = snapshot(&[("Clinic B", "2021-04-01", "Butte, MT")]);
        let report = classify(Some(&previous), &current, "Bozeman", MatchPolicy::All);

        assert!(!report.is_actionable());
        assert!(report.old_sites.is_empty());
    }

    #[test]
    fn test_first_policy_transition_table() {
        let matching = snapshot(&[("Clinic A", "2021-04-01", "Bozeman, MT")]);
        let empty = Snapshot::new();

        // (found_before, found_now) -> actionable iff (false, true)
        let cases = [
            (&empty, &empty, false),
            (&empty, &matching, true),
            (&matching, &matching, false),
            (&matching, &empty, false),
        ];
        for (previous, current, expected) in cases {
            let report = classify(Some(previous), current, "Bozeman", MatchPolicy::First);
            assert_eq!(report.is_actionable(), expected);
        }
    }

    #[test]
    fn test_first_policy_suppresses_rescheduled_site() {
        // Under the single-site policy any prior match suppresses the alert,
        // even when the date changed.
        let previous = snapshot(&[("Clinic A", "2021-04-01", "Bozeman, MT")]);
        let current = snapshot(&[("Clinic A", "2021-04-08", "Bozeman, MT")]);
        let report = classify(Some(&previous), &current, "Bozeman", MatchPolicy::First);

        assert!(!report.is_actionable());
        assert_eq!(report.old_sites.len(), 1);
    }

    #[test]
    fn test_render_email_lists_new_and_old_blocks() {
        let previous = snapshot(&[("Clinic A", "2021-04-01", "123 Main St, Bozeman, MT")]);
        let current = snapshot(&[
            ("Clinic A", "2021-04-01", "123 Main St, Bozeman, MT"),
            ("Clinic C", "2021-04-09", "500 Bozeman Trail Rd"),
        ]);
        let report = classify(Some(&previous), &current, "Bozeman", MatchPolicy::All);
        let body = report.render_email("https://example.test/search?location=59715");

        assert!(body.contains("NEW vaccination sites:"));
        assert!(body.contains("site: Clinic C"));
        assert!(body.contains("OLD vaccination sites:"));
        assert!(body.contains("site: Clinic A"));
        assert!(body.contains("https://example.test/search?location=59715"));
    }

    #[test]
    fn test_render_email_omits_empty_old_block() {
        let current = snapshot(&[("Clinic A", "2021-04-01", "123 Main St, Bozeman, MT")]);
        let report = classify(None, &current, "Bozeman", MatchPolicy::All);
        let body = report.render_email("https://example.test/search");

        assert!(body.contains("site: Clinic A"));
        assert!(body.contains("123 Main St, Bozeman, MT"));
        assert!(!body.contains("OLD vaccination sites:"));
    }
}
