//! Speculative URL generation
//!
//! Link following under-covers the legacy site: many sections are only
//! reachable as `section/pageN.html` or under a naming convention nobody
//! links to. `PaginationProbe` walks page numbers for one section and
//! `NamePattern` expands a vocabulary of section directory names.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::MirrorConfig;

/// Identifier of page `n` of a directory section
#[must_use]
pub fn pagination_url(section: &str, n: u32) -> String {
    format!("{section}/page{n}.html")
}

/// Identifier of a section's base directory
#[must_use]
pub fn section_dir_url(name: &str) -> String {
    format!("{name}/")
}

/// Stateful page-number walk for one section
#[derive(Debug, Clone)]
pub struct PaginationProbe {
    section: String,
    next_page: u32,
    max_page: u32,
    accepted: u32,
    consecutive_misses: u32,
    misses_after_hit: u32,
    misses_before_hit: u32,
    stopped: bool,
}

impl PaginationProbe {
    /// `already_accepted` counts pages of the section accepted before probing
    /// starts (base page, pages found through links)
    #[must_use]
    pub fn new(
        section: impl Into<String>,
        already_accepted: u32,
        first_page: u32,
        max_page: u32,
        misses_after_hit: u32,
        misses_before_hit: u32,
    ) -> Self {
        Self {
            section: section.into(),
            next_page: first_page,
            max_page,
            accepted: already_accepted,
            consecutive_misses: 0,
            misses_after_hit: misses_after_hit.max(1),
            misses_before_hit: misses_before_hit.max(1),
            stopped: false,
        }
    }

    #[must_use]
    pub fn from_config(section: impl Into<String>, already_accepted: u32, config: &MirrorConfig) -> Self {
        Self::new(
            section,
            already_accepted,
            config.first_page_number(),
            config.max_pages_per_section(),
            config.misses_after_hit(),
            config.misses_before_hit(),
        )
    }

    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    #[must_use]
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Next page number and identifier to probe
    pub fn next_candidate(&mut self) -> Option<(u32, String)> {
        if self.is_exhausted() {
            return None;
        }

        let n = self.next_page;
        self.next_page += 1;
        Some((n, pagination_url(&self.section, n)))
    }

    /// Record the outcome of the last candidate
    pub fn record(&mut self, accepted: bool) {
        if accepted {
            self.accepted += 1;
            self.consecutive_misses = 0;
            return;
        }

        self.consecutive_misses += 1;
        let threshold = if self.accepted > 0 {
            self.misses_after_hit
        } else {
            self.misses_before_hit
        };
        if self.consecutive_misses >= threshold {
            self.stopped = true;
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.stopped || self.next_page > self.max_page
    }
}

/// Naming convention for brute-forced section directories
///
/// Placeholders: `{yyyy}`, `{yy}`, `{next_yyyy}`, `{next_yy}` in year ranges
/// (`hist{yy}{next_yy}` covers `hist0304`), `{n}` in numbered templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NamePattern {
    Literal { name: String },
    YearRange { template: String, start: u32, end: u32 },
    Numbered { template: String, start: u32, end: u32 },
    /// The noun and its `s` plural
    Plural { noun: String },
}

impl NamePattern {
    #[must_use]
    pub fn expand(&self) -> Vec<String> {
        match self {
            Self::Literal { name } => vec![name.clone()],
            Self::YearRange {
                template,
                start,
                end,
            } => (*start..=*end)
                .map(|year| {
                    let next = year + 1;
                    template
                        .replace("{next_yyyy}", &next.to_string())
                        .replace("{next_yy}", &format!("{:02}", next % 100))
                        .replace("{yyyy}", &year.to_string())
                        .replace("{yy}", &format!("{:02}", year % 100))
                })
                .collect(),
            Self::Numbered {
                template,
                start,
                end,
            } => (*start..=*end)
                .map(|n| template.replace("{n}", &n.to_string()))
                .collect(),
            Self::Plural { noun } => vec![noun.clone(), format!("{noun}s")],
        }
    }
}

/// Expand patterns into a deduplicated, order-preserving name list
#[must_use]
pub fn expand_section_names(patterns: &[NamePattern]) -> Vec<String> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .flat_map(NamePattern::expand)
        .map(|name| name.trim().trim_matches('/').to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_probe(probe: &mut PaginationProbe, live_pages: &[u32]) -> Vec<u32> {
        let mut probed = Vec::new();
        while let Some((n, url)) = probe.next_candidate() {
            assert_eq!(url, pagination_url(probe.section(), n));
            probed.push(n);
            probe.record(live_pages.contains(&n));
        }
        probed
    }

    #[test]
    fn test_stops_after_m_misses_following_a_hit() {
        let m = 5;
        let mut probe = PaginationProbe::new("everyplayer", 0, 1, 50, m, 2);
        let probed = run_probe(&mut probe, &[1, 2]);

        assert_eq!(probed.last().copied(), Some(3 + m - 1));
        assert!(!probed.contains(&(3 + m)));
        assert_eq!(probe.accepted(), 2);
    }

    #[test]
    fn test_miss_run_resets_on_hit() {
        let mut probe = PaginationProbe::new("s", 0, 1, 50, 3, 2);
        let probed = run_probe(&mut probe, &[1, 3, 5]);
        assert_eq!(probed, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_early_exit_without_hits() {
        let mut probe = PaginationProbe::new("nosuchsection", 0, 1, 50, 5, 2);
        assert_eq!(run_probe(&mut probe, &[]), vec![1, 2]);
    }

    #[test]
    fn test_accepted_base_page_uses_after_hit_threshold() {
        let mut probe = PaginationProbe::new("hist0304", 1, 1, 50, 3, 1);
        assert_eq!(run_probe(&mut probe, &[]), vec![1, 2, 3]);
    }

    #[test]
    fn test_ceiling() {
        let mut probe = PaginationProbe::new("s", 0, 1, 4, 5, 5);
        assert_eq!(run_probe(&mut probe, &[1, 2, 3, 4]), vec![1, 2, 3, 4]);
        assert!(probe.is_exhausted());
    }

    #[test]
    fn test_year_range_expansion() {
        let pattern = NamePattern::YearRange {
            template: "hist{yy}{next_yy}".to_string(),
            start: 1999,
            end: 2001,
        };
        assert_eq!(pattern.expand(), vec!["hist9900", "hist0001", "hist0102"]);

        let long = NamePattern::YearRange {
            template: "season{yyyy}".to_string(),
            start: 2022,
            end: 2022,
        };
        assert_eq!(long.expand(), vec!["season2022"]);
    }

    #[test]
    fn test_expansion_dedups_in_order() {
        let names = expand_section_names(&[
            NamePattern::Plural {
                noun: "photo".to_string(),
            },
            NamePattern::Numbered {
                template: "team{n}".to_string(),
                start: 1,
                end: 2,
            },
            NamePattern::Literal {
                name: "photos/".to_string(),
            },
            NamePattern::Literal {
                name: " ".to_string(),
            },
        ]);
        assert_eq!(names, vec!["photo", "photos", "team1", "team2"]);
    }

    #[test]
    fn test_pattern_json_shape() {
        let json = r#"[{"kind":"year-range","template":"hist{yy}{next_yy}","start":2003,"end":2003},{"kind":"plural","noun":"cup"}]"#;
        let patterns: Vec<NamePattern> = serde_json::from_str(json).unwrap();
        assert_eq!(expand_section_names(&patterns), vec!["hist0304", "cup", "cups"]);
    }
}
