//! Configuration module for mirror runs
//!
//! This module provides the `MirrorConfig` struct and its type-safe builder
//! with validation and documented defaults.

pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

pub use builder::{MirrorConfigBuilder, WithSiteBase, WithStorageDir};
pub use types::MirrorConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl_engine::candidates::NamePattern;

    #[test]
    fn test_builder_defaults() {
        let config = MirrorConfig::builder()
            .storage_dir("/tmp/mirror")
            .site_base("https://0002n8y.wcomhost.com/website")
            .build()
            .unwrap();

        assert_eq!(config.site_base(), "https://0002n8y.wcomhost.com/website/");
        assert_eq!(config.seeds(), &[String::new()]);
        assert_eq!(config.misses_after_hit(), 5);
        assert_eq!(config.min_text_length(), 5);
        assert_eq!(config.placeholder_titles(), &["Untitled".to_string()]);
        assert_eq!(config.default_image_extension(), "gif");
        assert!(config.resume());
        assert!(config.storage_dir().is_absolute());
    }

    #[test]
    fn test_scheme_added_when_missing() {
        let config = MirrorConfig::builder()
            .storage_dir("/tmp/mirror")
            .site_base("example.com/site")
            .build()
            .unwrap();
        assert_eq!(config.site_base(), "https://example.com/site/");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero_retries = MirrorConfig::builder()
            .storage_dir("/tmp/mirror")
            .site_base("https://example.com/")
            .max_page_retries(0)
            .build();
        assert!(zero_retries.is_err());

        let inverted_pages = MirrorConfig::builder()
            .storage_dir("/tmp/mirror")
            .site_base("https://example.com/")
            .first_page_number(10)
            .max_pages_per_section(5)
            .build();
        assert!(inverted_pages.is_err());
    }

    #[test]
    fn test_excluded_patterns_are_globs() {
        let config = MirrorConfig::builder()
            .storage_dir("/tmp/mirror")
            .site_base("https://example.com/")
            .excluded_patterns(vec!["cgi-bin/*".to_string(), "*.php?print=1".to_string()])
            .build()
            .unwrap();

        assert!(config.is_excluded("cgi-bin/counter.pl"));
        assert!(config.is_excluded("news.php?print=1"));
        assert!(!config.is_excluded("news.php?print=10"));
        assert!(!config.is_excluded("hist0304/"));
    }

    #[test]
    fn test_json_round_trip_keeps_patterns() {
        let config = MirrorConfig::builder()
            .storage_dir("/tmp/mirror")
            .site_base("https://example.com/")
            .section_patterns(vec![NamePattern::Plural {
                noun: "photo".to_string(),
            }])
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let parsed: MirrorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.section_patterns(), config.section_patterns());
        assert_eq!(parsed.site_base(), config.site_base());
    }
}
