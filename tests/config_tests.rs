//! Tests for loading and building `MirrorConfig`

use sitemirror::{MirrorConfig, NamePattern};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_builder_requires_storage_dir_and_site_base() {
    // This should not compile if uncommented - missing site_base
    // let config = MirrorConfig::builder().storage_dir("/tmp").build();

    let temp_dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder()
        .storage_dir(temp_dir.path())
        .site_base("https://legacy.example.com/website")
        .build()
        .unwrap();

    assert_eq!(config.storage_dir(), temp_dir.path());
    assert_eq!(config.site_base(), "https://legacy.example.com/website/");
    assert_eq!(config.pages_dir(), temp_dir.path().join("pages"));
    assert_eq!(config.images_dir(), temp_dir.path().join("assets/images"));
    assert_eq!(config.checkpoint_path(), temp_dir.path().join("checkpoint.json"));
}

#[test]
fn test_timing_fields_convert_to_durations() {
    let temp_dir = TempDir::new().unwrap();
    let config = MirrorConfig::builder()
        .storage_dir(temp_dir.path())
        .site_base("https://legacy.example.com/website/")
        .probe_timeout_secs(4)
        .retry_backoff_ms(250)
        .request_delay_ms(0)
        .build()
        .unwrap();

    assert_eq!(config.probe_timeout(), Duration::from_secs(4));
    assert_eq!(config.retry_backoff(), Duration::from_millis(250));
    assert!(config.request_delay().is_zero());
}

#[test]
fn test_rejects_non_http_site_base() {
    let result = MirrorConfig::builder()
        .storage_dir("/tmp/mirror")
        .site_base("ftp://legacy.example.com/")
        .build();
    assert!(result.is_err());
}

#[test]
fn test_json_file_uses_defaults_for_missing_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("site.json");
    let storage = temp_dir.path().join("out");
    std::fs::write(
        &path,
        serde_json::json!({
            "site_base": "https://legacy.example.com/website",
            "storage_dir": storage,
            "misses_after_hit": 3,
            "old_domains": ["oldclub.co.uk"],
            "section_patterns": [
                { "kind": "year-range", "template": "hist{yy}{next_yy}", "start": 2003, "end": 2009 },
                { "kind": "plural", "noun": "photo" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let config = MirrorConfig::from_json_file(&path).unwrap();

    assert_eq!(config.site_base(), "https://legacy.example.com/website/");
    assert_eq!(config.storage_dir(), storage);
    assert_eq!(config.misses_after_hit(), 3);
    assert_eq!(config.misses_before_hit(), 2);
    assert_eq!(config.max_pages_per_section(), 50);
    assert_eq!(config.old_domains(), &["oldclub.co.uk".to_string()]);
    assert_eq!(config.seeds(), &[String::new()]);
    assert_eq!(
        config.section_patterns()[1],
        NamePattern::Plural {
            noun: "photo".to_string()
        }
    );
}

#[test]
fn test_json_file_errors_are_reported() {
    let temp_dir = TempDir::new().unwrap();

    let missing = MirrorConfig::from_json_file(&temp_dir.path().join("nope.json"));
    assert!(missing.unwrap_err().to_string().contains("Failed to read config file"));

    let path = temp_dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "site_base": "https://example.com/", "max_page_retries": 0 }"#).unwrap();
    assert!(MirrorConfig::from_json_file(&path).is_err());

    std::fs::write(&path, "{ site_base: ").unwrap();
    let malformed = MirrorConfig::from_json_file(&path).unwrap_err();
    assert!(malformed.to_string().contains("Failed to parse config file"));
}
