//! URL normalization against a fixed site base.
//!
//! Every URL the crawler handles is identified by its remainder after the
//! site base (`everyplayer/page2.html`, `hist0304/`, or `""` for the base
//! itself). Equality is defined on that identifier, never on raw href text.

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static PAGE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^page(\d+)\.html?$").expect("page file regex is valid"));

/// Check if an href can lead to another page at all
///
/// Skips empty values, fragment-only anchors and non-navigational schemes.
#[must_use]
pub fn is_navigable_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !(lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}

/// Resolves raw hrefs into base-relative identifiers
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    base: Url,
    base_str: String,
}

impl UrlNormalizer {
    /// Create a normalizer for `site_base`
    ///
    /// Query and fragment are dropped from the base and its path always ends
    /// with `/`, so that the base is a directory prefix.
    pub fn new(site_base: &str) -> Result<Self> {
        let mut base = Url::parse(site_base.trim())
            .with_context(|| format!("Invalid site base URL: {site_base}"))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Site base must use http or https, got '{}'",
                base.scheme()
            ));
        }

        base.set_fragment(None);
        base.set_query(None);
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }

        Ok(Self {
            base_str: base.as_str().to_string(),
            base,
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for a base-relative identifier
    pub fn absolute(&self, id: &str) -> Result<Url> {
        self.base
            .join(id)
            .with_context(|| format!("Cannot resolve '{id}' against {}", self.base))
    }

    /// Normalize `href` found on the page identified by `current_id`
    ///
    /// Handles `/`-rooted, protocol-relative, absolute and relative hrefs.
    /// Returns `None` for non-navigational hrefs and for anything that
    /// resolves outside the site base.
    #[must_use]
    pub fn normalize(&self, href: &str, current_id: &str) -> Option<String> {
        if !is_navigable_href(href) {
            return None;
        }

        let current = self.absolute(current_id).ok()?;
        let mut resolved = current.join(href.trim()).ok()?;
        resolved.set_fragment(None);

        self.relativize(&resolved)
    }

    /// Strip the site base prefix from an absolute URL
    #[must_use]
    pub fn relativize(&self, url: &Url) -> Option<String> {
        url.as_str()
            .strip_prefix(self.base_str.as_str())
            .map(str::to_string)
    }
}

fn split_query(id: &str) -> (&str, Option<&str>) {
    match id.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (id, None),
    }
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Section name of an identifier: its first path segment without extension
///
/// The site root maps to `index`.
#[must_use]
pub fn section_of(id: &str) -> String {
    let (path, _) = split_query(id);
    let first = path.split('/').next().unwrap_or_default();
    let name = strip_extension(first);

    if name.is_empty() {
        "index".to_string()
    } else {
        name.to_string()
    }
}

/// True when the identifier lives inside a section directory (`name/...`)
#[must_use]
pub fn is_directory_section(id: &str) -> bool {
    let (path, _) = split_query(id);
    matches!(path.split_once('/'), Some((first, _)) if !first.is_empty())
}

/// Page number encoded by a `pageN.html` leaf, 0 for anything else
#[must_use]
pub fn page_number_of(id: &str) -> u32 {
    let (path, _) = split_query(id);
    let leaf = path.rsplit('/').next().unwrap_or_default();

    PAGE_FILE
        .captures(leaf)
        .and_then(|caps| caps.get(1))
        .and_then(|n| n.as_str().parse().ok())
        .unwrap_or(0)
}

/// Distinguishing leaf for pages that are neither a section base nor `pageN.html`
///
/// `hist0304/photos.html` yields `photos`, `results.php?week=3` yields
/// `week=3`; section bases and pagination pages yield `None`.
#[must_use]
pub fn leaf_of(id: &str) -> Option<String> {
    let (path, query) = split_query(id);

    let rest = match path.split_once('/') {
        Some((_, rest)) => rest.trim_end_matches('/'),
        None => "",
    };

    let is_base_leaf = rest.is_empty()
        || rest.eq_ignore_ascii_case("index.html")
        || rest.eq_ignore_ascii_case("index.htm")
        || PAGE_FILE.is_match(rest);

    let mut parts: Vec<String> = Vec::new();
    if !is_base_leaf {
        let stem = match rest.rsplit_once('/') {
            Some((dirs, last)) => format!("{}_{}", dirs.replace('/', "_"), strip_extension(last)),
            None => strip_extension(rest).to_string(),
        };
        parts.push(stem);
    }
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        parts.push(query.to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://0002n8y.wcomhost.com/website/";

    fn normalizer() -> UrlNormalizer {
        UrlNormalizer::new(BASE).unwrap()
    }

    #[test]
    fn test_base_gets_trailing_slash() {
        let n = UrlNormalizer::new("https://0002n8y.wcomhost.com/website").unwrap();
        assert_eq!(n.base().as_str(), BASE);
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(UrlNormalizer::new("ftp://example.com/").is_err());
        assert!(UrlNormalizer::new("not a url").is_err());
    }

    #[test]
    fn test_equivalent_spellings_normalize_identically() {
        let n = normalizer();
        let spellings = [
            ("https://0002n8y.wcomhost.com/website/everyplayer/page2.html", "hist0304/"),
            ("//0002n8y.wcomhost.com/website/everyplayer/page2.html", "hist0304/"),
            ("/website/everyplayer/page2.html", "hist0304/"),
            ("../everyplayer/page2.html", "hist0304/"),
            ("page2.html", "everyplayer/"),
            ("./page2.html#top", "everyplayer/page1.html"),
        ];

        for (href, current) in spellings {
            assert_eq!(
                n.normalize(href, current).as_deref(),
                Some("everyplayer/page2.html"),
                "href {href} on {current}"
            );
        }
    }

    #[test]
    fn test_offsite_links_rejected() {
        let n = normalizer();
        assert_eq!(n.normalize("https://example.com/website/a.html", ""), None);
        assert_eq!(n.normalize("http://0002n8y.wcomhost.com/website/a.html", ""), None);
        assert_eq!(n.normalize("/other/a.html", ""), None);
        assert_eq!(n.normalize("../../a.html", "hist0304/"), None);
    }

    #[test]
    fn test_non_navigational_hrefs_rejected() {
        let n = normalizer();
        for href in ["", "   ", "#top", "javascript:void(0)", "mailto:a@b.c", "tel:123", "data:image/gif;base64,AA"] {
            assert_eq!(n.normalize(href, ""), None, "{href}");
        }
    }

    #[test]
    fn test_no_slash_insertion() {
        let n = normalizer();
        assert_eq!(n.normalize("hist0304", "").as_deref(), Some("hist0304"));
        assert_eq!(n.normalize("hist0304/", "").as_deref(), Some("hist0304/"));
    }

    #[test]
    fn test_query_is_preserved() {
        let n = normalizer();
        assert_eq!(
            n.normalize("results.php?week=3#x", "").as_deref(),
            Some("results.php?week=3")
        );
    }

    #[test]
    fn test_absolute_roundtrip() {
        let n = normalizer();
        let url = n.absolute("everyplayer/page2.html").unwrap();
        assert_eq!(n.relativize(&url).as_deref(), Some("everyplayer/page2.html"));
    }

    #[test]
    fn test_section_and_page_number() {
        assert_eq!(section_of("season2022/"), "season2022");
        assert_eq!(section_of("season2022/page5.html"), "season2022");
        assert_eq!(section_of("videos.html"), "videos");
        assert_eq!(section_of(""), "index");
        assert_eq!(page_number_of("season2022/"), 0);
        assert_eq!(page_number_of("season2022/page5.html"), 5);
        assert_eq!(page_number_of("season2022/photos.html"), 0);
    }

    #[test]
    fn test_directory_sections() {
        assert!(is_directory_section("hist0304/"));
        assert!(is_directory_section("hist0304/page2.html"));
        assert!(!is_directory_section("videos.html"));
        assert!(!is_directory_section(""));
        assert!(!is_directory_section("show.php?next=a/b"));
    }

    #[test]
    fn test_leaf_names() {
        assert_eq!(leaf_of("hist0304/"), None);
        assert_eq!(leaf_of("hist0304/index.html"), None);
        assert_eq!(leaf_of("hist0304/page3.html"), None);
        assert_eq!(leaf_of("videos.html"), None);
        assert_eq!(leaf_of("hist0304/photos.html").as_deref(), Some("photos"));
        assert_eq!(leaf_of("hist0304/cup/final.html").as_deref(), Some("cup_final"));
        assert_eq!(leaf_of("results.php?week=3").as_deref(), Some("week=3"));
    }
}
