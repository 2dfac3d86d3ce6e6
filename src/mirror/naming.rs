//! Deterministic local filenames for mirrored pages and images

use crate::utils::{ASSET_HASH_LEN, leaf_of, page_number_of, section_of};

/// Restrict a filename stem to `[A-Za-z0-9._-]`
///
/// Anything else becomes `_`; an empty result becomes `page`.
#[must_use]
pub fn sanitize_stem(raw: &str) -> String {
    let sanitized = sanitize_filename::sanitize(raw);
    let stem: String = sanitized
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "page".to_string()
    } else {
        stem.to_string()
    }
}

/// Filename stem for a page identifier
///
/// `season2022/` is `season2022`, `season2022/page5.html` is
/// `season2022_page5`, `season2022/photos.html` is `season2022_photos`.
#[must_use]
pub fn page_stem(id: &str) -> String {
    let section = section_of(id);
    let page_number = page_number_of(id);

    let raw = match leaf_of(id) {
        Some(leaf) if page_number == 0 => format!("{section}_{leaf}"),
        Some(leaf) => format!("{section}_page{page_number}_{leaf}"),
        None if page_number > 0 => format!("{section}_page{page_number}"),
        None => section,
    };

    sanitize_stem(&raw)
}

#[must_use]
pub fn page_filename(id: &str) -> String {
    format!("{}.html", page_stem(id))
}

/// Filename for a page whose plain name is taken by another identifier
#[must_use]
pub fn disambiguated_page_filename(id: &str) -> String {
    format!("{}_{}.html", page_stem(id), short_hash(id))
}

/// Lowercased extension of the path part of an image source
#[must_use]
pub fn asset_extension(source: &str, default_ext: &str) -> String {
    let path = source
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();

    match last.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => default_ext.to_string(),
    }
}

/// Short hex digest of an image source string
#[must_use]
pub fn short_hash(source: &str) -> String {
    let hash = xxhash_rust::xxh3::xxh3_64(source.as_bytes());
    let hex = format!("{hash:016x}");
    hex[..ASSET_HASH_LEN].to_string()
}

/// `img<seq>_<hash>.<ext>`
#[must_use]
pub fn asset_filename(sequence: usize, source: &str, default_ext: &str) -> String {
    format!(
        "img{sequence}_{}.{}",
        short_hash(source),
        asset_extension(source, default_ext)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_stems() {
        assert_eq!(page_stem("season2022/"), "season2022");
        assert_eq!(page_stem("season2022/page5.html"), "season2022_page5");
        assert_eq!(page_stem("season2022/index.html"), "season2022");
        assert_eq!(page_stem("season2022/photos.html"), "season2022_photos");
        assert_eq!(page_stem("videos.html"), "videos");
        assert_eq!(page_stem(""), "index");
        assert_eq!(page_stem("results.php?week=3"), "results_week_3");
    }

    #[test]
    fn test_page_stem_is_deterministic() {
        assert_eq!(page_filename("everyplayer/page12.html"), page_filename("everyplayer/page12.html"));
        assert_eq!(page_filename("everyplayer/page12.html"), "everyplayer_page12.html");
    }

    #[test]
    fn test_disambiguated_names_differ_per_identifier() {
        assert_eq!(page_filename("a/b.html"), page_filename("a_b.html"));

        let nested = disambiguated_page_filename("a/b.html");
        let flat = disambiguated_page_filename("a_b.html");
        assert_ne!(nested, flat);
        assert!(nested.starts_with("a_b_") && nested.ends_with(".html"));
        assert_eq!(nested, disambiguated_page_filename("a/b.html"));
    }

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("a b/c"), "a_bc");
        assert_eq!(sanitize_stem("clubs&teams"), "clubs_teams");
        assert_eq!(sanitize_stem(".."), "page");
    }

    #[test]
    fn test_asset_extension() {
        assert_eq!(asset_extension("images/Logo.JPG", "gif"), "jpg");
        assert_eq!(asset_extension("https://host/pic.png?v=2", "gif"), "png");
        assert_eq!(asset_extension("https://host/getimage?id=7", "gif"), "gif");
        assert_eq!(asset_extension("images/.hidden", "gif"), "gif");
        assert_eq!(asset_extension("images/dir.v2/photo", "gif"), "gif");
    }

    #[test]
    fn test_asset_filename_shape() {
        let name = asset_filename(3, "images/logo.gif", "gif");
        assert!(name.starts_with("img3_"));
        assert!(name.ends_with(".gif"));
        assert_eq!(name.len(), "img3_".len() + ASSET_HASH_LEN + ".gif".len());
        assert_eq!(name, asset_filename(3, "images/logo.gif", "gif"));
        assert_ne!(short_hash("images/logo.gif"), short_hash("images/logo2.gif"));
    }
}
