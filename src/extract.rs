// Extraction is text based on purpose: mirrored documents are scanned as
// flat strings (after entity decoding) rather than parsed, so malformed
// markup never aborts a run.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::{ASSET_EXTENSIONS, SKIP_HOSTS, SiteConfig};

static RE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^"'<>\s)]+"#).expect("invalid regex: generic url")
});

// The regex crate has no backreferences, so the three quoting forms of
// url(...) are spelled out as alternatives.
static RE_CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^"')][^)]*))\s*\)"#)
        .expect("invalid regex: css url")
});

// Entities are decoded first so &quot;-escaped URLs are still found.
pub fn extract_urls(text: &str) -> HashSet<String> {
    let decoded = html_escape::decode_html_entities(text);
    RE_URL
        .find_iter(&decoded)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn extract_css_urls(text: &str) -> HashSet<String> {
    let mut urls = HashSet::new();
    for caps in RE_CSS_URL.captures_iter(text) {
        let raw = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();

        if raw.is_empty() || raw.starts_with("data:") {
            continue;
        }

        let url = if let Some(rest) = raw.strip_prefix("//") {
            format!("https://{rest}")
        } else {
            raw.to_string()
        };

        if url.starts_with("http://") || url.starts_with("https://") {
            urls.insert(url);
        }
    }
    urls
}

/// True iff `url` is an externally-hosted asset worth localizing.
pub fn is_asset_url(url: &str, site: &SiteConfig) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();

    if SKIP_HOSTS.contains(&host.as_str()) {
        return false;
    }

    // Same-site page links should already be local after mirroring.
    if site.is_own_host(&host) {
        return false;
    }

    match Path::new(parsed.path()).extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            ASSET_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_urls_finds_entity_escaped_references() {
        let html = r#"<img src="https://cdn.example.com/a.png">
            <div style="background:url(https://cdn.example.com/b.png)"></div>
            <p>&quot;https://cdn.example.com/c.png&quot;</p>"#;

        let urls = extract_urls(html);
        assert!(urls.contains("https://cdn.example.com/a.png"));
        assert!(urls.contains("https://cdn.example.com/b.png"));
        assert!(urls.contains("https://cdn.example.com/c.png"));
    }

    #[test]
    fn extract_css_urls_handles_all_quoting_forms() {
        let css = r#"
            .a { background: url("https://cdn.example.com/a.png"); }
            .b { background: url('https://cdn.example.com/b.png'); }
            .c { background: url(https://cdn.example.com/c.png); }
            .d { background: url(//cdn.example.com/d.woff2); }
            .e { background: url(data:image/png;base64,AAAA); }
            .f { background: url(../sibling.png); }
        "#;

        let urls = extract_css_urls(css);
        assert!(urls.contains("https://cdn.example.com/a.png"));
        assert!(urls.contains("https://cdn.example.com/b.png"));
        assert!(urls.contains("https://cdn.example.com/c.png"));
        assert!(urls.contains("https://cdn.example.com/d.woff2"));
        assert_eq!(urls.len(), 4, "data: and relative refs must be skipped");
    }

    #[test]
    fn classification_accepts_foreign_asset_urls() {
        let site = SiteConfig::default();
        assert!(is_asset_url("https://cdn.example.com/logo.png", &site));
        assert!(is_asset_url("http://cdn.example.com/site.CSS", &site));
        assert!(is_asset_url(
            "https://fonts.example.com/face.woff2?v=3",
            &site
        ));
    }

    #[test]
    fn classification_rejects_same_site_and_denylist() {
        let site = SiteConfig::default();
        assert!(!is_asset_url(
            "https://videa-saversion.webflow.io/page.html",
            &site
        ));
        assert!(!is_asset_url(
            "https://videa-saversion.webflow.io/style.css",
            &site
        ));
        assert!(!is_asset_url("https://www.w3.org/2000/svg.svg", &site));
        assert!(!is_asset_url(
            "https://www.linkedin.com/company/pic.png",
            &site
        ));
    }

    #[test]
    fn classification_rejects_bad_scheme_and_extension() {
        let site = SiteConfig::default();
        assert!(!is_asset_url("ftp://cdn.example.com/logo.png", &site));
        assert!(!is_asset_url("https://cdn.example.com/page.html", &site));
        assert!(!is_asset_url("https://cdn.example.com/api", &site));
        assert!(!is_asset_url("not a url", &site));
    }
}
