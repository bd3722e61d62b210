use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::config::{ASSETS_DIR, SiteConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefContext {
    /// HTML pages and anything else under the site root: `assets/<file>`.
    Document,
    /// CSS/JS stored inside `assets/` itself: a bare sibling reference,
    /// so the `assets/` segment is never doubled.
    AssetSibling,
}

// URL -> local filename. Only successfully downloaded URLs are inserted;
// everything else keeps its original external reference.
#[derive(Debug, Default)]
pub struct ReplacementMap {
    by_url: BTreeMap<String, String>,
}

impl ReplacementMap {
    pub fn insert(&mut self, url: impl Into<String>, filename: impl Into<String>) {
        self.by_url.insert(url.into(), filename.into());
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    // Literal substring replacement of every mapped URL, in both its raw
    // and attribute-escaped forms.
    pub fn apply(&self, text: &str, ctx: RefContext) -> String {
        let mut updated = text.to_string();
        for (url, filename) in &self.by_url {
            let local = match ctx {
                RefContext::Document => format!("{ASSETS_DIR}/{filename}"),
                RefContext::AssetSibling => filename.clone(),
            };
            updated = updated.replace(url, &local);

            let escaped = html_escape::encode_double_quoted_attribute(url);
            if escaped != *url {
                updated = updated.replace(escaped.as_ref(), &local);
            }
        }
        updated
    }
}

// Depth 0 -> "assets/", depth 1 -> "../assets/", and so on.
pub fn relative_assets_prefix(site_root: &Path, doc_path: &Path) -> String {
    let depth = doc_path
        .strip_prefix(site_root)
        .map(|rel| rel.components().count().saturating_sub(1))
        .unwrap_or(0);
    format!("{}{ASSETS_DIR}/", "../".repeat(depth))
}

// Attribute/url() openers that may carry a local assets reference. Each
// pattern ends with "assets/", which gets swapped for the document's
// relative prefix.
const LOCAL_REF_OPENERS: &[&str] = &[
    r#"src="assets/"#,
    r#"src='assets/"#,
    r#"href="assets/"#,
    r#"href='assets/"#,
    r#"srcset="assets/"#,
    r#"srcset='assets/"#,
    r#"url(assets/"#,
    r#"url("assets/"#,
    r#"url('assets/"#,
    // Entity-escaped variants seen in some mirrors.
    "src=&quot;assets/",
    "href=&quot;assets/",
    "srcset=&quot;assets/",
    "url(&quot;assets/",
];

/// Fix `assets/...` references in nested pages so they resolve against
/// the site root instead of the page's own folder.
pub fn fixup_nested_asset_refs(text: &str, prefix: &str) -> String {
    if prefix == "assets/" {
        return text.to_string();
    }

    let mut updated = text.to_string();
    for opener in LOCAL_REF_OPENERS {
        let head = &opener[..opener.len() - ASSETS_DIR.len() - 1];
        updated = updated.replace(opener, &format!("{head}{prefix}"));
    }
    updated
}

// Seen in some mirrors: a same-site URL wraps an `assets/...` segment in
// stray quoting, e.g. url(https://<host>/&quot;assets/foo.png&quot;).
// Collapse all three quoting variants (raw, entity, percent-encoded) to
// the bare capture. The pattern hardcodes the mirrored host, so it is
// built per site.
#[derive(Debug)]
pub struct BrokenRefCleaner {
    re: Regex,
}

impl BrokenRefCleaner {
    pub fn new(site: &SiteConfig) -> Self {
        let pattern = format!(
            r#"(?i)https?://{}/(?:[^\s"']*/)?(?:&quot;|"|%22)(assets/[^"&%<>\s)]+)(?:&quot;|"|%22)"#,
            regex::escape(&site.host)
        );
        let re = Regex::new(&pattern).expect("invalid regex: broken asset ref");
        Self { re }
    }

    pub fn clean(&self, text: &str) -> String {
        self.re.replace_all(text, "$1").into_owned()
    }
}

// For stylesheets that already live inside the assets directory.
pub fn strip_assets_prefix_in_css(text: &str) -> String {
    text.replace(r#"url("assets/"#, r#"url(""#)
        .replace(r#"url('assets/"#, r#"url('"#)
        .replace(r#"url(assets/"#, r#"url("#)
}
