use std::path::Path;

use sha2::{Digest, Sha256};
use url::Url;

fn sha256_hex(input: &str, len: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(len);
    hex
}

// "a.b.c" -> ("a.b", ".c"), "noext" -> ("noext", "").
fn split_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Derive the local filename for an asset URL. Pure and stable across
/// runs, which is what makes re-runs idempotent: the last path segment
/// (or a 16-char URL digest when there is none), sanitized, with an
/// 8-char query digest spliced in so same-named variants do not collide.
pub fn filename_for_url(url: &str) -> String {
    let (path, query) = match Url::parse(url) {
        Ok(parsed) => (
            parsed.path().to_string(),
            parsed.query().map(str::to_string),
        ),
        Err(_) => (url.to_string(), None),
    };

    let base = Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if base.is_empty() {
        return sha256_hex(url, 16);
    }

    let mut name: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if let Some(query) = query {
        let qhash = sha256_hex(&query, 8);
        let (stem, ext) = split_ext(&name);
        name = format!("{stem}.{qhash}{ext}");
    }

    if name.len() > 180 {
        let (stem, ext) = split_ext(&name);
        name = format!("{}{ext}", &stem[..stem.len().min(150)]);
    }

    name
}
