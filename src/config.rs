// Third-party hosts that never serve downloadable assets, even when the
// URL path carries an asset-like extension.
pub const SKIP_HOSTS: &[&str] = &["www.w3.org", "w3.org", "www.linkedin.com"];

pub const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "woff", "woff2", "ttf", "otf",
    "eot", "mp4", "webm", "pdf", "json",
];

pub const DEFAULT_SITE_HOST: &str = "videa-saversion.webflow.io";

pub const ASSETS_DIR: &str = "assets";

// The corrupted-quoting cleanup pattern is derived from the host, so
// pointing the tools at a different mirror only needs a different host.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub host: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SITE_HOST.to_string(),
        }
    }
}

impl SiteConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn is_own_host(&self, host: &str) -> bool {
        let own = self.host.to_ascii_lowercase();
        let host = host.to_ascii_lowercase();
        host == own || host.ends_with(&format!(".{own}"))
    }
}
