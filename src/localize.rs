use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assets::filename_for_url;
use crate::config::{ASSETS_DIR, SiteConfig};
use crate::extract::{extract_css_urls, extract_urls, is_asset_url};
use crate::fetch::{FetchError, Fetcher};
use crate::fsutil::{files_with_extension, read_text_lossy, write_if_changed};
use crate::rewrite::{
    BrokenRefCleaner, RefContext, ReplacementMap, fixup_nested_asset_refs,
    relative_assets_prefix, strip_assets_prefix_in_css,
};

#[derive(Debug, thiserror::Error)]
pub enum LocalizeError {
    #[error("site root not found or not a directory: {}", .0.display())]
    BadRoot(PathBuf),
    #[error("no .html files found under {}", .0.display())]
    NoHtmlFiles(PathBuf),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// Per-stage counters for one run.
#[derive(Debug, Default, Serialize)]
pub struct LocalizeReport {
    pub urls_found: usize,
    pub urls_discovered: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub html_rewritten: usize,
    pub html_total: usize,
    pub css_rewritten: usize,
    pub css_total: usize,
    pub js_rewritten: usize,
    pub js_total: usize,
}

impl fmt::Display for LocalizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} external asset URLs", self.urls_found)?;
        if self.urls_discovered > 0 {
            writeln!(
                f,
                "Found {} additional asset URLs (CSS/JS)",
                self.urls_discovered
            )?;
        }
        writeln!(
            f,
            "Downloaded {} assets ({} failed)",
            self.downloaded, self.failed
        )?;
        writeln!(
            f,
            "Rewrote {}/{} HTML files",
            self.html_rewritten, self.html_total
        )?;
        if self.css_total > 0 {
            writeln!(
                f,
                "Rewrote {}/{} CSS files",
                self.css_rewritten, self.css_total
            )?;
        }
        if self.js_total > 0 {
            writeln!(f, "Rewrote {}/{} JS files", self.js_rewritten, self.js_total)?;
        }
        write!(f, "Done")
    }
}

#[derive(Debug)]
pub struct Localizer {
    site: SiteConfig,
    fetcher: Fetcher,
    cleaner: BrokenRefCleaner,
}

impl Localizer {
    pub fn new(site: SiteConfig) -> Result<Self, LocalizeError> {
        let fetcher = Fetcher::new()?;
        let cleaner = BrokenRefCleaner::new(&site);
        Ok(Self {
            site,
            fetcher,
            cleaner,
        })
    }

    pub fn run(&self, site_root: &Path) -> Result<LocalizeReport, LocalizeError> {
        if !site_root.is_dir() {
            return Err(LocalizeError::BadRoot(site_root.to_path_buf()));
        }

        let assets_dir = site_root.join(ASSETS_DIR);
        let html_files = files_with_extension(site_root, &["html"]);
        if html_files.is_empty() {
            return Err(LocalizeError::NoHtmlFiles(site_root.to_path_buf()));
        }

        let mut report = LocalizeReport {
            html_total: html_files.len(),
            ..LocalizeReport::default()
        };
        let mut map = ReplacementMap::default();

        // Pass 1: URLs referenced directly by mirrored HTML.
        let mut urls = HashSet::new();
        for file in &html_files {
            urls.extend(extract_urls(&read_text_lossy(file)?));
        }
        let mut asset_urls: Vec<String> = urls
            .into_iter()
            .filter(|u| is_asset_url(u, &self.site))
            .collect();
        asset_urls.sort();
        report.urls_found = asset_urls.len();
        log::info!("found {} external asset URLs", asset_urls.len());

        for url in &asset_urls {
            self.localize_url(url, &assets_dir, &mut map, &mut report);
        }
        log::info!(
            "downloaded {} assets ({} failed)",
            report.downloaded,
            report.failed
        );

        for file in &html_files {
            let original = read_text_lossy(file)?;
            let mut updated = map.apply(&original, RefContext::Document);
            updated = self.cleaner.clean(&updated);
            let prefix = relative_assets_prefix(site_root, file);
            updated = fixup_nested_asset_refs(&updated, &prefix);
            if write_if_changed(file, &original, &updated)? {
                log::debug!("rewrote {}", file.display());
                report.html_rewritten += 1;
            }
        }
        log::info!(
            "rewrote {}/{} HTML files",
            report.html_rewritten,
            report.html_total
        );

        // Pass 2: URLs hiding inside downloaded stylesheets and scripts.
        let css_files = files_with_extension(&assets_dir, &["css"]);
        let js_files = files_with_extension(&assets_dir, &["js"]);
        report.css_total = css_files.len();
        report.js_total = js_files.len();

        let mut discovered = HashSet::new();
        for css in &css_files {
            discovered.extend(extract_css_urls(&read_text_lossy(css)?));
        }
        for js in &js_files {
            discovered.extend(extract_urls(&read_text_lossy(js)?));
        }

        let mut new_urls: Vec<String> = discovered
            .into_iter()
            .filter(|u| is_asset_url(u, &self.site) && !map.contains(u))
            .collect();
        new_urls.sort();
        report.urls_discovered = new_urls.len();
        if !new_urls.is_empty() {
            log::info!("found {} additional asset URLs (CSS/JS)", new_urls.len());
        }

        for url in &new_urls {
            self.localize_url(url, &assets_dir, &mut map, &mut report);
        }

        for css in &css_files {
            let original = read_text_lossy(css)?;
            let mut updated = map.apply(&original, RefContext::AssetSibling);
            updated = self.cleaner.clean(&updated);
            // The stylesheet sits inside assets/, so a `url(assets/...)`
            // reference would resolve to assets/assets/.
            updated = strip_assets_prefix_in_css(&updated);
            if write_if_changed(css, &original, &updated)? {
                report.css_rewritten += 1;
            }
        }

        for js in &js_files {
            let original = read_text_lossy(js)?;
            let mut updated = map.apply(&original, RefContext::AssetSibling);
            updated = self.cleaner.clean(&updated);
            if write_if_changed(js, &original, &updated)? {
                report.js_rewritten += 1;
            }
        }

        Ok(report)
    }

    // Failures only bump the counter: the URL stays external in every
    // document. Files already present from an earlier run are not
    // re-fetched.
    fn localize_url(
        &self,
        url: &str,
        assets_dir: &Path,
        map: &mut ReplacementMap,
        report: &mut LocalizeReport,
    ) {
        let filename = filename_for_url(url);
        let dest = assets_dir.join(&filename);

        let already_present = dest
            .metadata()
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);

        if already_present {
            map.insert(url, filename);
            return;
        }

        match self.fetcher.download(url, &dest) {
            Ok(()) => {
                report.downloaded += 1;
                map.insert(url, filename);
            }
            Err(e) => {
                report.failed += 1;
                log::warn!("failed to download {url}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn localizer() -> Localizer {
        Localizer::new(SiteConfig::default()).expect("failed to build localizer")
    }

    // Seed the asset ahead of time so the pipeline takes the
    // already-present path and never touches the network.
    fn seed_asset(root: &Path, name: &str) {
        let assets = root.join("assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join(name), b"payload").unwrap();
    }

    #[test]
    fn missing_root_is_fatal() {
        let err = localizer().run(Path::new("/nonexistent/mirror")).unwrap_err();
        assert!(matches!(err, LocalizeError::BadRoot(_)));
    }

    #[test]
    fn root_without_html_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.txt"), "not a site").unwrap();

        let err = localizer().run(dir.path()).unwrap_err();
        assert!(matches!(err, LocalizeError::NoHtmlFiles(_)));
    }

    #[test]
    fn root_page_gets_local_asset_reference() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("index.html"),
            r#"<img src="https://cdn.example.com/logo.png">"#,
        )
        .unwrap();
        seed_asset(root, "logo.png");

        let report = localizer().run(root).unwrap();

        let html = fs::read_to_string(root.join("index.html")).unwrap();
        assert_eq!(html, r#"<img src="assets/logo.png">"#);
        assert_eq!(report.urls_found, 1);
        assert_eq!(report.downloaded, 0, "seeded asset must not be re-fetched");
        assert_eq!(report.failed, 0);
        assert_eq!(report.html_rewritten, 1);
    }

    #[test]
    fn nested_page_gets_relative_prefix() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("news")).unwrap();
        fs::write(
            root.join("news/a.html"),
            r#"<img src="assets/logo.png">"#,
        )
        .unwrap();

        let report = localizer().run(root).unwrap();

        let html = fs::read_to_string(root.join("news/a.html")).unwrap();
        assert_eq!(html, r#"<img src="../assets/logo.png">"#);
        assert_eq!(report.html_rewritten, 1);
    }

    #[test]
    fn stylesheet_in_assets_loses_redundant_prefix() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        let assets = root.join("assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(
            assets.join("site.css"),
            r#".hero { background: url("assets/bg.png"); }"#,
        )
        .unwrap();

        let report = localizer().run(root).unwrap();

        let css = fs::read_to_string(assets.join("site.css")).unwrap();
        assert_eq!(css, r#".hero { background: url("bg.png"); }"#);
        assert_eq!(report.css_rewritten, 1);
        assert_eq!(report.css_total, 1);
    }

    #[test]
    fn quoting_artifacts_collapse_in_html() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("index.html"),
            r#"<div style="background:url(https://videa-saversion.webflow.io/&quot;assets/hero.png&quot;)"></div>"#,
        )
        .unwrap();

        localizer().run(root).unwrap();

        let html = fs::read_to_string(root.join("index.html")).unwrap();
        assert!(html.contains("url(assets/hero.png)"));
        assert!(!html.contains("videa-saversion.webflow.io"));
    }

    #[test]
    fn failed_download_leaves_external_url_untouched() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        // Port 1 on loopback refuses connections, so every attempt fails.
        fs::write(
            root.join("index.html"),
            r#"<img src="http://127.0.0.1:1/x.png">"#,
        )
        .unwrap();

        let report = localizer().run(root).unwrap();

        assert_eq!(report.urls_found, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.downloaded, 0);
        assert_eq!(report.html_rewritten, 0);

        let html = fs::read_to_string(root.join("index.html")).unwrap();
        assert_eq!(html, r#"<img src="http://127.0.0.1:1/x.png">"#);
        assert!(!root.join("assets/x.png").exists());
    }

    #[test]
    fn second_run_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("news")).unwrap();
        fs::write(
            root.join("index.html"),
            r#"<img src="https://cdn.example.com/logo.png">"#,
        )
        .unwrap();
        fs::write(root.join("news/a.html"), r#"<img src="assets/logo.png">"#).unwrap();
        seed_asset(root, "logo.png");

        let first = localizer().run(root).unwrap();
        assert_eq!(first.html_rewritten, 2);

        let second = localizer().run(root).unwrap();
        assert_eq!(second.downloaded, 0);
        assert_eq!(second.failed, 0);
        assert_eq!(second.html_rewritten, 0);
        assert_eq!(second.css_rewritten, 0);
        assert_eq!(second.js_rewritten, 0);
    }

    #[test]
    fn pass_two_rewrites_discovered_references() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        let assets = root.join("assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(
            assets.join("site.css"),
            r#"@font-face { src: url("https://fonts.example.com/inter.woff2"); }"#,
        )
        .unwrap();
        fs::write(assets.join("inter.woff2"), b"font-bytes").unwrap();

        let report = localizer().run(root).unwrap();

        let css = fs::read_to_string(assets.join("site.css")).unwrap();
        assert_eq!(css, r#"@font-face { src: url("inter.woff2"); }"#);
        assert_eq!(report.urls_discovered, 1);
        assert_eq!(report.downloaded, 0);
    }
}
