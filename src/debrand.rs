// A fixed table of text substitutions over the mirrored HTML, plus a
// validated plan of file renames for brand-bearing asset and page names.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::ASSETS_DIR;
use crate::fsutil::{files_with_extension, read_text_lossy};

#[derive(Debug, thiserror::Error)]
pub enum DebrandError {
    #[error("site root not found: {}", .0.display())]
    BadRoot(PathBuf),
    #[error("refusing no-op rename: {}", .0.display())]
    NoopRename(PathBuf),
    #[error("two renames target the same destination: {}", .0.display())]
    DuplicateTarget(PathBuf),
    #[error("rename destination already exists: {}", .0.display())]
    TargetExists(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// Webflow bundles whose filenames carry the brand.
const CSS_BUNDLE: (&str, &str) = ("videa-saversion.9b1352011.css", "site.9b1352011.css");
const JS_BUNDLE: (&str, &str) = ("videa-saversion.d9a4b8013.js", "site.d9a4b8013.js");

// Asset images with the brand in the filename.
const BRAND_IMAGES: &[&str] = &[
    "63b86b66011d4fd93a44a1a7_videa_insights.jpg",
    "63b86b66011d4fd27044a1c7_videa_detect.jpg",
    "63b86b66011d4fd27044a1c7_videa_detect-p-1080.jpeg",
];

static RE_MAILTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mailto:contact@videa\.ai\?subject=Videa%20Health%20Contact%20Form")
        .expect("invalid regex: mailto")
});
static RE_CONTACT_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)contact\s*@videa\.ai").expect("invalid regex: contact email")
});
static RE_BRAND_SITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(www\.)?videa\.ai/?").expect("invalid regex: brand site")
});
static RE_JOBS_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://jobs\.lever\.co/videahealth[^"']*"#)
        .expect("invalid regex: jobs link")
});
static RE_LINKEDIN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://www\.linkedin\.com/company/videahealth/?")
        .expect("invalid regex: linkedin link")
});
static RE_TITLE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>\s*Videa\s*-\s*").expect("invalid regex: title prefix"));
static RE_META_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(content=")\s*Videa\s*-\s*"#).expect("invalid regex: meta prefix")
});
static RE_TITLE_PRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<title>\s*Videa\s+Press\s*-\s*").expect("invalid regex: title press")
});
static RE_META_PRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(content=")\s*Videa\s+Press\s*-\s*"#).expect("invalid regex: meta press")
});
static RE_BRAND_HEALTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVideaHealth\b").expect("invalid regex: brand health"));
static RE_BRAND_HEALTH_SPACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVidea\s+Health\b").expect("invalid regex: spaced brand"));
static RE_BRAND_HEALTHCARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVidea\s+Healthcare\b").expect("invalid regex: healthcare"));
static RE_BRAND_TEAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVidea\s+Team\b").expect("invalid regex: team"));
static RE_BRAND_DETECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVidea\s+Detect\b").expect("invalid regex: detect"));
static RE_BRAND_INSIGHTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVidea\s+Insights\b").expect("invalid regex: insights"));
static RE_POSSESSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bVidea(?:Health)?[’']s\b").expect("invalid regex: possessive")
});
static RE_BARE_BRAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVidea\b").expect("invalid regex: bare brand"));
static RE_DOUBLED_HYPHENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("invalid regex: doubled hyphens"));

// Substitution order: links and contact details, titles, brand phrases,
// then any standalone brand word.
pub fn apply_rewrites(text: &str) -> String {
    let mut text = RE_MAILTO
        .replace_all(text, "mailto:contact@example.com?subject=Contact%20Form")
        .into_owned();
    text = RE_CONTACT_EMAIL
        .replace_all(&text, "contact@example.com")
        .into_owned();

    text = RE_BRAND_SITE.replace_all(&text, "#").into_owned();
    text = RE_JOBS_LINK.replace_all(&text, "#").into_owned();
    text = RE_LINKEDIN_LINK.replace_all(&text, "#").into_owned();

    text = RE_TITLE_PRESS
        .replace_all(&text, "<title>Press - ")
        .into_owned();
    text = RE_META_PRESS.replace_all(&text, "${1}Press - ").into_owned();
    text = RE_TITLE_PREFIX.replace_all(&text, "<title>").into_owned();
    text = RE_META_PREFIX.replace_all(&text, "$1").into_owned();

    text = RE_BRAND_HEALTH.replace_all(&text, "the company").into_owned();
    text = RE_BRAND_HEALTH_SPACED
        .replace_all(&text, "the company")
        .into_owned();
    text = RE_BRAND_HEALTHCARE
        .replace_all(&text, "Healthcare")
        .into_owned();

    text = RE_BRAND_TEAM.replace_all(&text, "Our Team").into_owned();
    text = RE_BRAND_DETECT.replace_all(&text, "Detect").into_owned();
    text = RE_BRAND_INSIGHTS.replace_all(&text, "Insights").into_owned();

    text = text.replace("VideaDetect", "Detect");
    text = text.replace("VideaTeach", "Teach");

    text = RE_POSSESSIVE.replace_all(&text, "our").into_owned();
    text = RE_BARE_BRAND.replace_all(&text, "").into_owned();

    text.replace(
        r#"data-wf-domain="videa-saversion.webflow.io""#,
        r#"data-wf-domain="""#,
    )
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

// Only files currently present on disk get planned.
pub fn build_rename_plan(site_root: &Path) -> Vec<Rename> {
    let assets = site_root.join(ASSETS_DIR);
    let mut plan = Vec::new();

    for (old, new) in [CSS_BUNDLE, JS_BUNDLE] {
        let from = assets.join(old);
        if from.exists() {
            plan.push(Rename {
                from,
                to: assets.join(new),
            });
        }
    }

    for old in BRAND_IMAGES {
        let from = assets.join(old);
        if from.exists() {
            let new = old.replace("_videa_", "_").replace("videa_", "");
            plan.push(Rename {
                from,
                to: assets.join(new),
            });
        }
    }

    for page in files_with_extension(&site_root.join("news"), &["html"]) {
        let Some(name) = page.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.contains("videahealth") {
            continue;
        }
        let mut new = name.replace("-with-videahealth-to-", "-to-");
        new = new.replace("-videahealth-", "-");
        new = new.replace("videahealth-", "");
        new = new.replace("-videahealth", "");
        new = RE_DOUBLED_HYPHENS.replace_all(&new, "-").into_owned();
        plan.push(Rename {
            to: page.with_file_name(new),
            from: page,
        });
    }

    plan
}

/// Rejects the plan before anything is touched: no-op renames, duplicate
/// destinations, and destinations that already exist outside the plan.
pub fn validate_rename_plan(plan: &[Rename]) -> Result<(), DebrandError> {
    let sources: Vec<&PathBuf> = plan.iter().map(|r| &r.from).collect();
    let mut targets = Vec::new();

    for rename in plan {
        if rename.from == rename.to {
            return Err(DebrandError::NoopRename(rename.from.clone()));
        }
        if targets.contains(&&rename.to) {
            return Err(DebrandError::DuplicateTarget(rename.to.clone()));
        }
        targets.push(&rename.to);
        if rename.to.exists() && !sources.contains(&&rename.to) {
            return Err(DebrandError::TargetExists(rename.to.clone()));
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct DebrandReport {
    pub applied: bool,
    pub files_changed: usize,
    pub renames: Vec<Rename>,
}

impl fmt::Display for DebrandReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.applied { "Applied" } else { "Dry-run" };
        writeln!(f, "{action}: updated {} text files", self.files_changed)?;
        write!(f, "{action}: planned {} renames", self.renames.len())?;
        for rename in &self.renames {
            write!(
                f,
                "\n - {} -> {}",
                rename.from.display(),
                rename.to.display()
            )?;
        }
        Ok(())
    }
}

// Content is rewritten before any rename; writes happen in apply mode
// only.
pub fn run(site_root: &Path, apply: bool) -> Result<DebrandReport, DebrandError> {
    if !site_root.is_dir() {
        return Err(DebrandError::BadRoot(site_root.to_path_buf()));
    }

    let plan = build_rename_plan(site_root);
    validate_rename_plan(&plan)?;

    // References are replaced by basename (works for both root and nested
    // pages), and page slugs by HTML file stem.
    let basename_map: BTreeMap<String, String> = plan
        .iter()
        .filter_map(|r| Some((name_of(&r.from)?, name_of(&r.to)?)))
        .collect();
    let stem_map: BTreeMap<String, String> = plan
        .iter()
        .filter(|r| {
            r.from
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html"))
        })
        .filter_map(|r| Some((stem_of(&r.from)?, stem_of(&r.to)?)))
        .collect();

    let mut files_changed = 0;

    for page in files_with_extension(site_root, &["html"]) {
        let original = read_text_lossy(&page)?;
        let mut updated = original.clone();

        for (old, new) in &basename_map {
            updated = updated.replace(old, new);
        }
        for (old, new) in &stem_map {
            updated = updated.replace(old, new);
        }
        updated = apply_rewrites(&updated);

        if updated != original {
            files_changed += 1;
            if apply {
                std::fs::write(&page, updated)?;
            } else {
                log::debug!("would update {}", page.display());
            }
        }
    }

    // The main CSS bundle references renamed background images by name.
    let css_bundle = site_root.join(ASSETS_DIR).join(CSS_BUNDLE.0);
    if css_bundle.exists() {
        let original = read_text_lossy(&css_bundle)?;
        let mut updated = original.clone();
        for (old, new) in &basename_map {
            updated = updated.replace(old, new);
        }
        if updated != original {
            files_changed += 1;
            if apply {
                std::fs::write(&css_bundle, updated)?;
            }
        }
    }

    if apply {
        // Renames happen after content updates, longest source path first
        // so nested pages move before anything shadowing them.
        let mut ordered: Vec<&Rename> = plan.iter().collect();
        ordered.sort_by_key(|r| std::cmp::Reverse(r.from.as_os_str().len()));
        for rename in ordered {
            if rename.from.exists() {
                std::fs::rename(&rename.from, &rename.to)?;
                log::info!(
                    "renamed {} -> {}",
                    rename.from.display(),
                    rename.to.display()
                );
            }
        }
    }

    Ok(DebrandReport {
        applied: apply,
        files_changed,
        renames: plan,
    })
}

fn name_of(path: &Path) -> Option<String> {
    path.file_name().and_then(|n| n.to_str()).map(str::to_string)
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().and_then(|n| n.to_str()).map(str::to_string)
}
