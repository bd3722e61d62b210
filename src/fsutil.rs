use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

// Sorted for stable processing order; extensions match case-insensitively.
pub fn files_with_extension(root: &Path, exts: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| exts.iter().any(|want| ext.eq_ignore_ascii_case(want)))
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

// Undecodable bytes are replaced instead of failing, so one bad file
// never aborts a run.
pub fn read_text_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// Returns whether the file was touched.
pub fn write_if_changed(path: &Path, original: &str, updated: &str) -> io::Result<bool> {
    if updated == original {
        return Ok(false);
    }
    std::fs::write(path, updated)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collects_matching_files_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("news")).unwrap();
        fs::write(root.join("news/b.html"), "x").unwrap();
        fs::write(root.join("a.html"), "x").unwrap();
        fs::write(root.join("style.css"), "x").unwrap();
        fs::write(root.join("UPPER.HTML"), "x").unwrap();

        let files = files_with_extension(root, &["html"]);
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html"))
        }));
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn invalid_utf8_is_read_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.html");
        fs::write(&path, b"<p>caf\xe9</p>").unwrap();

        let text = read_text_lossy(&path).unwrap();
        assert!(text.starts_with("<p>caf"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn unchanged_content_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.html");
        fs::write(&path, "same").unwrap();

        assert!(!write_if_changed(&path, "same", "same").unwrap());
        assert!(write_if_changed(&path, "same", "different").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "different");
    }
}
