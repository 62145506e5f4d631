use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Every `*.ofx` file under `dir`, recursively.
///
/// Walk errors (unreadable subdirectories, broken links, a missing `dir`) are
/// skipped so one bad entry never hides the rest.
pub fn find_statement_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_ofx(p))
        .collect()
}

fn is_ofx(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase().ends_with(".ofx"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_nested_files_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024").join("marco");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("a.ofx"), "").unwrap();
        std::fs::write(nested.join("b.OFX"), "").unwrap();
        std::fs::write(nested.join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("extrato.ofx.bak"), "").unwrap();

        let files = find_statement_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.contains(&dir.path().join("a.ofx")));
        assert!(files.contains(&nested.join("b.OFX")));
    }

    #[test]
    fn test_directory_named_ofx_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("old.ofx")).unwrap();
        assert!(find_statement_files(dir.path()).is_empty());
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_statement_files(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_is_ofx() {
        assert!(is_ofx(Path::new("x/fatura.ofx")));
        assert!(is_ofx(Path::new("FATURA.Ofx")));
        assert!(!is_ofx(Path::new("fatura.qfx")));
        assert!(!is_ofx(Path::new("ofx")));
    }
}
