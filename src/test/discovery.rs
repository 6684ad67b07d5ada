//! Resolves the input path to the testcase files it names.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::io_failure;
use crate::HarnessError;

/// Returns true if the given path has a .xml extension.
fn is_testcase_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "xml")
}

/// A file path is returned as is, whatever its extension. A directory is
/// scanned recursively for `.xml` files.
///
/// The returned list of files is sorted to ensure deterministic execution order.
pub fn discover_testcase_files(root: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| io_failure(root.display().to_string(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_testcase_file(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn directories_yield_sorted_xml_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        for name in ["b.xml", "a.xml", "notes.txt", "nested/c.xml"] {
            fs::write(dir.path().join(name), "<Test>\n</Test>\n").unwrap();
        }

        let files = discover_testcase_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.xml", "b.xml", "nested/c.xml"]);
    }

    #[test]
    fn a_file_is_taken_as_given() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("cases.txt");
        fs::write(&file, "").unwrap();
        assert_eq!(discover_testcase_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        assert!(discover_testcase_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let err = discover_testcase_files(Path::new("no/such/dir")).unwrap_err();
        assert!(matches!(err.kind, crate::ErrorKind::Io { .. }));
    }
}
