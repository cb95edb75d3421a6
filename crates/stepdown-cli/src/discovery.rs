//! Locating spec and concept files on disk.

use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Extensions recognised as specification files.
pub const SPEC_EXTENSIONS: &[&str] = &["spec", "md"];

/// Extensions recognised as concept files.
pub const CONCEPT_EXTENSIONS: &[&str] = &["cpt"];

/// Collect every file under `roots` whose extension is one of `extensions`.
///
/// Directories are searched recursively; a root naming a file is taken as
/// is when its extension matches. The result is sorted and free of
/// duplicates so that output does not depend on directory iteration order.
///
/// # Errors
///
/// Returns [`CliError::MissingPath`] when a root does not exist and
/// [`CliError::Io`] when a root directory cannot be read.
pub fn collect_files(roots: &[PathBuf], extensions: &[&str]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for root in roots {
        if root.is_file() {
            if has_extension(root, extensions) {
                files.push(root.clone());
            }
            continue;
        }
        if !root.is_dir() {
            return Err(CliError::MissingPath(root.clone()));
        }
        let entries = std::fs::read_dir(root).map_err(|source| CliError::Io {
            path: root.clone(),
            source,
        })?;
        for entry in entries.filter_map(Result::ok) {
            collect_recursive(&entry.path(), extensions, &mut files);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn collect_recursive(path: &Path, extensions: &[&str], files: &mut Vec<PathBuf>) {
    if path.is_dir() {
        let Ok(entries) = std::fs::read_dir(path) else {
            tracing::warn!(path = %path.display(), "skipping unreadable directory");
            return;
        };
        for entry in entries.filter_map(Result::ok) {
            collect_recursive(&entry.path(), extensions, files);
        }
    } else if has_extension(path, extensions) {
        files.push(path.to_path_buf());
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use std::fs;

    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    #[fixture]
    fn tree() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let nested = dir.path().join("billing").join("refunds");
        fs::create_dir_all(&nested).expect("nested dirs");
        fs::write(dir.path().join("login.spec"), "# Login").expect("write spec");
        fs::write(dir.path().join("README.md"), "# Readme").expect("write md");
        fs::write(nested.join("refund.SPEC"), "# Refund").expect("write nested spec");
        fs::write(nested.join("steps.cpt"), "# Step").expect("write concept");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write txt");
        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    #[rstest]
    fn finds_specs_recursively(tree: TempDir) {
        let files = collect_files(&[tree.path().to_path_buf()], SPEC_EXTENSIONS)
            .expect("discovery succeeds");
        let mut found = names(&files);
        found.sort();
        assert_eq!(found, ["README.md", "login.spec", "refund.SPEC"]);
    }

    #[rstest]
    fn finds_concepts_separately(tree: TempDir) {
        let files = collect_files(&[tree.path().to_path_buf()], CONCEPT_EXTENSIONS)
            .expect("discovery succeeds");
        assert_eq!(names(&files), ["steps.cpt"]);
    }

    #[rstest]
    fn overlapping_roots_do_not_duplicate(tree: TempDir) {
        let roots = [tree.path().to_path_buf(), tree.path().join("login.spec")];
        let files = collect_files(&roots, SPEC_EXTENSIONS).expect("discovery succeeds");
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = collect_files(&[PathBuf::from("definitely/not/here")], SPEC_EXTENSIONS);
        assert!(matches!(result, Err(CliError::MissingPath(_))));
    }
}
