//! Tracked-file discovery.
//!
//! Enumeration goes through the version-control index (`git ls-files`), so
//! the result is deterministic and restartable: git emits paths in sorted
//! order and ignores untracked noise. The extension filter is a pure
//! function so it can be tested without a repository.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use crate::changelog::PipelineError;

/// Enumerate version-control-tracked files under `root` whose extension
/// matches `extension` (without the leading dot), in index order.
pub async fn tracked_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .arg("ls-files")
        .output()
        .await
        .map_err(|e| PipelineError::Discover(format!("failed to run git ls-files: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::Discover(format!(
            "git ls-files failed: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let files = filter_by_extension(stdout.lines(), extension);
    info!("discovered {} tracked .{} files", files.len(), extension);
    Ok(files)
}

/// Keep paths whose extension matches, preserving input order.
pub fn filter_by_extension<'a, I>(lines: I, extension: &str) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e == extension)
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filter_keeps_matching_extensions_in_order() {
        let lines = vec![
            "src/lib.rs",
            "README.md",
            "src/orders/service.rs",
            "Cargo.toml",
            "tests/gateway_http.rs",
        ];
        let files = filter_by_extension(lines, "rs");
        assert_eq!(
            files,
            vec![
                PathBuf::from("src/lib.rs"),
                PathBuf::from("src/orders/service.rs"),
                PathBuf::from("tests/gateway_http.rs"),
            ]
        );
    }

    #[test]
    fn filter_ignores_blank_lines_and_extensionless_paths() {
        let lines = vec!["", "  ", "Makefile", "script.rs"];
        assert_eq!(filter_by_extension(lines, "rs"), vec![PathBuf::from("script.rs")]);
    }

    #[test]
    fn filter_on_no_matches_is_empty() {
        let lines = vec!["a.md", "b.toml"];
        assert!(filter_by_extension(lines, "rs").is_empty());
    }

    #[tokio::test]
    async fn discovery_outside_a_repository_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = tracked_files(dir.path(), "rs").await;
        assert!(matches!(result, Err(PipelineError::Discover(_))));
    }
}
