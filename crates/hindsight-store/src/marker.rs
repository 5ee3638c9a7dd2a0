use std::fs;
use std::path::Path;

use globset::{Glob, GlobMatcher};
use hindsight_core::MarkerSearch;

/// Searches `*.md` artifacts directly under a directory for a session id.
///
/// A missing directory or a bad glob reads as "not found". Unreadable files
/// are skipped one by one and the scan continues. File I/O is synchronous
/// `std::fs`, run inline on the calling task.
pub struct FsMarkerSearch {
    pattern: String,
}

impl Default for FsMarkerSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl FsMarkerSearch {
    pub fn new() -> Self {
        Self::with_pattern("*.md")
    }

    pub fn with_pattern(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
        }
    }

    fn matcher(&self) -> anyhow::Result<GlobMatcher> {
        Ok(Glob::new(&self.pattern)?.compile_matcher())
    }

    fn search(&self, dir: &Path, session_id: &str) -> anyhow::Result<bool> {
        if session_id.is_empty() {
            return Ok(false);
        }
        let matcher = self.matcher()?;
        let needle = session_id.as_bytes();
        for entry in fs::read_dir(dir)? {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            if !matcher.is_match(entry.file_name()) {
                continue;
            }
            // One unreadable artifact must not hide the others.
            let content = match fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::debug!(
                        path = %entry.path().display(),
                        error = %e,
                        "skipping unreadable artifact"
                    );
                    continue;
                }
            };
            if contains_bytes(&content, needle) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Byte substring search; artifacts need not be valid UTF-8.
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[async_trait::async_trait]
impl MarkerSearch for FsMarkerSearch {
    async fn exists(&self, dir: &Path, session_id: &str) -> bool {
        match self.search(dir, session_id) {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "marker search failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_session_id_in_markdown() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("2026-10-01_process_slow-tests.md"),
            "Source session: ses_abc\n",
        )
        .unwrap();
        let search = FsMarkerSearch::new();
        assert!(search.exists(tmp.path(), "ses_abc").await);
        assert!(!search.exists(tmp.path(), "ses_other").await);
    }

    #[tokio::test]
    async fn ignores_non_markdown_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("notes.txt"), "ses_abc").unwrap();
        assert!(!FsMarkerSearch::new().exists(tmp.path(), "ses_abc").await);
    }

    #[tokio::test]
    async fn ignores_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("archive.md");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("old.md"), "ses_abc").unwrap();
        assert!(!FsMarkerSearch::new().exists(tmp.path(), "ses_abc").await);
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("does-not-exist");
        assert!(!FsMarkerSearch::new().exists(&missing, "ses_abc").await);
    }

    #[tokio::test]
    async fn invalid_pattern_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.md"), "ses_abc").unwrap();
        let search = FsMarkerSearch::with_pattern("[unclosed");
        assert!(!search.exists(tmp.path(), "ses_abc").await);
    }

    #[tokio::test]
    async fn marker_found_among_non_utf8_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        for i in 0..20 {
            fs::write(
                tmp.path().join(format!("2026-10-07_knowledge_{i}.md")),
                b"\xff\xfe broken \xff",
            )
            .unwrap();
        }
        fs::write(tmp.path().join("2026-10-01_process_a.md"), "ses_abc").unwrap();
        assert!(FsMarkerSearch::new().exists(tmp.path(), "ses_abc").await);
    }

    #[tokio::test]
    async fn id_inside_non_utf8_artifact_is_found() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.md"), b"\xff source: ses_abc \xfe").unwrap();
        assert!(FsMarkerSearch::new().exists(tmp.path(), "ses_abc").await);
        assert!(!FsMarkerSearch::new().exists(tmp.path(), "ses_xyz").await);
    }

    #[test]
    fn contains_bytes_edges() {
        assert!(contains_bytes(b"abc", b"bc"));
        assert!(!contains_bytes(b"ab", b"abc"));
        assert!(!contains_bytes(b"abc", b""));
    }

    #[tokio::test]
    async fn empty_session_id_never_matches() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.md"), "anything").unwrap();
        assert!(!FsMarkerSearch::new().exists(tmp.path(), "").await);
    }
}
