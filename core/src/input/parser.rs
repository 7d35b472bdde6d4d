//! Input Parser
//!
//! Builds the ordered list of [`SourceFile`]s handed to the tool, either from
//! paths given directly or from a change-set document.

use std::path::PathBuf;

use crate::error::CliError;
use crate::runner::SourceFile;

/// Input parser for toolrun
///
/// A change-set document is one of:
/// - **JSON**: an array whose items are path strings or objects with a
///   `path` field (`[{"path": "src/a.rs", "status": "modified"}]`)
/// - **Plain text**: one path per line; blank lines and `#` comments skipped
///
/// Order is preserved and duplicates are kept.
pub struct InputParser;

impl InputParser {
    pub fn from_paths<I, P>(paths: I) -> Vec<SourceFile>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths.into_iter().map(SourceFile::new).collect()
    }

    /// Parses a change-set document.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toolrun_core::input::InputParser;
    ///
    /// let files = InputParser::parse_change_set("src/main.rs\n# skip\n\nsrc/lib.rs\n").unwrap();
    /// assert_eq!(files.len(), 2);
    ///
    /// let files = InputParser::parse_change_set(r#"["a.py", {"path": "b.py"}]"#).unwrap();
    /// assert_eq!(files[1].path.to_str(), Some("b.py"));
    /// ```
    pub fn parse_change_set(input: &str) -> Result<Vec<SourceFile>, CliError> {
        let trimmed = input.trim_start();
        if trimmed.starts_with('[') {
            return serde_json::from_str::<Vec<SourceFile>>(trimmed).map_err(|e| {
                tracing::error!(error.kind = "input.parse_failed", error.message = %e);
                CliError::Input(format!("invalid JSON change-set: {e}"))
            });
        }

        Ok(input
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(SourceFile::new)
            .collect())
    }
}
