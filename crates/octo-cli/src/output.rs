//! Captured command output.
//!
//! Handlers build their text into a [`CommandOutput`] instead of printing
//! directly, so tests can assert on exactly what a user would see.

use std::fmt::Write as _;
use std::io::Write as _;

use octo_core::{Error, Result};
use serde::Serialize;

/// Stdout text plus stderr lines produced by one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: Vec<String>,
}

impl CommandOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one stdout line.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.stdout.push_str(text.as_ref());
        self.stdout.push('\n');
    }

    /// Append an empty stdout line.
    pub fn blank(&mut self) {
        self.stdout.push('\n');
    }

    /// Append pre-rendered text that already ends in newlines.
    pub fn push_block(&mut self, text: &str) {
        self.stdout.push_str(text);
    }

    /// Append formatted text without a trailing newline.
    pub fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.stdout.write_fmt(args);
    }

    /// Append one stderr line.
    pub fn note(&mut self, text: impl Into<String>) {
        self.stderr.push(text.into());
    }

    /// Report GraphQL errors that came back next to usable data.
    pub fn graphql_warnings(&mut self, warnings: &[String]) {
        for message in warnings {
            self.stderr.push(format!("GraphQL error: {message}"));
        }
    }

    /// Builder form of [`CommandOutput::graphql_warnings`].
    pub fn with_warnings(mut self, warnings: &[String]) -> Self {
        self.graphql_warnings(warnings);
        self
    }

    /// Pretty-printed JSON as the whole stdout payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let mut out = Self::new();
        out.line(json_pretty(value)?);
        Ok(out)
    }

    /// Write stderr lines first, then stdout.
    pub fn emit(&self) -> Result<()> {
        let stderr = std::io::stderr();
        let mut err = stderr.lock();
        for line in &self.stderr {
            writeln!(err, "{line}")?;
        }
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(self.stdout.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Serialize with two-space indentation.
pub fn json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Hint shown under a page that has more results.
pub fn more_results_hint(first: u32, end_cursor: Option<&str>) -> String {
    let mut hint = format!(
        "  ... more results available (use --first {} to see more",
        first.saturating_mul(2)
    );
    if let Some(cursor) = end_cursor {
        let _ = write!(hint, ", or --after {cursor} for the next page");
    }
    hint.push(')');
    hint
}

/// Lines printed to stderr for a failed command.
///
/// GraphQL failures list each server message on its own line before the
/// summary, as do warnings that came with the failing response. A follow-up
/// hint, if any, comes last.
pub fn error_lines(err: &Error) -> Vec<String> {
    let mut lines: Vec<String> = err
        .warnings()
        .iter()
        .map(|m| format!("GraphQL error: {m}"))
        .collect();
    if let Error::GraphQl { messages } = err.root() {
        lines.extend(messages.iter().map(|m| format!("GraphQL error: {m}")));
    }
    lines.push(format!("Error: {err}"));
    if let Some(hint) = err.hint() {
        lines.push(hint.to_string());
    }
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lines_and_blanks() {
        let mut out = CommandOutput::new();
        out.line("a");
        out.blank();
        write!(out, "{}-{}", 1, 2);
        out.line("");
        assert_eq!(out.stdout, "a\n\n1-2\n");
    }

    #[test]
    fn test_graphql_warnings_go_to_stderr() {
        let mut out = CommandOutput::new();
        out.graphql_warnings(&["bad field".to_string()]);
        assert!(out.stdout.is_empty());
        assert_eq!(out.stderr, vec!["GraphQL error: bad field"]);
    }

    #[test]
    fn test_json_is_indented() {
        let out = CommandOutput::json(&json!({"totalCount": 3})).unwrap();
        assert_eq!(out.stdout, "{\n  \"totalCount\": 3\n}\n");
    }

    #[test]
    fn test_more_results_hint() {
        assert_eq!(
            more_results_hint(50, None),
            "  ... more results available (use --first 100 to see more)"
        );
        assert!(more_results_hint(10, Some("abc")).contains("--after abc"));
    }

    #[test]
    fn test_error_lines_for_graphql_failure() {
        let err = Error::GraphQl {
            messages: vec!["one".into(), "two".into()],
        };
        let lines = error_lines(&err);
        assert_eq!(lines[0], "GraphQL error: one");
        assert_eq!(lines[1], "GraphQL error: two");
        assert!(lines[2].starts_with("Error: GraphQL request failed"));
    }

    #[test]
    fn test_error_lines_with_hint() {
        let lines = error_lines(&Error::auth("HTTP 401"));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("LogIn"));
    }
}
