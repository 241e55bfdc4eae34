//! Text summary builder for CLI output.
//!
//! Formats a projected run and the remote directory listing as plain lines
//! for the one-shot modes.

use crate::model::{ExecutionResult, FileEntry};
use crate::session::Session;

/// Pre-formatted lines, split by destination stream.
#[derive(Debug, Default)]
pub(crate) struct TextSummary {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

pub(crate) fn format_execution_time(seconds: f64) -> String {
    format!("Execution time: {seconds:.3}s")
}

/// Program output goes to stdout unchanged; errors, the banner and timing go
/// to stderr so the output can be piped.
pub(crate) fn build_run_summary(session: &Session) -> TextSummary {
    let mut summary = TextSummary::default();

    if let Some(banner) = session.banner.as_deref() {
        summary.stderr.push(banner.to_string());
    }

    let Some(result) = session.result.as_ref() else {
        return summary;
    };
    push_result(&mut summary, result);
    summary
}

fn push_result(summary: &mut TextSummary, result: &ExecutionResult) {
    if let Some(output) = result.output() {
        // Keep the program's own line structure; drop only the final newline.
        let output = output.strip_suffix('\n').unwrap_or(output);
        if !output.is_empty() {
            summary.stdout.extend(output.split('\n').map(str::to_string));
        }
    }
    if let Some(error) = result.error() {
        summary.stderr.extend(error.lines().map(str::to_string));
    }
    if let Some(secs) = result.execution_time_seconds {
        summary.stderr.push(format_execution_time(secs));
    }
}

/// One row per file: name, size, modification time.
pub(crate) fn build_listing_summary(files: &[FileEntry]) -> TextSummary {
    let mut summary = TextSummary::default();
    if files.is_empty() {
        summary.stderr.push("No saved files".to_string());
        return summary;
    }
    let width = files
        .iter()
        .map(|f| f.filename.chars().count())
        .max()
        .unwrap_or(0);
    for f in files {
        summary.stdout.push(format!(
            "{:<width$}  {:>9}  {}",
            f.filename,
            f.size_display(),
            f.modified_display(),
        ));
    }
    summary
        .stderr
        .push(format!("{} file{}", files.len(), if files.len() == 1 { "" } else { "s" }));
    summary
}
