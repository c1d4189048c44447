//! The markdown performance report.
//!
//! The report holds a `## Model performance` heading, one blank line, and a
//! pipe table with one row per variant. The table ends at the first line
//! after it that does not start with `|`, or at end of file. Updating a
//! variant replaces its row in place, or appends a row at the end of the
//! table; nothing outside the table changes.

use crate::error::{LexiglotError, Result};
use crate::metrics::ReportMetrics;
use crate::persistence::StagedFile;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Heading that introduces the performance table.
pub const REPORT_HEADING: &str = "## Model performance";

/// Contents used when the report file does not exist yet.
pub const REPORT_TEMPLATE: &str = "## Model performance\n\n\
|name|f1|recall|precision|accuracy|fp|fn|tp|tn|\n\
|---|---|---|---|---|---|---|---|---|\n";

/// Return `text` with the row for `metrics.name` replaced or appended.
///
/// # Errors
/// Returns [`LexiglotError::Report`] if the heading is missing.
pub fn update_report_text(text: &str, metrics: &ReportMetrics) -> Result<String> {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();

    let heading = lines
        .iter()
        .position(|l| l.trim() == REPORT_HEADING)
        .ok_or_else(|| LexiglotError::Report(format!("no `{REPORT_HEADING}` heading found")))?;
    // the line after the heading is the blank separator
    let start = heading + 1;
    let end = (start + 1..lines.len())
        .find(|&i| !lines[i].starts_with('|'))
        .unwrap_or(lines.len());

    let row = metrics.row();
    let key = format!("|{}|", metrics.name);
    let mut replaced = false;
    for line in lines.iter_mut().take(end).skip(start) {
        if line.starts_with(&key) {
            *line = row.clone();
            replaced = true;
        }
    }

    if !replaced {
        if let Some(prev) = end.checked_sub(1).and_then(|i| lines.get_mut(i)) {
            if !prev.ends_with('\n') {
                prev.push('\n');
            }
        }
        lines.insert(end, row);
    }

    Ok(lines.concat())
}

/// A report file on disk.
#[derive(Clone, Debug)]
pub struct PerformanceReport {
    path: PathBuf,
}

impl PerformanceReport {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents, or [`REPORT_TEMPLATE`] if the file does not exist.
    pub fn read(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "report missing, starting from template");
                Ok(REPORT_TEMPLATE.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the updated contents beside the report without replacing it.
    ///
    /// The report changes only once the returned stage is committed.
    ///
    /// # Errors
    /// Returns [`LexiglotError::Report`] if the heading is missing, or an
    /// I/O error if the staged file cannot be written.
    pub fn prepare(&self, metrics: &ReportMetrics) -> Result<StagedFile> {
        let text = update_report_text(&self.read()?, metrics)?;
        StagedFile::stage(&self.path, text.as_bytes())
    }

    /// Read, update and write back the row for `metrics.name`.
    pub fn update(&self, metrics: &ReportMetrics) -> Result<()> {
        self.prepare(metrics)?.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(name: &str, f1: f64) -> ReportMetrics {
        ReportMetrics {
            name: name.to_string(),
            f1,
            recall: 0.5,
            precision: 0.5,
            accuracy: 0.5,
            false_positive: 0.5,
            false_negative: 0.5,
            true_positive: 0.5,
            true_negative: 0.5,
        }
    }

    const DOC: &str = "# Title\n\n## Model performance\n\n|name|f1|\n|---|---|\n|NGRAM_SVC|old|\n\n## Usage\nrun it\n";

    #[test]
    fn test_replaces_existing_row() {
        let out = update_report_text(DOC, &metrics("NGRAM_SVC", 1.0)).unwrap();
        assert!(out.contains(&metrics("NGRAM_SVC", 1.0).row()));
        assert!(!out.contains("|NGRAM_SVC|old|"));
        assert!(out.ends_with("\n## Usage\nrun it\n"));
        assert_eq!(out.lines().count(), DOC.lines().count());
    }

    #[test]
    fn test_appends_at_end_of_table() {
        let out = update_report_text(DOC, &metrics("NGRAM_KNN", 0.25)).unwrap();
        let expected = format!(
            "# Title\n\n## Model performance\n\n|name|f1|\n|---|---|\n|NGRAM_SVC|old|\n{}\n## Usage\nrun it\n",
            metrics("NGRAM_KNN", 0.25).row()
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_update_is_idempotent() {
        let m = metrics("HAND_ENGINEERED_KNN", 0.7);
        let once = update_report_text(DOC, &m).unwrap();
        let twice = update_report_text(&once, &m).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.matches("|HAND_ENGINEERED_KNN|").count(), 1);
    }

    #[test]
    fn test_prefix_names_do_not_collide() {
        let doc = "## Model performance\n\n|HAND_ENGINEERED_SVC|x|\n";
        let out =
            update_report_text(doc, &metrics("HAND_ENGINEERED_AND_NGRAMS_SVC", 0.1)).unwrap();
        assert!(out.contains("|HAND_ENGINEERED_SVC|x|\n"));
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn test_table_at_end_of_file_without_newline() {
        let doc = "## Model performance\n\n|name|f1|";
        let out = update_report_text(doc, &metrics("NGRAM_SVC", 0.5)).unwrap();
        assert_eq!(
            out,
            format!("## Model performance\n\n|name|f1|\n{}", metrics("NGRAM_SVC", 0.5).row())
        );
    }

    #[test]
    fn test_missing_heading() {
        let err = update_report_text("# Nothing here\n", &metrics("NGRAM_SVC", 0.5)).unwrap_err();
        assert!(matches!(err, LexiglotError::Report(_)));
    }

    #[test]
    fn test_prepare_fails_when_directory_is_missing() {
        let dir = std::env::temp_dir().join("lexiglot_report_missing_dir");
        std::fs::remove_dir_all(&dir).ok();
        let report = PerformanceReport::new(dir.join("README.md"));
        let err = report.prepare(&metrics("NGRAM_SVC", 0.5)).unwrap_err();
        assert!(matches!(err, LexiglotError::Io(_)));
        assert!(!dir.exists());
    }

    #[test]
    fn test_prepare_does_not_touch_report_until_commit() {
        let path = std::env::temp_dir().join("lexiglot_report_staged.md");
        std::fs::write(&path, DOC).unwrap();
        let report = PerformanceReport::new(&path);

        let staged = report.prepare(&metrics("NGRAM_KNN", 0.3)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DOC);
        staged.commit().unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("|NGRAM_KNN|"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_roundtrip_from_template() {
        let path = std::env::temp_dir().join("lexiglot_report_roundtrip.md");
        std::fs::remove_file(&path).ok();
        let report = PerformanceReport::new(&path);
        report.update(&metrics("NGRAM_SVC", 0.5)).unwrap();
        report.update(&metrics("NGRAM_KNN", 0.6)).unwrap();
        report.update(&metrics("NGRAM_SVC", 0.9)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(REPORT_TEMPLATE));
        assert!(text.contains(&metrics("NGRAM_SVC", 0.9).row()));
        assert_eq!(text.matches("|NGRAM_SVC|").count(), 1);
        assert_eq!(text.lines().count(), 6);
        std::fs::remove_file(&path).ok();
    }
}
