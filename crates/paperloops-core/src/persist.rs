use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::{BaselineResult, IterationRecord, RecordKind};

pub const SINGLE_ACTOR_OUTLINE_FILE: &str = "single_actor_outline.txt";
pub const SINGLE_ACTOR_PAPER_FILE: &str = "single_actor_full_paper.txt";
pub const AC_OUTLINE_FILE: &str = "ac_outline.txt";
pub const AC_PAPER_FILE: &str = "ac_full_paper.txt";
pub const CRITIC_PROCESS_FILE: &str = "critic_process.json";

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A file that could not be written
#[derive(Debug, Clone, Serialize)]
pub struct PersistFailure {
    pub path: PathBuf,
    pub error: String,
}

/// What [`ResultWriter::save`] managed to write
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<PersistFailure>,
}

/// Writes run results as flat files into one directory.
///
/// Every file is attempted independently; missing inputs skip their file.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn save(
        &self,
        baseline: Option<&BaselineResult>,
        records: &[IterationRecord],
    ) -> PersistReport {
        let mut report = PersistReport::default();

        if let Err(source) = std::fs::create_dir_all(&self.output_dir) {
            report.failures.push(PersistFailure {
                path: self.output_dir.clone(),
                error: source.to_string(),
            });
            return report;
        }

        if let Some(baseline) = baseline {
            if !baseline.outline.is_empty() {
                self.record(
                    &mut report,
                    SINGLE_ACTOR_OUTLINE_FILE,
                    self.write_text(SINGLE_ACTOR_OUTLINE_FILE, &baseline.outline),
                );
            }
            if !baseline.paper.is_empty() {
                self.record(
                    &mut report,
                    SINGLE_ACTOR_PAPER_FILE,
                    self.write_text(SINGLE_ACTOR_PAPER_FILE, &baseline.paper),
                );
            }
        }

        if let Some(outline) = records.iter().find(|r| r.kind == RecordKind::Outline) {
            self.record(
                &mut report,
                AC_OUTLINE_FILE,
                self.write_text(AC_OUTLINE_FILE, &outline.response),
            );
        }

        if let Some(paper) = records.iter().find(|r| r.kind == RecordKind::FullPaper) {
            self.record(
                &mut report,
                AC_PAPER_FILE,
                self.write_text(AC_PAPER_FILE, &paper.response),
            );
        }

        if !records.is_empty() {
            let result = serde_json::to_string_pretty(records)
                .map_err(PersistError::from)
                .and_then(|json| self.write_text(CRITIC_PROCESS_FILE, &json));
            self.record(&mut report, CRITIC_PROCESS_FILE, result);
        }

        report
    }

    fn write_text(&self, file_name: &str, content: &str) -> Result<PathBuf, PersistError> {
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, content).map_err(|source| PersistError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Wrote result file");
        Ok(path)
    }

    fn record(
        &self,
        report: &mut PersistReport,
        file_name: &str,
        result: Result<PathBuf, PersistError>,
    ) {
        match result {
            Ok(path) => report.written.push(path),
            Err(e) => report.failures.push(PersistFailure {
                path: self.output_dir.join(file_name),
                error: e.to_string(),
            }),
        }
    }
}
