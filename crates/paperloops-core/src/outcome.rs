use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{IterationRecord, RecordKind};

/// How the outline refinement phase ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefinementOutcome {
    /// The completion policy accepted the outline
    Accepted { iterations: usize },
    /// Iteration cap reached; the latest outline is used regardless
    Exhausted { iterations: usize },
    /// An iteration failed; earlier records are kept
    Aborted { iteration: usize, error: String },
}

/// How the full-paper phase ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaperOutcome {
    Completed { iteration: usize, paper_chars: usize },
    Aborted { error: String },
    /// No outline was produced, so nothing to expand
    Skipped,
}

/// The final outcome of a run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunOutcome {
    pub refinement: RefinementOutcome,
    pub paper: PaperOutcome,
    pub records: Vec<IterationRecord>,
    pub total_duration_secs: f64,
}

impl RunOutcome {
    pub fn new(
        refinement: RefinementOutcome,
        paper: PaperOutcome,
        records: Vec<IterationRecord>,
        duration: Duration,
    ) -> Self {
        Self {
            refinement,
            paper,
            records,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn outline_iterations(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.kind == RecordKind::Outline)
            .count()
    }

    pub fn full_paper(&self) -> Option<&IterationRecord> {
        self.records.iter().find(|r| r.kind == RecordKind::FullPaper)
    }

    /// Response of the last record, whatever its kind
    pub fn final_response(&self) -> Option<&str> {
        self.records.last().map(|r| r.response.as_str())
    }

    pub fn is_success(&self) -> bool {
        matches!(self.paper, PaperOutcome::Completed { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self.paper {
            PaperOutcome::Completed { .. } => 0,
            PaperOutcome::Aborted { .. } => 1,
            PaperOutcome::Skipped => 2,
        }
    }
}
