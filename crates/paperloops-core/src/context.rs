use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Outline iterations attempted before moving on to the paper
pub const DEFAULT_MAX_ITERATIONS: usize = 2;

/// What a record holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Outline,
    FullPaper,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Outline => write!(f, "outline"),
            RecordKind::FullPaper => write!(f, "full_paper"),
        }
    }
}

/// One actor response together with the critic's evaluation of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub response: String,
    pub evaluation: String,
    pub kind: RecordKind,
}

/// Mutable state of a single run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Original research prompt
    pub prompt: String,
    /// Completed outline iterations
    pub iteration: usize,
    /// Upper bound on outline iterations (at least 1)
    pub max_iterations: usize,
    /// Latest outline, fed back to the actor
    pub last_response: Option<String>,
    /// Latest critique, fed back to actor and critic
    pub last_feedback: Option<String>,
    history: Vec<IterationRecord>,
    started_at: Instant,
}

impl RunContext {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            iteration: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            last_response: None,
            last_feedback: None,
            history: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn increment_iteration(&mut self) {
        self.iteration += 1;
    }

    pub fn should_continue(&self) -> bool {
        self.iteration < self.max_iterations
    }

    /// Iteration number the next appended record will carry
    pub fn next_iteration(&self) -> usize {
        self.history.len() + 1
    }

    /// Append a record, numbering it after the existing ones.
    ///
    /// Returns the assigned iteration number.
    pub fn push_record(&mut self, kind: RecordKind, response: String, evaluation: String) -> usize {
        debug_assert!(
            !self.history.iter().any(|r| r.kind == RecordKind::FullPaper),
            "no record may follow the full paper"
        );
        let iteration = self.next_iteration();
        self.history.push(IterationRecord {
            iteration,
            response,
            evaluation,
            kind,
        });
        iteration
    }

    /// Remember the latest outline and critique for the next actor turn
    pub fn set_feedback(&mut self, response: String, feedback: String) {
        self.last_response = Some(response);
        self.last_feedback = Some(feedback);
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    pub fn into_history(self) -> Vec<IterationRecord> {
        self.history
    }

    /// Response of the most recent outline record
    pub fn last_outline(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|r| r.kind == RecordKind::Outline)
            .map(|r| r.response.as_str())
    }

    pub fn total_duration(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_numbered_from_one() {
        let mut context = RunContext::new("prompt");
        assert_eq!(context.push_record(RecordKind::Outline, "a".into(), "x".into()), 1);
        assert_eq!(context.push_record(RecordKind::Outline, "b".into(), "y".into()), 2);
        assert_eq!(context.push_record(RecordKind::FullPaper, "p".into(), "z".into()), 3);

        let numbers: Vec<usize> = context.history().iter().map(|r| r.iteration).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(context.last_outline(), Some("b"));
    }

    #[test]
    fn test_max_iterations_floor() {
        let context = RunContext::new("prompt").with_max_iterations(0);
        assert_eq!(context.max_iterations, 1);
        assert!(context.should_continue());
    }

    #[test]
    fn test_record_kind_serializes_snake_case() {
        let record = IterationRecord {
            iteration: 3,
            response: "paper".into(),
            evaluation: "good".into(),
            kind: RecordKind::FullPaper,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "full_paper");
        assert_eq!(json["iteration"], 3);
    }
}
