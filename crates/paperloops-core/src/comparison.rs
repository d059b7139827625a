//! Single-actor baseline versus the actor-critic loop.

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use paperloops_agent::{Actor, GenerationRequest, TextGenerator, DEFAULT_MAX_OUTPUT_TOKENS};
use paperloops_critic::CriticEvaluator;
use paperloops_logging::{LogEvent, Logger, Phase};

use crate::error::LoopError;
use crate::{
    CompletionPolicy, LoopRunner, PaperAssembler, PersistReport, ResultWriter, RunContext,
    RunOutcome,
};

/// Outline and paper produced by the actor alone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineResult {
    pub outline: String,
    pub paper: String,
}

/// Lengths are counted in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonStats {
    pub single_outline_chars: usize,
    pub single_paper_chars: usize,
    pub final_response_chars: usize,
    pub iterations: usize,
}

impl ComparisonStats {
    pub fn compute(baseline: Option<&BaselineResult>, outcome: &RunOutcome) -> Self {
        Self {
            single_outline_chars: baseline.map_or(0, |b| b.outline.chars().count()),
            single_paper_chars: baseline.map_or(0, |b| b.paper.chars().count()),
            final_response_chars: outcome.final_response().map_or(0, |r| r.chars().count()),
            iterations: outcome.records.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub baseline: Option<BaselineResult>,
    pub outcome: RunOutcome,
    pub stats: ComparisonStats,
    pub persisted: Option<PersistReport>,
}

/// Entry behaviour of a run: baseline, loop, report, persist
pub struct ComparisonDriver<'a> {
    generator: &'a dyn TextGenerator,
    policy: &'a dyn CompletionPolicy,
    logger: Arc<Logger>,
    max_output_tokens: Option<u32>,
    baseline_enabled: bool,
    writer: Option<ResultWriter>,
}

impl<'a> ComparisonDriver<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        policy: &'a dyn CompletionPolicy,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            generator,
            policy,
            logger,
            max_output_tokens: Some(DEFAULT_MAX_OUTPUT_TOKENS),
            baseline_enabled: true,
            writer: None,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_baseline(mut self, enabled: bool) -> Self {
        self.baseline_enabled = enabled;
        self
    }

    pub fn with_writer(mut self, writer: ResultWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    fn actor(&self) -> Actor<'a> {
        Actor::new(self.generator).with_max_output_tokens(self.max_output_tokens)
    }

    pub async fn run(&self, context: RunContext) -> ComparisonReport {
        self.logger.log(&LogEvent::RunStarted {
            prompt: context.prompt.clone(),
            model: self.generator.name().to_string(),
            max_iterations: context.max_iterations,
        });

        let baseline = if self.baseline_enabled {
            self.run_baseline(&context.prompt).await
        } else {
            None
        };

        let runner = LoopRunner::new(
            self.actor(),
            CriticEvaluator::new(self.generator),
            self.policy,
            self.logger.clone(),
        );
        let outcome = runner.run(context).await;

        for record in &outcome.records {
            self.logger.log(&LogEvent::RecordReported {
                iteration: record.iteration,
                kind: record.kind.to_string(),
                response: record.response.clone(),
                evaluation: record.evaluation.clone(),
            });
        }

        let stats = ComparisonStats::compute(baseline.as_ref(), &outcome);
        self.logger.log(&LogEvent::ComparisonSummary {
            single_outline_chars: stats.single_outline_chars,
            single_paper_chars: stats.single_paper_chars,
            final_response_chars: stats.final_response_chars,
            iterations: stats.iterations,
        });

        let persisted = self
            .writer
            .as_ref()
            .map(|writer| self.persist(writer, baseline.as_ref(), &outcome));

        ComparisonReport {
            baseline,
            outcome,
            stats,
            persisted,
        }
    }

    /// Outline then paper from the actor alone; any failure drops the baseline
    pub async fn run_baseline(&self, prompt: &str) -> Option<BaselineResult> {
        self.logger.log(&LogEvent::BaselineStarted);

        match self.generate_baseline(prompt).await {
            Ok(baseline) => {
                self.logger.log(&LogEvent::BaselineCompleted {
                    outline_chars: baseline.outline.chars().count(),
                    paper_chars: baseline.paper.chars().count(),
                });
                self.logger.log(&LogEvent::BaselineReported {
                    outline: baseline.outline.clone(),
                    paper: baseline.paper.clone(),
                });
                Some(baseline)
            }
            Err(e) => {
                warn!(error = %e, "Single actor baseline failed");
                self.logger.log(&LogEvent::ErrorEncountered {
                    phase: Phase::Baseline,
                    iteration: None,
                    error: e.to_string(),
                });
                None
            }
        }
    }

    async fn generate_baseline(&self, prompt: &str) -> Result<BaselineResult, LoopError> {
        let actor = self.actor();
        let outline = actor.generate(GenerationRequest::outline(prompt)).await?;
        let paper = PaperAssembler::new(&actor, self.logger.clone())
            .assemble(&outline, prompt)
            .await?;
        Ok(BaselineResult { outline, paper })
    }

    fn persist(
        &self,
        writer: &ResultWriter,
        baseline: Option<&BaselineResult>,
        outcome: &RunOutcome,
    ) -> PersistReport {
        let report = writer.save(baseline, &outcome.records);

        for path in &report.written {
            self.logger.log(&LogEvent::FileWritten { path: path.clone() });
        }
        for failure in &report.failures {
            warn!(
                path = %failure.path.display(),
                error = %failure.error,
                "Failed to write result file"
            );
            self.logger.log(&LogEvent::PersistenceWarning {
                path: failure.path.clone(),
                error: failure.error.clone(),
            });
        }

        report
    }
}
