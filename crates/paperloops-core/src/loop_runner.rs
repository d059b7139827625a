use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use paperloops_agent::{Actor, GenerationRequest};
use paperloops_critic::{CriticEvaluationInput, CriticEvaluator, EvaluationMode};
use paperloops_logging::{LogEvent, Logger, Phase};

use crate::error::LoopError;
use crate::outcome::{PaperOutcome, RefinementOutcome, RunOutcome};
use crate::{CompletionPolicy, PaperAssembler, RecordKind, RunContext};

/// Orchestrates outline refinement followed by paper generation
pub struct LoopRunner<'a> {
    actor: Actor<'a>,
    critic: CriticEvaluator<'a>,
    policy: &'a dyn CompletionPolicy,
    logger: Arc<Logger>,
}

impl<'a> LoopRunner<'a> {
    pub fn new(
        actor: Actor<'a>,
        critic: CriticEvaluator<'a>,
        policy: &'a dyn CompletionPolicy,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            actor,
            critic,
            policy,
            logger,
        }
    }

    /// Run both phases. Failures end the phase they occur in and are
    /// reported through the outcome, never as an error.
    pub async fn run(&self, mut context: RunContext) -> RunOutcome {
        let refinement = self.refine(&mut context).await;
        let paper = self.generate_paper(&mut context).await;

        let duration = context.total_duration();
        let records = context.into_history();
        self.logger.log(&LogEvent::RunCompleted {
            records: records.len(),
            duration_secs: duration.as_secs_f64(),
        });

        RunOutcome::new(refinement, paper, records, duration)
    }

    /// Refine the outline until the policy accepts it, the cap is reached, or a call fails
    pub async fn refine(&self, context: &mut RunContext) -> RefinementOutcome {
        while context.should_continue() {
            let iteration = context.iteration + 1;

            match self.run_iteration(context, iteration).await {
                Ok(true) => {
                    self.logger.log(&LogEvent::OutlineAccepted { iteration });
                    return RefinementOutcome::Accepted {
                        iterations: iteration,
                    };
                }
                Ok(false) => {
                    debug!(iteration, "Outline not yet complete");
                    context.increment_iteration();
                }
                Err(e) => {
                    warn!(error = %e, iteration, "Outline iteration failed");
                    self.logger.log(&LogEvent::ErrorEncountered {
                        phase: Phase::Refinement,
                        iteration: Some(iteration),
                        error: e.to_string(),
                    });
                    return RefinementOutcome::Aborted {
                        iteration,
                        error: e.to_string(),
                    };
                }
            }
        }

        self.logger.log(&LogEvent::MaxIterationsReached {
            iterations: context.iteration,
        });
        RefinementOutcome::Exhausted {
            iterations: context.iteration,
        }
    }

    /// One actor draft and critique. Returns whether the outline is accepted.
    async fn run_iteration(
        &self,
        context: &mut RunContext,
        iteration: usize,
    ) -> Result<bool, LoopError> {
        self.logger.log(&LogEvent::ActorStarted {
            iteration,
            prompt_preview: context.prompt.chars().take(100).collect(),
        });

        let actor_start = Instant::now();
        let request = GenerationRequest::outline(&context.prompt).with_history(
            context.last_response.as_deref(),
            context.last_feedback.as_deref(),
        );
        let response = self.actor.generate(request).await?;

        self.logger.log(&LogEvent::ActorCompleted {
            iteration,
            response_chars: response.chars().count(),
            duration_secs: actor_start.elapsed().as_secs_f64(),
        });

        self.logger.log(&LogEvent::CriticStarted { iteration });
        let critic_start = Instant::now();
        let evaluation = self
            .critic
            .evaluate(CriticEvaluationInput {
                original_prompt: &context.prompt,
                response: &response,
                iteration,
                previous_feedback: context.last_feedback.as_deref(),
                mode: EvaluationMode::Outline,
            })
            .await?;

        self.logger.log(&LogEvent::CriticCompleted {
            iteration,
            evaluation_chars: evaluation.chars().count(),
            duration_secs: critic_start.elapsed().as_secs_f64(),
        });

        let accepted = self.policy.accepts(&response, &context.prompt);
        context.push_record(RecordKind::Outline, response.clone(), evaluation.clone());
        context.set_feedback(response, evaluation);

        Ok(accepted)
    }

    /// Expand the latest outline into a paper and evaluate it
    pub async fn generate_paper(&self, context: &mut RunContext) -> PaperOutcome {
        let Some(outline) = context.last_outline().map(str::to_owned) else {
            info!("No outline produced, skipping paper generation");
            return PaperOutcome::Skipped;
        };

        match self.assemble_and_evaluate(context, &outline).await {
            Ok((iteration, paper_chars)) => PaperOutcome::Completed {
                iteration,
                paper_chars,
            },
            Err(e) => {
                warn!(error = %e, "Paper generation failed");
                self.logger.log(&LogEvent::ErrorEncountered {
                    phase: Phase::Paper,
                    iteration: None,
                    error: e.to_string(),
                });
                PaperOutcome::Aborted {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn assemble_and_evaluate(
        &self,
        context: &mut RunContext,
        outline: &str,
    ) -> Result<(usize, usize), LoopError> {
        let assembler = PaperAssembler::new(&self.actor, self.logger.clone());
        let paper = assembler.assemble(outline, &context.prompt).await?;

        let iteration = context.next_iteration();
        self.logger.log(&LogEvent::CriticStarted { iteration });
        let critic_start = Instant::now();
        let evaluation = self
            .critic
            .evaluate(CriticEvaluationInput {
                original_prompt: &context.prompt,
                response: &paper,
                iteration,
                previous_feedback: None,
                mode: EvaluationMode::FullPaper,
            })
            .await?;

        self.logger.log(&LogEvent::CriticCompleted {
            iteration,
            evaluation_chars: evaluation.chars().count(),
            duration_secs: critic_start.elapsed().as_secs_f64(),
        });

        let paper_chars = paper.chars().count();
        let iteration = context.push_record(RecordKind::FullPaper, paper, evaluation);
        Ok((iteration, paper_chars))
    }
}
