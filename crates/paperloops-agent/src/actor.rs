use std::time::Instant;
use tracing::info;

use crate::{ActorPrompts, GenerationError, TextGenerator};

/// Output-token ceiling applied to actor calls unless overridden
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;

/// What the actor is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Outline,
    FullSection,
}

/// Inputs for one actor call
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub original_prompt: &'a str,
    pub previous_response: Option<&'a str>,
    pub critic_feedback: Option<&'a str>,
    pub mode: GenerationMode,
}

impl<'a> GenerationRequest<'a> {
    pub fn outline(original_prompt: &'a str) -> Self {
        Self {
            original_prompt,
            previous_response: None,
            critic_feedback: None,
            mode: GenerationMode::Outline,
        }
    }

    pub fn full_section(original_prompt: &'a str) -> Self {
        Self {
            mode: GenerationMode::FullSection,
            ..Self::outline(original_prompt)
        }
    }

    pub fn with_history(
        mut self,
        previous_response: Option<&'a str>,
        critic_feedback: Option<&'a str>,
    ) -> Self {
        self.previous_response = previous_response;
        self.critic_feedback = critic_feedback;
        self
    }
}

/// Drafts outlines and paper sections
pub struct Actor<'a> {
    generator: &'a dyn TextGenerator,
    max_output_tokens: Option<u32>,
}

impl<'a> Actor<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self {
            generator,
            max_output_tokens: Some(DEFAULT_MAX_OUTPUT_TOKENS),
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Generate a response; the text is returned verbatim
    pub async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, GenerationError> {
        let prompt = ActorPrompts::build_generation_prompt(
            request.original_prompt,
            request.previous_response,
            request.critic_feedback,
            request.mode,
        );

        info!(stage = "actor_input", mode = ?request.mode, "{}", prompt);
        let start = Instant::now();

        let response = self
            .generator
            .complete(
                ActorPrompts::SYSTEM_INSTRUCTION,
                &prompt,
                self.max_output_tokens,
            )
            .await?;

        info!(
            generator = self.generator.name(),
            mode = ?request.mode,
            response_len = response.len(),
            duration_secs = start.elapsed().as_secs_f64(),
            "Actor completed"
        );
        info!(stage = "actor_output", "{}", response);

        Ok(response)
    }
}
