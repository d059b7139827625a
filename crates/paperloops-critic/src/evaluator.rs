use paperloops_agent::{GenerationError, TextGenerator};
use std::time::Instant;
use tracing::info;

use crate::CriticPrompts;

/// What kind of artifact the critic is judging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    Outline,
    FullPaper,
}

/// Inputs required to evaluate one actor response.
#[derive(Debug, Clone, Copy)]
pub struct CriticEvaluationInput<'a> {
    pub original_prompt: &'a str,
    pub response: &'a str,
    /// 1-based iteration the response belongs to
    pub iteration: usize,
    pub previous_feedback: Option<&'a str>,
    pub mode: EvaluationMode,
}

/// Evaluator that asks the text generator for a critique
pub struct CriticEvaluator<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> CriticEvaluator<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Evaluate a response and return the raw critique text.
    ///
    /// No output-token ceiling is sent; the endpoint default applies.
    pub async fn evaluate(
        &self,
        input: CriticEvaluationInput<'_>,
    ) -> Result<String, GenerationError> {
        let prompt = CriticPrompts::build_evaluation_prompt(&input);

        info!(
            stage = "critic_input",
            iteration = input.iteration,
            mode = ?input.mode,
            "{}",
            prompt
        );
        let start = Instant::now();

        let critique = self
            .generator
            .complete(CriticPrompts::SYSTEM_INSTRUCTION, &prompt, None)
            .await?;

        info!(
            iteration = input.iteration,
            mode = ?input.mode,
            critique_len = critique.len(),
            duration_secs = start.elapsed().as_secs_f64(),
            "Critic completed"
        );
        info!(stage = "critic_output", "{}", critique);

        Ok(critique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoGenerator {
        ceilings: Mutex<Vec<Option<u32>>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            system_instruction: &str,
            _user_message: &str,
            max_output_tokens: Option<u32>,
        ) -> Result<String, GenerationError> {
            self.ceilings.lock().unwrap().push(max_output_tokens);
            if self.fail {
                return Err(GenerationError::Api {
                    status: 400,
                    message: "bad request".into(),
                });
            }
            Ok(format!("critique under: {}", system_instruction))
        }
    }

    fn input() -> CriticEvaluationInput<'static> {
        CriticEvaluationInput {
            original_prompt: "Study X",
            response: "# Abstract",
            iteration: 1,
            previous_feedback: None,
            mode: EvaluationMode::Outline,
        }
    }

    #[tokio::test]
    async fn test_evaluate_returns_raw_critique_without_ceiling() {
        let generator = EchoGenerator {
            ceilings: Mutex::new(Vec::new()),
            fail: false,
        };
        let critique = CriticEvaluator::new(&generator)
            .evaluate(input())
            .await
            .unwrap();

        assert!(critique.starts_with("critique under: You are an expert evaluator"));
        assert_eq!(*generator.ceilings.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn test_evaluate_propagates_generation_error() {
        let generator = EchoGenerator {
            ceilings: Mutex::new(Vec::new()),
            fail: true,
        };
        let result = CriticEvaluator::new(&generator).evaluate(input()).await;
        assert!(matches!(result, Err(GenerationError::Api { status: 400, .. })));
    }
}
