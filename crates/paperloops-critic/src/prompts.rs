use crate::{CriticEvaluationInput, EvaluationMode};

/// Prompt templates for the critic
pub struct CriticPrompts;

impl CriticPrompts {
    pub const SYSTEM_INSTRUCTION: &'static str = "You are an expert evaluator tasked with critically assessing academic outlines and papers. Your feedback should be comprehensive, specific, and actionable, aimed at ensuring high academic standards and complete coverage of the original prompt.";

    const OUTLINE_INSTRUCTION: &'static str = "Evaluate this outline. Provide detailed feedback on its structure, completeness, and coherence. Ensure all aspects of the original prompt are addressed. Suggest improvements or additions where necessary:";

    const PAPER_INSTRUCTION: &'static str = "Evaluate this academic paper. Provide detailed feedback on the completeness and depth of each section. Ensure all parts of the paper are fully developed, coherent, and address all aspects of the original prompt. The paper should be approximately 6000 words long with a balanced distribution across sections, and more detailed methodology and experimental sections. Highlight any areas that need expansion or clarification, and note any important topics that may have been omitted due to token limitations:";

    /// Build the critic evaluation prompt
    pub fn build_evaluation_prompt(input: &CriticEvaluationInput<'_>) -> String {
        let mut prompt = format!(
            "Original question: {}\nResponse to evaluate: {}\nIteration: {}\n",
            input.original_prompt, input.response, input.iteration
        );

        if let Some(feedback) = input.previous_feedback.filter(|f| !f.is_empty()) {
            prompt.push_str(&format!("Previous feedback: {}\n", feedback));
        }

        prompt.push_str(match input.mode {
            EvaluationMode::Outline => Self::OUTLINE_INSTRUCTION,
            EvaluationMode::FullPaper => Self::PAPER_INSTRUCTION,
        });
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(mode: EvaluationMode, previous_feedback: Option<&'static str>) -> CriticEvaluationInput<'static> {
        CriticEvaluationInput {
            original_prompt: "Study X",
            response: "# Abstract",
            iteration: 2,
            previous_feedback,
            mode,
        }
    }

    #[test]
    fn test_outline_prompt_layout() {
        let prompt = CriticPrompts::build_evaluation_prompt(&input(EvaluationMode::Outline, None));
        assert!(prompt.starts_with(
            "Original question: Study X\nResponse to evaluate: # Abstract\nIteration: 2\n"
        ));
        assert!(!prompt.contains("Previous feedback:"));
        assert!(prompt.contains("Evaluate this outline."));
    }

    #[test]
    fn test_previous_feedback_included() {
        let prompt = CriticPrompts::build_evaluation_prompt(&input(
            EvaluationMode::Outline,
            Some("missing related work"),
        ));
        assert!(prompt.contains("Iteration: 2\nPrevious feedback: missing related work\n"));
    }

    #[test]
    fn test_paper_prompt_targets_length() {
        let prompt = CriticPrompts::build_evaluation_prompt(&input(EvaluationMode::FullPaper, None));
        assert!(prompt.contains("Evaluate this academic paper."));
        assert!(prompt.contains("approximately 6000 words"));
        assert!(prompt.contains("token limitations"));
    }
}
