use crate::GenerationMode;

/// Prompt templates for the actor
pub struct ActorPrompts;

impl ActorPrompts {
    /// System instruction shared by outline and paper generation
    pub const SYSTEM_INSTRUCTION: &'static str = "You are a sophisticated language model tasked with generating high-quality, academically rigorous responses. Your output should be either a detailed outline or a complete academic paper, depending on the request. Ensure academic rigor, coherence, and comprehensive coverage of all provided information throughout.";

    const OUTLINE_INSTRUCTION: &'static str = "Please provide a detailed academic paper outline based on the above information. Ensure your outline includes all necessary sections and subsections, and fully utilizes all aspects of the original prompt:";

    const PAPER_INSTRUCTION: &'static str = "Based on the provided outline, please generate a complete and detailed academic paper. Ensure each section is fully developed, addresses all points in the outline, and incorporates all aspects of the original prompt. The total word count should be approximately 6000 words, with a balanced distribution across sections. The methodology and experimental sections should be more detailed. If you reach the token limit, please indicate where you had to stop and what topics still need to be covered:";

    /// Build the actor's user message
    pub fn build_generation_prompt(
        prompt: &str,
        previous_response: Option<&str>,
        critic_feedback: Option<&str>,
        mode: GenerationMode,
    ) -> String {
        let mut full_prompt = format!("Original question: {}\n", prompt);

        if let Some(previous) = previous_response.filter(|p| !p.is_empty()) {
            full_prompt.push_str(&format!("Previous response: {}\n", previous));
        }
        if let Some(feedback) = critic_feedback.filter(|f| !f.is_empty()) {
            full_prompt.push_str(&format!("Critic's feedback: {}\n", feedback));
        }

        full_prompt.push_str(match mode {
            GenerationMode::Outline => Self::OUTLINE_INSTRUCTION,
            GenerationMode::FullSection => Self::PAPER_INSTRUCTION,
        });
        full_prompt
    }

    /// Build the request used to expand one outline section into prose
    pub fn build_section_prompt(heading: &str, subsections: &str, original_prompt: &str) -> String {
        format!(
            "Generate the {heading} section of the paper based on this outline: {subsections}\nEnsure it addresses all aspects of the original prompt: {original_prompt}"
        )
    }
}
