pub mod evaluator;
mod prompts;

pub use evaluator::{CriticEvaluationInput, CriticEvaluator, EvaluationMode};
pub use prompts::CriticPrompts;
