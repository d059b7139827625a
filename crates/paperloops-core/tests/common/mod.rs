#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;

use paperloops_agent::{GenerationError, TextGenerator};
use paperloops_critic::CriticPrompts;

/// One call as seen by the generator
#[derive(Debug, Clone)]
pub struct Call {
    pub system: String,
    pub user: String,
    pub max_output_tokens: Option<u32>,
}

impl Call {
    pub fn is_critic(&self) -> bool {
        self.system == CriticPrompts::SYSTEM_INSTRUCTION
    }

    pub fn is_section(&self) -> bool {
        !self.is_critic() && self.user.starts_with("Original question: Generate the ")
    }

    pub fn is_outline(&self) -> bool {
        !self.is_critic() && !self.is_section()
    }

    pub fn is_paper_evaluation(&self) -> bool {
        self.is_critic() && self.user.contains("Evaluate this academic paper.")
    }
}

type Handler = dyn Fn(&Call, usize) -> Result<String, GenerationError> + Send + Sync;

/// Generator answering from a closure; the closure also sees the 0-based call index
pub struct ScriptedGenerator {
    handler: Box<Handler>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGenerator {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Call, usize) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
        max_output_tokens: Option<u32>,
    ) -> Result<String, GenerationError> {
        let call = Call {
            system: system_instruction.to_string(),
            user: user_message.to_string(),
            max_output_tokens,
        };
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call.clone());
            calls.len() - 1
        };
        (self.handler)(&call, index)
    }
}

pub const COMPLETE_OUTLINE: &str = "# Abstract
## Summary
Genetic Algorithms evolve Behavior Trees written by Large Language Models
# Introduction
## Motivation
why evolve agents
# Related Work
## Prior art
surveys
# Methodology
## Pipeline
LLM seeds, GA refines
# Experimental Setup
## Benchmarks
grid worlds
# Results
## Findings
faster convergence
# Discussion
## Limits
cost
# Conclusion
## Summary
future work";

pub const INCOMPLETE_OUTLINE: &str = "# Introduction
## Motivation
why evolve agents
# Methodology
## Pipeline
LLM seeds, GA refines";

pub fn fatal_error() -> GenerationError {
    GenerationError::Api {
        status: 400,
        message: "bad request".to_string(),
    }
}

/// Section prose that echoes the heading it was asked for
pub fn section_body(call: &Call) -> String {
    let heading = call
        .user
        .trim_start_matches("Original question: Generate the ")
        .split(" section of the paper")
        .next()
        .unwrap_or_default()
        .to_string();
    format!("Prose for {}", heading.trim_start_matches("# "))
}
