use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use paperloops_agent::{Actor, ActorPrompts, GenerationError, GenerationRequest};
use paperloops_logging::{LogEvent, Logger};

use crate::{OutlineError, OutlineTree};

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Malformed outline: {0}")]
    Outline(#[from] OutlineError),

    #[error("Failed to generate section '{heading}': {source}")]
    Section {
        heading: String,
        #[source]
        source: GenerationError,
    },
}

/// Expands an outline into a full paper, one actor call per section
pub struct PaperAssembler<'a> {
    actor: &'a Actor<'a>,
    logger: Arc<Logger>,
}

impl<'a> PaperAssembler<'a> {
    pub fn new(actor: &'a Actor<'a>, logger: Arc<Logger>) -> Self {
        Self { actor, logger }
    }

    /// Parse `outline` and generate every section in order.
    ///
    /// The first failing section aborts the whole assembly.
    pub async fn assemble(
        &self,
        outline: &str,
        original_prompt: &str,
    ) -> Result<String, AssemblyError> {
        let tree = OutlineTree::parse(outline)?;
        self.assemble_tree(&tree, original_prompt).await
    }

    pub async fn assemble_tree(
        &self,
        tree: &OutlineTree,
        original_prompt: &str,
    ) -> Result<String, AssemblyError> {
        let total = tree.len();
        let start = Instant::now();
        self.logger.log(&LogEvent::PaperStarted { sections: total });

        let mut paper = String::new();
        for (index, section) in tree.sections().iter().enumerate() {
            self.logger.log(&LogEvent::SectionStarted {
                index: index + 1,
                total,
                heading: section.heading.clone(),
            });
            let section_start = Instant::now();

            let section_prompt = ActorPrompts::build_section_prompt(
                &section.heading,
                &section.render_subsections(),
                original_prompt,
            );
            let content = self
                .actor
                .generate(GenerationRequest::full_section(&section_prompt))
                .await
                .map_err(|source| AssemblyError::Section {
                    heading: section.heading.clone(),
                    source,
                })?;

            self.logger.log(&LogEvent::SectionCompleted {
                index: index + 1,
                total,
                content_chars: content.chars().count(),
                duration_secs: section_start.elapsed().as_secs_f64(),
            });

            paper.push_str("\n\n");
            paper.push_str(&section.heading);
            paper.push('\n');
            paper.push_str(&content);
        }

        debug!(sections = total, paper_len = paper.len(), "Paper assembled");
        self.logger.log(&LogEvent::PaperCompleted {
            paper_chars: paper.chars().count(),
            duration_secs: start.elapsed().as_secs_f64(),
        });

        Ok(paper)
    }
}
