mod common;

use std::sync::Arc;

use paperloops_agent::{Actor, DEFAULT_MAX_OUTPUT_TOKENS};
use paperloops_core::{AssemblyError, OutlineTree, PaperAssembler};
use paperloops_logging::Logger;

use common::{fatal_error, section_body, ScriptedGenerator, COMPLETE_OUTLINE};

const PROMPT: &str = "Evolving behavior trees";

#[tokio::test]
async fn test_paper_contains_each_heading_once_in_order() {
    let generator = ScriptedGenerator::new(|call, _| Ok(section_body(call)));
    let actor = Actor::new(&generator);
    let assembler = PaperAssembler::new(&actor, Arc::new(Logger::quiet()));

    let paper = assembler.assemble(COMPLETE_OUTLINE, PROMPT).await.unwrap();

    let tree = OutlineTree::parse(COMPLETE_OUTLINE).unwrap();
    let mut last_position = 0;
    for section in tree.sections() {
        let marker = format!("\n\n{}\n", section.heading);
        assert_eq!(paper.matches(&marker).count(), 1, "{} once", section.heading);
        let position = paper.find(&marker).unwrap();
        assert!(position >= last_position, "{} out of order", section.heading);
        last_position = position;
    }
    assert!(paper.starts_with("\n\n# Abstract\nProse for Abstract"));
}

#[tokio::test]
async fn test_section_prompt_embeds_subsections_and_prompt() {
    let generator = ScriptedGenerator::new(|_, _| Ok("body".to_string()));
    let actor = Actor::new(&generator);
    let assembler = PaperAssembler::new(&actor, Arc::new(Logger::quiet()));

    let paper = assembler
        .assemble("# Methodology\n## Pipeline\nLLM seeds, GA refines", PROMPT)
        .await
        .unwrap();
    assert_eq!(paper, "\n\n# Methodology\nbody");

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    let user = &calls[0].user;
    assert!(user.starts_with("Original question: Generate the # Methodology section"));
    assert!(user.contains("## Pipeline\nLLM seeds, GA refines"));
    assert!(user.contains(&format!("original prompt: {}", PROMPT)));
    assert!(user.contains("approximately 6000 words"));
    assert!(!user.contains("Previous response:"));
    assert_eq!(calls[0].max_output_tokens, Some(DEFAULT_MAX_OUTPUT_TOKENS));
}

#[tokio::test]
async fn test_empty_outline_makes_no_calls() {
    let generator = ScriptedGenerator::new(|_, _| Ok("unused".to_string()));
    let actor = Actor::new(&generator);
    let assembler = PaperAssembler::new(&actor, Arc::new(Logger::quiet()));

    let paper = assembler
        .assemble("just prose, no headings", PROMPT)
        .await
        .unwrap();
    assert!(paper.is_empty());
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_failing_section_stops_assembly() {
    let generator = ScriptedGenerator::new(|_, index| {
        if index == 1 {
            Err(fatal_error())
        } else {
            Ok("body".to_string())
        }
    });
    let actor = Actor::new(&generator);
    let assembler = PaperAssembler::new(&actor, Arc::new(Logger::quiet()));

    let err = assembler
        .assemble(COMPLETE_OUTLINE, PROMPT)
        .await
        .unwrap_err();
    match err {
        AssemblyError::Section { heading, .. } => assert_eq!(heading, "# Introduction"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(generator.calls().len(), 2);
}
