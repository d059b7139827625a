/// Section names a complete academic outline must mention
pub const DEFAULT_REQUIRED_SECTIONS: [&str; 8] = [
    "Abstract",
    "Introduction",
    "Related Work",
    "Methodology",
    "Experimental Setup",
    "Results",
    "Discussion",
    "Conclusion",
];

/// Decides whether an outline is good enough to stop refining early
pub trait CompletionPolicy: Send + Sync {
    /// Every required section is present
    fn structurally_complete(&self, outline: &str) -> bool;

    /// Every required aspect of the research prompt is covered
    fn aspects_covered(&self, outline: &str, original_prompt: &str) -> bool;

    fn accepts(&self, outline: &str, original_prompt: &str) -> bool {
        self.structurally_complete(outline) && self.aspects_covered(outline, original_prompt)
    }
}

/// Case-insensitive substring checks against fixed word lists.
///
/// Aspects are supplied by the caller; with none configured every outline
/// counts as covering the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringPolicy {
    required_sections: Vec<String>,
    required_aspects: Vec<String>,
}

impl Default for SubstringPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl SubstringPolicy {
    pub fn new() -> Self {
        Self {
            required_sections: DEFAULT_REQUIRED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            required_aspects: Vec::new(),
        }
    }

    pub fn with_required_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_sections = normalize(sections);
        self
    }

    pub fn with_required_aspects<I, S>(mut self, aspects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_aspects = normalize(aspects);
        self
    }

    pub fn required_sections(&self) -> &[String] {
        &self.required_sections
    }

    pub fn required_aspects(&self) -> &[String] {
        &self.required_aspects
    }
}

impl CompletionPolicy for SubstringPolicy {
    fn structurally_complete(&self, outline: &str) -> bool {
        contains_all(outline, &self.required_sections)
    }

    fn aspects_covered(&self, outline: &str, _original_prompt: &str) -> bool {
        contains_all(outline, &self.required_aspects)
    }
}

fn normalize<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items
        .into_iter()
        .map(Into::into)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn contains_all(text: &str, needles: &[String]) -> bool {
    let haystack = text.to_lowercase();
    needles
        .iter()
        .all(|needle| haystack.contains(&needle.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASPECTS: [&str; 3] = [
        "Genetic Algorithms",
        "Large Language Models",
        "Behavior Trees",
    ];

    fn full_outline() -> String {
        let mut text = String::from("Working title: evolving agents\n");
        for (i, section) in DEFAULT_REQUIRED_SECTIONS.iter().enumerate() {
            text.push_str(&format!("# {}. {}\n- point\n", i + 1, section.to_uppercase()));
        }
        text.push_str("We combine genetic algorithms, large language models and behavior trees.");
        text
    }

    #[test]
    fn test_complete_outline_accepted() {
        let policy = SubstringPolicy::new().with_required_aspects(ASPECTS);
        let outline = full_outline();
        assert!(policy.structurally_complete(&outline));
        assert!(policy.aspects_covered(&outline, "anything"));
        assert!(policy.accepts(&outline, "anything"));
    }

    #[test]
    fn test_removing_any_section_fails_structure() {
        let policy = SubstringPolicy::new();
        for missing in DEFAULT_REQUIRED_SECTIONS {
            let outline: String = DEFAULT_REQUIRED_SECTIONS
                .iter()
                .filter(|s| **s != missing)
                .map(|s| format!("# {}\n", s))
                .collect();
            assert!(
                !policy.structurally_complete(&outline),
                "outline without {missing} should be incomplete"
            );
        }
    }

    #[test]
    fn test_removing_any_aspect_fails_coverage() {
        let policy = SubstringPolicy::new().with_required_aspects(ASPECTS);
        for missing in ASPECTS {
            let outline: String = ASPECTS
                .iter()
                .filter(|a| **a != missing)
                .map(|a| format!("{} ", a.to_lowercase()))
                .collect();
            assert!(!policy.aspects_covered(&outline, ""));
            assert!(!policy.accepts(&(full_outline_without_aspects() + &outline), ""));
        }
    }

    fn full_outline_without_aspects() -> String {
        DEFAULT_REQUIRED_SECTIONS
            .iter()
            .map(|s| format!("# {}\n", s))
            .collect()
    }

    #[test]
    fn test_no_aspects_is_vacuously_covered() {
        let policy = SubstringPolicy::new();
        assert!(policy.aspects_covered("", "Study X"));
        assert!(policy.accepts(&full_outline_without_aspects(), "Study X"));
    }

    #[test]
    fn test_blank_entries_are_ignored() {
        let policy = SubstringPolicy::new()
            .with_required_sections(["  Results ", ""])
            .with_required_aspects(vec![String::from("   ")]);
        assert_eq!(policy.required_sections(), ["Results"]);
        assert!(policy.required_aspects().is_empty());
        assert!(policy.structurally_complete("## results"));
    }
}
