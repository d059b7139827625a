//! Parsing of markdown-style outlines into sections and subsections.
//!
//! A line whose trimmed text starts with `# ` opens a section, `## ` opens a
//! subsection of the current section, and any other non-empty line is content
//! of the current subsection. Headings keep their marker.

use thiserror::Error;

const SECTION_MARKER: &str = "# ";
const SUBSECTION_MARKER: &str = "## ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    #[error("Subsection on line {line} appears before any section heading")]
    SubsectionWithoutSection { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subsection {
    pub heading: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub subsections: Vec<Subsection>,
}

impl Section {
    fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            subsections: Vec::new(),
        }
    }

    pub fn subsection(&self, heading: &str) -> Option<&Subsection> {
        self.subsections.iter().find(|s| s.heading == heading)
    }

    /// Render the subsection map as markdown, for embedding in a prompt
    pub fn render_subsections(&self) -> String {
        if self.subsections.is_empty() {
            return "(no subsections listed)".to_string();
        }

        let mut out = String::new();
        for subsection in &self.subsections {
            out.push('\n');
            out.push_str(&subsection.heading);
            for line in &subsection.lines {
                out.push('\n');
                out.push_str(line);
            }
        }
        out
    }

    /// Re-open the subsection with this heading, clearing its lines, or append a new one.
    fn open_subsection(&mut self, heading: &str) -> usize {
        match self.subsections.iter().position(|s| s.heading == heading) {
            Some(index) => {
                self.subsections[index].lines.clear();
                index
            }
            None => {
                self.subsections.push(Subsection {
                    heading: heading.to_string(),
                    lines: Vec::new(),
                });
                self.subsections.len() - 1
            }
        }
    }
}

/// Ordered section -> subsection -> lines mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineTree {
    sections: Vec<Section>,
}

impl OutlineTree {
    pub fn parse(text: &str) -> Result<Self, OutlineError> {
        let mut tree = OutlineTree::default();
        let mut current_section: Option<usize> = None;
        let mut current_subsection: Option<usize> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();

            if line.starts_with(SECTION_MARKER) {
                current_section = Some(tree.open_section(line));
                current_subsection = None;
            } else if line.starts_with(SUBSECTION_MARKER) {
                let section = current_section
                    .ok_or(OutlineError::SubsectionWithoutSection { line: index + 1 })?;
                current_subsection = Some(tree.sections[section].open_subsection(line));
            } else if !line.is_empty() {
                if let (Some(section), Some(subsection)) = (current_section, current_subsection) {
                    tree.sections[section].subsections[subsection]
                        .lines
                        .push(line.to_string());
                }
            }
        }

        Ok(tree)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Serialize back into outline text that parses to an equal tree
    pub fn to_markdown(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for section in &self.sections {
            lines.push(&section.heading);
            for subsection in &section.subsections {
                lines.push(&subsection.heading);
                lines.extend(subsection.lines.iter().map(String::as_str));
            }
        }
        lines.join("\n")
    }

    /// A repeated heading keeps its first position but starts over empty.
    fn open_section(&mut self, heading: &str) -> usize {
        match self.sections.iter().position(|s| s.heading == heading) {
            Some(index) => {
                self.sections[index].subsections.clear();
                index
            }
            None => {
                self.sections.push(Section::new(heading));
                self.sections.len() - 1
            }
        }
    }
}
