use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Stage of a run an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Single-actor generation without a critic
    Baseline,
    /// Outline refinement loop
    Refinement,
    /// Full-paper assembly and evaluation
    Paper,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Baseline => write!(f, "baseline"),
            Phase::Refinement => write!(f, "refinement"),
            Phase::Paper => write!(f, "paper"),
        }
    }
}

/// Structured log events for a paperloops run.
///
/// Iteration numbers are 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        prompt: String,
        model: String,
        max_iterations: usize,
    },
    BaselineStarted,
    BaselineCompleted {
        outline_chars: usize,
        paper_chars: usize,
    },
    ActorStarted {
        iteration: usize,
        prompt_preview: String,
    },
    ActorCompleted {
        iteration: usize,
        response_chars: usize,
        duration_secs: f64,
    },
    CriticStarted {
        iteration: usize,
    },
    CriticCompleted {
        iteration: usize,
        evaluation_chars: usize,
        duration_secs: f64,
    },
    /// Both completion predicates held for this iteration's outline
    OutlineAccepted {
        iteration: usize,
    },
    MaxIterationsReached {
        iterations: usize,
    },
    PaperStarted {
        sections: usize,
    },
    SectionStarted {
        index: usize,
        total: usize,
        heading: String,
    },
    SectionCompleted {
        index: usize,
        total: usize,
        content_chars: usize,
        duration_secs: f64,
    },
    PaperCompleted {
        paper_chars: usize,
        duration_secs: f64,
    },
    ErrorEncountered {
        phase: Phase,
        iteration: Option<usize>,
        error: String,
    },
    /// Full content of one result record, emitted when reporting a run
    BaselineReported {
        outline: String,
        paper: String,
    },
    RecordReported {
        iteration: usize,
        kind: String,
        response: String,
        evaluation: String,
    },
    ComparisonSummary {
        single_outline_chars: usize,
        single_paper_chars: usize,
        final_response_chars: usize,
        iterations: usize,
    },
    FileWritten {
        path: PathBuf,
    },
    PersistenceWarning {
        path: PathBuf,
        error: String,
    },
    RunCompleted {
        records: usize,
        duration_secs: f64,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
    /// No console output; file logging still applies
    Quiet,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            "quiet" => Ok(LogFormat::Quiet),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

const RULE_WIDTH: usize = 69;

/// Logger for paperloops events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Logger that emits nothing to the console
    pub fn quiet() -> Self {
        Self::new(LogFormat::Quiet)
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
            LogFormat::Quiet => {}
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted {
                prompt,
                model,
                max_iterations,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    format!("╭{}╮", "─".repeat(RULE_WIDTH)).bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "paperloops".bold().bright_white(),
                    " ".repeat(RULE_WIDTH - 12) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Prompt:".dimmed(),
                    Self::truncate_with_padding(prompt, 58, RULE_WIDTH - 9).dimmed()
                );
                let settings = format!("{}, up to {} outline iteration(s)", model, max_iterations);
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Model:".dimmed(),
                    Self::truncate_with_padding(&settings, 59, RULE_WIDTH - 8).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    format!("╰{}╯", "─".repeat(RULE_WIDTH)).bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::BaselineStarted => {
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    "▶".bright_cyan(),
                    "SINGLE ACTOR BASELINE".bright_cyan().bold()
                );
            }
            LogEvent::BaselineCompleted {
                outline_chars,
                paper_chars,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} Outline {} chars, paper {} chars",
                    "✓".bright_green(),
                    outline_chars,
                    paper_chars
                );
                let _ = writeln!(stderr);
            }
            LogEvent::ActorStarted { iteration, .. } => {
                let iter_text = format!("─ Iteration {} ", iteration);
                let padding = "─".repeat(RULE_WIDTH.saturating_sub(iter_text.chars().count()));
                let _ = writeln!(
                    stderr,
                    "{}{}{}",
                    "┌".bright_blue(),
                    iter_text.bright_blue().bold(),
                    padding.bright_blue()
                );
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_cyan(),
                    "ACTOR".bright_cyan().bold()
                );
            }
            LogEvent::ActorCompleted {
                response_chars,
                duration_secs,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} Outline drafted, {} chars ({:.1}s)",
                    "✓".bright_green(),
                    response_chars,
                    duration_secs
                );
                let _ = writeln!(stderr);
            }
            LogEvent::CriticStarted { .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_magenta(),
                    "CRITIC".bright_magenta().bold()
                );
            }
            LogEvent::CriticCompleted {
                evaluation_chars,
                duration_secs,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} Feedback, {} chars ({:.1}s)",
                    "→".bright_yellow(),
                    evaluation_chars,
                    duration_secs
                );
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    format!("└{}┘", "─".repeat(RULE_WIDTH)).bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::OutlineAccepted { iteration } => {
                let _ = writeln!(
                    stderr,
                    "{} Outline accepted at iteration {}",
                    "✓".bright_green(),
                    iteration
                );
                let _ = writeln!(stderr);
            }
            LogEvent::MaxIterationsReached { iterations } => {
                let _ = writeln!(
                    stderr,
                    "{} Maximum iterations reached ({}), continuing with the latest outline",
                    "⚠".bright_yellow(),
                    iterations
                );
                let _ = writeln!(stderr);
            }
            LogEvent::PaperStarted { sections } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} ({} sections)",
                    "▶".bright_cyan(),
                    "PAPER".bright_cyan().bold(),
                    sections
                );
            }
            LogEvent::SectionStarted {
                index,
                total,
                heading,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} [{}/{}] {}",
                    "│".dimmed(),
                    index,
                    total,
                    heading
                );
            }
            LogEvent::SectionCompleted {
                content_chars,
                duration_secs,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {}   {} chars ({:.1}s)",
                    "│".dimmed(),
                    content_chars,
                    duration_secs
                );
            }
            LogEvent::PaperCompleted {
                paper_chars,
                duration_secs,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} Paper assembled, {} chars ({:.1}s)",
                    "✓".bright_green(),
                    paper_chars,
                    duration_secs
                );
                let _ = writeln!(stderr);
            }
            LogEvent::ErrorEncountered {
                phase,
                iteration,
                error,
            } => {
                let _ = writeln!(stderr);
                let location = match iteration {
                    Some(i) => format!("{} iteration {}", phase, i),
                    None => phase.to_string(),
                };
                let _ = writeln!(
                    stderr,
                    "{} Error in {}: {}",
                    "✗".bright_red(),
                    location,
                    error.bright_red()
                );
            }
            LogEvent::BaselineReported { outline, paper } => {
                let _ = writeln!(stderr, "{}", "Single actor:".bright_yellow());
                let _ = writeln!(stderr, "{} {}", "Outline:".bright_green(), outline.green());
                let _ = writeln!(stderr, "{} {}", "Paper:".bright_green(), paper.green());
                let _ = writeln!(stderr, "{}", "---".dimmed());
            }
            LogEvent::RecordReported {
                iteration,
                kind,
                response,
                evaluation,
            } => {
                let _ = writeln!(
                    stderr,
                    "{}",
                    format!("Iteration {} ({}):", iteration, kind).bright_yellow()
                );
                let _ = writeln!(stderr, "{} {}", "Response:".bright_green(), response.green());
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    "Evaluation:".bright_magenta(),
                    evaluation.magenta()
                );
                let _ = writeln!(stderr, "{}", "---".dimmed());
            }
            LogEvent::ComparisonSummary {
                single_outline_chars,
                single_paper_chars,
                final_response_chars,
                iterations,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(stderr, "{}", "Comparison:".bright_cyan().bold());
                let rows = [
                    ("Single actor outline length", single_outline_chars),
                    ("Single actor full paper length", single_paper_chars),
                    ("Actor-critic final response length", final_response_chars),
                    ("Actor-critic iterations", iterations),
                ];
                for (label, value) in rows {
                    let _ = writeln!(stderr, "  {:<36} {}", label.blue(), value);
                }
                let _ = writeln!(stderr);
            }
            LogEvent::FileWritten { path } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "📄".dimmed(),
                    path.display().to_string().dimmed()
                );
            }
            LogEvent::PersistenceWarning { path, error } => {
                let _ = writeln!(
                    stderr,
                    "{} Could not write {}: {}",
                    "⚠".bright_yellow(),
                    path.display(),
                    error
                );
            }
            LogEvent::RunCompleted { .. } => {
                // Rendered by the binary's final summary
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted { model, .. } => format!("[{}] run:start {}", timestamp, model),
            LogEvent::BaselineStarted => format!("[{}] baseline:start", timestamp),
            LogEvent::BaselineCompleted {
                outline_chars,
                paper_chars,
            } => format!(
                "[{}] baseline:done outline={} paper={}",
                timestamp, outline_chars, paper_chars
            ),
            LogEvent::ActorStarted { iteration, .. } => {
                format!("[{}] actor:start:{}", timestamp, iteration)
            }
            LogEvent::ActorCompleted {
                iteration,
                response_chars,
                duration_secs,
            } => format!(
                "[{}] actor:done:{} chars={} {:.1}s",
                timestamp, iteration, response_chars, duration_secs
            ),
            LogEvent::CriticStarted { iteration } => {
                format!("[{}] critic:start:{}", timestamp, iteration)
            }
            LogEvent::CriticCompleted {
                iteration,
                evaluation_chars,
                duration_secs,
            } => format!(
                "[{}] critic:done:{} chars={} {:.1}s",
                timestamp, iteration, evaluation_chars, duration_secs
            ),
            LogEvent::OutlineAccepted { iteration } => {
                format!("[{}] outline:accepted:{}", timestamp, iteration)
            }
            LogEvent::MaxIterationsReached { iterations } => {
                format!("[{}] loop:limit:{}", timestamp, iterations)
            }
            LogEvent::PaperStarted { sections } => {
                format!("[{}] paper:start sections={}", timestamp, sections)
            }
            LogEvent::SectionStarted { index, total, .. } => {
                format!("[{}] section:start:{}/{}", timestamp, index, total)
            }
            LogEvent::SectionCompleted {
                index,
                total,
                content_chars,
                ..
            } => format!(
                "[{}] section:done:{}/{} chars={}",
                timestamp, index, total, content_chars
            ),
            LogEvent::PaperCompleted {
                paper_chars,
                duration_secs,
            } => format!(
                "[{}] paper:done chars={} {:.1}s",
                timestamp, paper_chars, duration_secs
            ),
            LogEvent::ErrorEncountered {
                phase,
                iteration,
                error,
            } => match iteration {
                Some(i) => format!("[{}] error:{}:{}:{}", timestamp, phase, i, error),
                None => format!("[{}] error:{}:{}", timestamp, phase, error),
            },
            LogEvent::BaselineReported { .. } | LogEvent::RecordReported { .. } => return, // Too large for compact mode
            LogEvent::ComparisonSummary {
                single_outline_chars,
                single_paper_chars,
                final_response_chars,
                iterations,
            } => format!(
                "[{}] compare single_outline={} single_paper={} final={} iterations={}",
                timestamp, single_outline_chars, single_paper_chars, final_response_chars, iterations
            ),
            LogEvent::FileWritten { path } => {
                format!("[{}] file:{}", timestamp, path.display())
            }
            LogEvent::PersistenceWarning { path, error } => {
                format!("[{}] file:failed:{}:{}", timestamp, path.display(), error)
            }
            LogEvent::RunCompleted {
                records,
                duration_secs,
            } => format!(
                "[{}] run:done records={} {:.1}s",
                timestamp, records, duration_secs
            ),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = LogEvent::ErrorEncountered {
            phase: Phase::Refinement,
            iteration: Some(2),
            error: "timeout".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "error_encountered");
        assert_eq!(json["phase"], "refinement");
        assert_eq!(json["iteration"], 2);
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("PRETTY".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("quiet".parse::<LogFormat>(), Ok(LogFormat::Quiet));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_truncate_handles_multibyte() {
        let padded = Logger::truncate_with_padding("研究遗传算法与大型语言模型", 8, 12);
        assert!(padded.starts_with("研究遗传算..."));
        assert!(padded.ends_with('│'));
        assert_eq!(padded.chars().count(), 12);
    }

    #[test]
    fn test_file_log_is_json_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("run.jsonl");
        let logger = Logger::with_file(LogFormat::Quiet, &path).unwrap();

        logger.log(&LogEvent::OutlineAccepted { iteration: 1 });
        logger.log(&LogEvent::MaxIterationsReached { iterations: 2 });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "outline_accepted");
        assert!(first["timestamp"].is_string());
    }
}
