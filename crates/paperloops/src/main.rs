mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use paperloops_agent::{
    ChatClient, ClientConfig, RetryPolicy, DEFAULT_BASE_URL, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MODEL,
};
use paperloops_core::{
    ComparisonDriver, ComparisonReport, PaperOutcome, RefinementOutcome, ResultWriter, RunContext,
    SubstringPolicy, DEFAULT_MAX_ITERATIONS, DEFAULT_REQUIRED_SECTIONS,
};
use paperloops_logging::{init_tracing, LogFormat, Logger};

use crate::config::ProjectConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Parser, Debug)]
#[command(
    name = "paperloops",
    about = "Actor-critic academic paper writer",
    version,
    author
)]
struct Cli {
    /// Research prompt (or reads from prompt.md if not provided)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Path to prompt file (default: ./prompt.md)
    #[arg(long, default_value = "prompt.md")]
    prompt_file: PathBuf,

    /// API key for the chat-completion endpoint
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Endpoint base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum outline iterations (default: 2)
    #[arg(short = 'n', long)]
    max_iterations: Option<usize>,

    /// Aspect the outline must mention (repeatable)
    #[arg(long = "aspect")]
    aspects: Vec<String>,

    /// Directory for the result files (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output ceiling for actor generations; 0 lifts the ceiling
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// Skip the single-actor baseline
    #[arg(long)]
    no_baseline: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Diagnostic log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also append events as JSON lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show resolved settings without calling the endpoint
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
    Quiet,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
            LogFormatChoice::Quiet => LogFormat::Quiet,
        }
    }
}

/// Settings after merging CLI flags, the config file and defaults
#[derive(Debug, PartialEq)]
struct Settings {
    base_url: String,
    model: String,
    max_iterations: usize,
    max_output_tokens: Option<u32>,
    output_dir: PathBuf,
    retry: RetryPolicy,
    required_sections: Vec<String>,
    required_aspects: Vec<String>,
}

impl Settings {
    fn resolve(cli: &Cli, config: &ProjectConfig) -> Result<Self> {
        let max_output_tokens = cli
            .max_output_tokens
            .or(config.max_output_tokens)
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS);

        let required_aspects = if cli.aspects.is_empty() {
            config.outline.required_aspects.clone()
        } else {
            cli.aspects.clone()
        };

        Ok(Self {
            base_url: cli
                .base_url
                .clone()
                .or_else(|| config.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: cli
                .model
                .clone()
                .or_else(|| config.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_iterations: cli
                .max_iterations
                .or(config.max_iterations)
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
            max_output_tokens: (max_output_tokens > 0).then_some(max_output_tokens),
            output_dir: cli
                .output_dir
                .clone()
                .or_else(|| config.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            retry: config.retry.to_policy()?,
            required_sections: config.outline.required_sections.clone().unwrap_or_else(|| {
                DEFAULT_REQUIRED_SECTIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            required_aspects,
        })
    }

    fn policy(&self) -> SubstringPolicy {
        SubstringPolicy::new()
            .with_required_sections(self.required_sections.iter())
            .with_required_aspects(self.required_aspects.iter())
    }
}

/// What `--json-output` prints
#[derive(Serialize)]
struct JsonSummary<'a> {
    exit_code: i32,
    #[serde(flatten)]
    report: &'a ComparisonReport,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;

    let prompt = get_prompt(&cli, &working_dir)?;

    let project_config = ProjectConfig::load(&working_dir)?.unwrap_or_default();
    let settings = Settings::resolve(&cli, &project_config)?;

    if cli.dry_run {
        print_dry_run(&prompt, &settings);
        return Ok(());
    }

    let api_key = cli
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .context("No API key provided. Use --api-key or set DEEPSEEK_API_KEY")?;

    let logger = match &cli.log_file {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };
    let logger = Arc::new(logger);

    let client = ChatClient::new(
        ClientConfig::new(api_key)
            .with_base_url(settings.base_url.clone())
            .with_model(settings.model.clone())
            .with_timeout(REQUEST_TIMEOUT)
            .with_retry(settings.retry.clone()),
    )
    .context("Failed to create chat client")?;

    let policy = settings.policy();
    let driver = ComparisonDriver::new(&client, &policy, logger)
        .with_max_output_tokens(settings.max_output_tokens)
        .with_baseline(!cli.no_baseline)
        .with_writer(ResultWriter::new(&settings.output_dir));

    let context = RunContext::new(prompt).with_max_iterations(settings.max_iterations);
    let report = driver.run(context).await;
    let exit_code = report.outcome.exit_code();

    if cli.json_output {
        let json = serde_json::to_string_pretty(&JsonSummary {
            exit_code,
            report: &report,
        })?;
        println!("{}", json);
    } else {
        print_report(&report, &settings.output_dir);
    }

    std::process::exit(exit_code);
}

fn get_prompt(cli: &Cli, working_dir: &Path) -> Result<String> {
    // Prefer --prompt flag
    if let Some(ref prompt) = cli.prompt {
        return Ok(prompt.clone());
    }

    let prompt_path = if cli.prompt_file.is_absolute() {
        cli.prompt_file.clone()
    } else {
        working_dir.join(&cli.prompt_file)
    };

    if prompt_path.exists() {
        let content =
            std::fs::read_to_string(&prompt_path).context("Failed to read prompt file")?;
        Ok(content.trim().to_string())
    } else {
        anyhow::bail!(
            "No prompt provided. Use --prompt or create a {} file",
            cli.prompt_file.display()
        )
    }
}

fn print_dry_run(prompt: &str, settings: &Settings) {
    println!("=== Dry Run ===");
    let preview: String = prompt.chars().take(100).collect();
    if preview.len() < prompt.len() {
        println!("Prompt: {}...", preview);
    } else {
        println!("Prompt: {}", prompt);
    }
    println!("Endpoint: {}", settings.base_url);
    println!("Model: {}", settings.model);
    println!("Max iterations: {}", settings.max_iterations);
    match settings.max_output_tokens {
        Some(tokens) => println!("Max output tokens: {}", tokens),
        None => println!("Max output tokens: unlimited"),
    }
    println!("Retry attempts: {}", settings.retry.max_attempts);
    println!("Output dir: {}", settings.output_dir.display());
    println!("Required sections: {}", settings.required_sections.join(", "));
    if settings.required_aspects.is_empty() {
        println!("Required aspects: none");
    } else {
        println!("Required aspects: {}", settings.required_aspects.join(", "));
    }
}

fn print_report(report: &ComparisonReport, output_dir: &Path) {
    let outcome = &report.outcome;

    eprintln!();
    match &outcome.refinement {
        RefinementOutcome::Accepted { iterations } => {
            eprintln!(
                "{} after {} iteration(s)",
                "OUTLINE ACCEPTED".green().bold(),
                iterations
            );
        }
        RefinementOutcome::Exhausted { iterations } => {
            eprintln!(
                "{} after {} iteration(s), using latest outline",
                "OUTLINE NOT ACCEPTED".yellow().bold(),
                iterations
            );
        }
        RefinementOutcome::Aborted { iteration, error } => {
            eprintln!(
                "{} in iteration {}: {}",
                "OUTLINE FAILED".red().bold(),
                iteration,
                error
            );
        }
    }

    match &outcome.paper {
        PaperOutcome::Completed { paper_chars, .. } => {
            eprintln!("{} ({} chars)", "=== PAPER COMPLETE ===".green().bold(), paper_chars);
        }
        PaperOutcome::Aborted { error } => {
            eprintln!("{}", "=== PAPER FAILED ===".red().bold());
            eprintln!("Error: {}", error);
        }
        PaperOutcome::Skipped => {
            eprintln!("{}", "=== NO OUTLINE PRODUCED ===".red().bold());
        }
    }

    let stats = &report.stats;
    eprintln!("Single actor outline: {} chars", stats.single_outline_chars);
    eprintln!("Single actor paper: {} chars", stats.single_paper_chars);
    eprintln!("Actor-critic final response: {} chars", stats.final_response_chars);
    eprintln!("Records: {}", stats.iterations);
    eprintln!("Duration: {:.1}s", outcome.total_duration_secs);

    if let Some(persisted) = &report.persisted {
        eprintln!(
            "Wrote {} file(s) to {}",
            persisted.written.len(),
            output_dir.display()
        );
        for failure in &persisted.failures {
            eprintln!(
                "{} {}: {}",
                "Could not write".yellow(),
                failure.path.display(),
                failure.error
            );
        }
    }
}
