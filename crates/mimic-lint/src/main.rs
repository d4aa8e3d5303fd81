//! Mimic Mock Definition Linter CLI
//!
//! Validates mock definition files with the server's own parser, reporting
//! rules that would be rejected at load time.
//!
//! Usage:
//!   mimic-lint <FILE_OR_DIRECTORY>... [OPTIONS]

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use mimic_core::request::RequestView;
use mimic_lint::{
    collect_rule_files, find_matches, lint_file, IssueCode, LintIssue, LintOptions, LintResult,
    MockMatch, Severity,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Mimic Mock Definition Linter
#[derive(Parser, Debug)]
#[command(name = "mimic-lint")]
#[command(author, version, about = "Validate Mimic mock definition files")]
struct Args {
    /// Mock definition files or directories containing them
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// JSON request sample; lists the loaded mocks that match it
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Only show errors (hide warnings)
    #[arg(short = 'e', long)]
    errors_only: bool,

    /// Strict mode - treat warnings as errors
    #[arg(short, long)]
    strict: bool,

    /// Do not warn about mocks without a response
    #[arg(long)]
    allow_missing_response: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, env = "MIMIC_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a LintResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<&'a [MockMatch]>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_format);

    let options = LintOptions {
        require_response: !args.allow_missing_response,
    };

    let mut result = LintResult::new();
    let mut files = Vec::new();
    for path in &args.paths {
        match collect_rule_files(path) {
            Ok(found) => files.extend(found),
            Err(e) => result.add_issue(LintIssue::new(
                IssueCode::Unreadable,
                format!("Failed to read {}: {e}", path.display()),
                path.clone(),
            )),
        }
    }
    debug!(count = files.len(), "Collected rule files");

    for file in &files {
        result.merge(lint_file(file, &options));
    }

    let matches = match &args.request {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read request sample {}", path.display()))?;
            let request: RequestView = serde_json::from_str(&text)
                .with_context(|| format!("invalid request sample {}", path.display()))?;
            Some(find_matches(&files, &request))
        }
        None => None,
    };

    match args.format {
        OutputFormat::Json => {
            let report = JsonReport {
                result: &result,
                matches: matches.as_deref(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            print_results(&result, &args);
            if let Some(matches) = &matches {
                print_matches(matches);
            }
        }
    }

    let has_errors = result.has_errors() || (args.strict && result.has_warnings());
    std::process::exit(if has_errors { 1 } else { 0 });
}

fn init_logging(verbose: u8, format: LogFormat) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    if result.is_err() {
        debug!("Logging already initialized, skipping");
    }
}

fn print_results(result: &LintResult, args: &Args) {
    let issues: Vec<&LintIssue> = result
        .issues
        .iter()
        .filter(|i| !args.errors_only || i.severity == Severity::Error)
        .collect();

    if issues.is_empty() {
        println!("{GREEN}{BOLD}No issues found!{RESET}");
    }

    for issue in issues {
        let color = severity_color(&issue.severity);
        let location = issue
            .location
            .as_ref()
            .map(|l| format!(" {CYAN}{l}{RESET}:"))
            .unwrap_or_default();

        println!(
            "{BOLD}{}{RESET}:{location} {color}{BOLD}{}{RESET}: {} {DIM}({}){RESET}",
            issue.file.display(),
            issue.severity.label(),
            issue.message,
            issue.code
        );
        if let Some(suggestion) = &issue.suggestion {
            println!("  {GREEN}-> {suggestion}{RESET}");
        }
    }

    println!();
    println!(
        "{DIM}Files checked:{RESET} {BOLD}{}{RESET}  {DIM}Mocks loaded:{RESET} {BOLD}{}{RESET}",
        result.files_checked, result.mocks_loaded
    );

    if result.errors > 0 {
        println!("  {RED}Errors:{RESET}    {BOLD}{RED}{}{RESET}", result.errors);
    } else {
        println!("  {GREEN}Errors:{RESET}    {BOLD}{GREEN}0{RESET}");
    }

    if result.warnings > 0 {
        println!(
            "  {YELLOW}Warnings:{RESET}  {BOLD}{YELLOW}{}{RESET}",
            result.warnings
        );
    } else {
        println!("  {DIM}Warnings:{RESET}  {BOLD}0{RESET}");
    }
}

fn print_matches(matches: &[MockMatch]) {
    println!();
    if matches.is_empty() {
        println!("{YELLOW}No loaded mock matches the request sample{RESET}");
        return;
    }
    println!("{BOLD}{CYAN}Matching mocks{RESET}");
    for (rank, hit) in matches.iter().enumerate() {
        let marker = if rank == 0 { "*" } else { " " };
        println!(
            "  {GREEN}{marker}{RESET} {}: mocks[{}]",
            hit.file.display(),
            hit.index
        );
    }
}

fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
    }
}
