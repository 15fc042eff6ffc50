//! `clinote` command-line entry point.
//!
//! # Responsibility
//! - Run engine operations on files (or stdin) from the terminal.
//! - Map outcomes to stable exit codes: 0 ok, 1 invalid note, 2 error.
//!
//! # Invariants
//! - Command output goes to stdout; diagnostics go to stderr.
//! - Structured outputs (`--json`, `preview`, `normalize --stats`) are JSON.

use clap::{Parser, Subcommand};
use clinote_core::config::load_template_file;
use clinote_core::{
    default_log_level, init_engine, init_logging, Engine, EngineConfig, Issue, NoteError,
    Stats, ValidationReport,
};
use log::info;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

const EXIT_INVALID: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(
    name = "clinote",
    version,
    about = "Validate, normalize and convert structured clinical notes",
    after_help = r#"EXAMPLES
  $ clinote validate visit.txt --template soap --strict
  $ clinote convert visit.txt --format json
  $ cat visit.txt | clinote normalize - --template hp --stats
  $ clinote validate note.txt --template "sections: Summary, Findings?, Plan"
  $ clinote validate clinic-day.txt --bundle --json

ENVIRONMENT
  CLINOTE_HEURISTICS      enable keyword inference (default: true)
  CLINOTE_PREVIEW_CHARS   preview snippet length (default: 80)
  CLINOTE_TEMPLATES_FILE  JSON array of extra template definitions"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, help = "Log level: trace|debug|info|warn|error (requires --log-dir)")]
    log_level: Option<String>,
    #[arg(long, help = "Directory for rolling log files")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "JSON file with extra template definitions")]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Convert a note into plain, markdown, json or csv")]
    Convert {
        #[arg(help = "Note file, or - for stdin")]
        input: String,
        #[arg(long, short, default_value = "soap", help = "Template name or inline definition")]
        template: String,
        #[arg(long, short, default_value = "plain", help = "Output format: plain|markdown|json|csv")]
        format: String,
        #[arg(long, help = "Abort when validation reports errors")]
        strict: bool,
    },
    #[command(about = "Rewrite a note into canonical form")]
    Normalize {
        #[arg(help = "Note file, or - for stdin")]
        input: String,
        #[arg(long, short, default_value = "soap", help = "Template name or inline definition")]
        template: String,
        #[arg(long, help = "Emit JSON with the normalized text and statistics")]
        stats: bool,
        #[arg(long, conflicts_with = "stats", help = "Treat input as notes separated by --- lines")]
        bundle: bool,
    },
    #[command(about = "Check a note against a template")]
    Validate {
        #[arg(help = "Note file, or - for stdin")]
        input: String,
        #[arg(long, short, default_value = "soap", help = "Template name or inline definition")]
        template: String,
        #[arg(long, help = "Treat warnings as errors")]
        strict: bool,
        #[arg(long, help = "Emit the report as JSON")]
        json: bool,
        #[arg(long, help = "Treat input as notes separated by --- lines")]
        bundle: bool,
    },
    #[command(about = "Show per-section previews as JSON")]
    Preview {
        #[arg(help = "Note file, or - for stdin")]
        input: String,
        #[arg(long, short, default_value = "soap", help = "Template name or inline definition")]
        template: String,
        #[arg(long, help = "Treat input as notes separated by --- lines")]
        bundle: bool,
    },
    #[command(about = "List registered templates")]
    Templates,
    #[command(about = "Print a liveness marker")]
    Ping,
}

#[derive(Serialize)]
struct NormalizeJson<'a> {
    normalized: &'a str,
    stats: &'a Stats,
}

struct CliError {
    exit_code: i32,
    message: String,
}

impl CliError {
    fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: EXIT_ERROR,
            message: message.into(),
        }
    }
}

impl From<NoteError> for CliError {
    fn from(err: NoteError) -> Self {
        let exit_code = match err {
            NoteError::ValidationFailed(_) => EXIT_INVALID,
            _ => EXIT_ERROR,
        };
        Self {
            exit_code,
            message: err.to_string(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err.message);
            err.exit_code
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32, CliError> {
    if let Command::Ping = cli.command {
        println!("{}", clinote_core::ping());
        return Ok(0);
    }

    setup_logging(cli.log_level.as_deref(), cli.log_dir.as_deref())?;
    let engine = build_engine(cli.templates.as_deref())?;

    match cli.command {
        Command::Convert {
            input,
            template,
            format,
            strict,
        } => {
            let text = read_input(&input)?;
            println!("{}", engine.convert(&text, &template, &format, strict)?);
            Ok(0)
        }
        Command::Normalize {
            input,
            template,
            stats,
            bundle,
        } => {
            let text = read_input(&input)?;
            if bundle {
                println!("{}", engine.normalize_bundle(&text, &template)?);
            } else if stats {
                let output = engine.normalize_with_stats(&text, &template)?;
                let value = NormalizeJson {
                    normalized: &output.normalized,
                    stats: &output.stats,
                };
                println!("{}", to_json(&value)?);
            } else {
                println!("{}", engine.normalize(&text, &template)?);
            }
            Ok(0)
        }
        Command::Validate {
            input,
            template,
            strict,
            json,
            bundle,
        } => {
            let text = read_input(&input)?;
            if bundle {
                let report = engine.validate_bundle(&text, &template, strict)?;
                if json {
                    println!("{}", to_json(&report)?);
                } else {
                    for note in &report.notes {
                        println!("note {}:", note.note_index);
                        print_report(&note.report);
                    }
                }
                return Ok(if report.is_valid { 0 } else { EXIT_INVALID });
            }
            let report = engine.validate(&text, &template, strict)?;
            if json {
                println!("{}", to_json(&report)?);
            } else {
                print_report(&report);
            }
            Ok(if report.is_valid { 0 } else { EXIT_INVALID })
        }
        Command::Preview {
            input,
            template,
            bundle,
        } => {
            let text = read_input(&input)?;
            if bundle {
                println!("{}", to_json(&engine.preview_bundle(&text, &template)?)?);
            } else {
                println!("{}", to_json(&engine.preview_sections(&text, &template)?)?);
            }
            Ok(0)
        }
        Command::Templates => {
            for id in engine.registry().template_ids() {
                let title = engine
                    .registry()
                    .get(&id)
                    .map(|template| template.title().to_string())
                    .unwrap_or_default();
                let marker = if id == engine.default_format() { " (default)" } else { "" };
                println!("{id}\t{title}{marker}");
            }
            Ok(0)
        }
        Command::Ping => Ok(0),
    }
}

fn setup_logging(level: Option<&str>, log_dir: Option<&Path>) -> Result<(), CliError> {
    let Some(log_dir) = log_dir else {
        if level.is_some() {
            return Err(CliError::error("--log-level requires --log-dir"));
        }
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| CliError::error(format!("failed to resolve current dir: {err}")))?
            .join(log_dir)
    };
    init_logging(
        level.unwrap_or_else(|| default_log_level()),
        &log_dir.to_string_lossy(),
    )
    .map_err(CliError::error)?;
    info!("event=cli_start module=cli status=ok");
    Ok(())
}

fn build_engine(templates: Option<&Path>) -> Result<&'static Engine, CliError> {
    let mut config = EngineConfig::from_env()?;
    if let Some(path) = templates {
        config.templates.extend(load_template_file(path)?);
    }
    Ok(init_engine(config)?)
}

fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| CliError::error(format!("failed to read stdin: {err}")))?;
        return Ok(text);
    }
    std::fs::read_to_string(input)
        .map_err(|err| CliError::error(format!("failed to read `{input}`: {err}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::error(format!("failed to encode json: {err}")))
}

fn print_report(report: &ValidationReport) {
    let status = if report.is_valid { "valid" } else { "invalid" };
    let mode = if report.strict { "strict" } else { "lenient" };
    println!("{status} ({} template, {mode})", report.template);
    print_issues("error", &report.errors);
    print_issues("warning", &report.warnings);
    print_issues("info", &report.info);
}

fn print_issues(severity: &str, issues: &[Issue]) {
    for issue in issues {
        println!("{severity}\t{}\t{}", issue.kind.as_str(), issue.message);
    }
}
