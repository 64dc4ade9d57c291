//! People Schema CLI
//!
//! Command-line interface for reading, writing and linting people annotations
//! and for resolving current roles.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use people_schema::telemetry::{init_tracing, level_from_verbosity};
use people_schema::{
    active_memberships_on, build_model, current_role_on, json_type_name, lint, load_annotations,
    load_model_auto, normalize_model, read_model, today, write_model, FileStatus, LoadError,
    Membership, Person, SchemaAnnotations, SchemaMetadataCodec, Severity,
};

#[derive(Parser)]
#[command(name = "people-schema")]
#[command(about = "Read, write and lint people schema annotations")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the people annotations of every schema in a model file
    Read {
        /// Model source: file path or URL (http:// or https://)
        model: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Write a model file from annotations JSON
    Write {
        /// JSON file with one annotations object or an array of them
        annotations: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Rewrite the people annotations of a model file in canonical form
    Normalize {
        /// Model source: file path or URL (http:// or https://)
        model: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Lint model files for annotation problems
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },

    /// Resolve the current role from a memberships file
    Role {
        /// JSON file with a list of memberships or a person object
        memberships: PathBuf,

        /// Print the active memberships as JSON instead of the role
        #[arg(long)]
        active: bool,

        /// Date to resolve against (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json, level_from_verbosity(cli.verbose));

    let result = match cli.command {
        Commands::Read {
            model,
            output,
            pretty,
        } => run_read(&model, output, pretty),
        Commands::Write {
            annotations,
            output,
        } => run_write(&annotations, output),
        Commands::Normalize { model, output } => run_normalize(&model, output),
        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
        Commands::Role {
            memberships,
            active,
            today,
            pretty,
        } => run_role(&memberships, active, today, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn report(e: LoadError) -> u8 {
    eprintln!("Error: {}", e);
    e.exit_code() as u8
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn emit(output: Option<PathBuf>, content: &str) -> Result<(), u8> {
    match output {
        Some(path) => {
            std::fs::write(&path, content).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn run_read(source: &str, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let model = load_model_auto(source).map_err(report)?;
    let schemas = read_model(&model, &SchemaMetadataCodec::new());

    let annotations: Vec<SchemaAnnotations> =
        schemas.iter().map(SchemaAnnotations::from_schema).collect();
    emit(output, &to_json(&annotations, pretty)?)
}

fn run_write(path: &Path, output: Option<PathBuf>) -> Result<(), u8> {
    let entries = load_annotations(path).map_err(report)?;
    let schemas: Vec<_> = entries.iter().map(SchemaAnnotations::to_schema).collect();

    let model = build_model(&schemas, &SchemaMetadataCodec::new());
    let xml = write_model(&model).map_err(report)?;
    emit(output, &xml)
}

fn run_normalize(source: &str, output: Option<PathBuf>) -> Result<(), u8> {
    let mut model = load_model_auto(source).map_err(report)?;
    let schemas = normalize_model(&mut model, &SchemaMetadataCodec::new());
    tracing::info!(schemas = schemas.len(), "normalized model");

    let xml = write_model(&model).map_err(report)?;
    emit(output, &xml)
}

fn parse_memberships(content: &str) -> Result<Vec<Membership>, String> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        serde_json::Value::Object(_) => serde_json::from_value::<Person>(value)
            .map(|person| person.memberships)
            .map_err(|e| e.to_string()),
        other => Err(format!(
            "expected a list of memberships or a person object, got {}",
            json_type_name(&other)
        )),
    }
}

fn run_role(path: &Path, active: bool, date: Option<NaiveDate>, pretty: bool) -> Result<(), u8> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: cannot read {}: {}", path.display(), e);
        3u8
    })?;
    let memberships = parse_memberships(&content).map_err(|e| {
        eprintln!("Error: invalid memberships: {}", e);
        2u8
    })?;

    let date = date.unwrap_or_else(today);
    if active {
        let active = active_memberships_on(&memberships, date);
        println!("{}", to_json(&active, pretty)?);
    } else {
        println!("{}", current_role_on(&memberships, date));
    }
    Ok(())
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        println!("{}", to_json(&result, true)?);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
