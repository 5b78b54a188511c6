//! `agencyc`: parse, format, check, graph and compile Agency programs.
//!
//! ```text
//! agencyc parse flow.agency          # AST as JSON
//! agencyc format flow.agency         # formatted source
//! agencyc check flow.agency          # type errors
//! agencyc graph flow.agency          # Mermaid call-flow diagram
//! agencyc compile flow.agency -o flow.ts
//! ```
//!
//! Set `RUST_LOG=agency=debug` to trace the passes.

use agency::{
    check, compile, parse, render_call_flow, serialize_with, AgencyConfig, CompileError, ErrorReporter,
    FormatOptions,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agencyc")]
#[command(about = "Agency compiler - LLM agent workflows to resumable TypeScript", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file (strictTypes, excludeBuiltinFunctions, ...)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the syntax tree as JSON
    Parse {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Print the program with two-space indentation
    Format {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Rewrite the file in place
        #[arg(long)]
        write: bool,
    },

    /// Type check and list diagnostics
    Check {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a Mermaid call-flow diagram
    Graph {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Compile to TypeScript
    Compile {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("agency=debug,agency_graph=debug,agency_codegen=debug,agency_typecheck=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<AgencyConfig> {
    let Some(path) = path else {
        return Ok(AgencyConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    AgencyConfig::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
}

/// Parse `source`, reporting failures through ariadne.
fn parse_or_report(path: &Path, source: &str) -> Result<agency::Program> {
    parse(source).or_else(|err| {
        ErrorReporter::new(path.display().to_string(), source).report(&err);
        bail!("{} failed to parse", path.display())
    })
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Parse { input } => {
            let source = read_source(&input)?;
            let program = parse_or_report(&input, &source)?;
            println!("{}", serde_json::to_string_pretty(&program)?);
        }
        Commands::Format { input, write } => {
            let source = read_source(&input)?;
            let program = parse_or_report(&input, &source)?;
            let formatted = serialize_with(&program, &FormatOptions::indented());
            if write {
                fs::write(&input, formatted).with_context(|| format!("writing {}", input.display()))?;
            } else {
                print!("{}", formatted);
            }
        }
        Commands::Check { input, json } => {
            let source = read_source(&input)?;
            let program = parse_or_report(&input, &source)?;
            let result = check(&program, &config.typecheck_options());
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for error in &result.errors {
                    eprintln!("{}: {}", input.display(), error);
                }
            }
            if !result.is_ok() {
                bail!("{} type error(s)", result.errors.len());
            }
        }
        Commands::Graph { input } => {
            let source = read_source(&input)?;
            let program = parse_or_report(&input, &source)?;
            print!("{}", render_call_flow(&program));
        }
        Commands::Compile { input, output } => {
            let source = read_source(&input)?;
            let compiled = match compile(&source, &config) {
                Ok(compiled) => compiled,
                Err(CompileError::Parse(err)) => {
                    ErrorReporter::new(input.display().to_string(), &source).report(&err);
                    bail!("{} failed to parse", input.display());
                }
                Err(CompileError::TypeCheck(errors)) => {
                    for error in &errors {
                        eprintln!("{}: {}", input.display(), error);
                    }
                    bail!("{} type error(s)", errors.len());
                }
                Err(err) => return Err(err.into()),
            };
            for error in &compiled.type_errors {
                eprintln!("{}: warning: {}", input.display(), error);
            }
            match output {
                Some(path) => fs::write(&path, &compiled.typescript)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{}", compiled.typescript),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
