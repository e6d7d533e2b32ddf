//! The shade compositing CLI.
//!
//! Provides the `shadec` command with the following subcommands:
//!
//! - `shadec rewrite <unit.json>` - Graft texture compositing onto a shader unit
//! - `shadec dump <unit.json>` - Print the tree of a shader unit
//!
//! A shader unit is the JSON form of a front end's output: the program tree
//! and, optionally, its symbol table. Without a symbol table the
//! fragment-shader built-ins are assumed.

mod logger;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use shade_ir::{dump_tree, Precision, SymbolTable, Tree};
use shade_rewrite::diagnostics::{error_code, render_diagnostic, DiagnosticOptions};
use shade_rewrite::{RewriteConfig, RewriteError, Rewriter};

#[derive(Parser)]
#[command(name = "shadec", version, about = "Fragment shader compositing rewrite")]
struct Cli {
    /// Log each rewrite step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Indented tree dump
    Ir,
    /// Shader unit JSON, readable by `shadec` again
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a shader unit so its output is multiplied by a texture sample
    Rewrite {
        /// Path to the shader unit JSON
        input: PathBuf,

        /// Suffix appended to every synthetic name (overrides the config file)
        #[arg(long)]
        suffix: Option<String>,

        /// Precision of the output-color alias: lowp, mediump or highp
        #[arg(long, value_parser = parse_precision)]
        precision: Option<Precision>,

        /// TOML rewrite config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Do not declare the texture-coordinate varying
        #[arg(long = "no-tex-coord-varying")]
        no_tex_coord_varying: bool,

        /// Leave shaders without `main` uncomposited instead of failing
        #[arg(long = "allow-missing-entry")]
        allow_missing_entry: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "ir")]
        emit: Emit,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Shader source text, for labeled diagnostics
        #[arg(long)]
        source: Option<PathBuf>,

        /// Output diagnostics as JSON instead of human-readable format
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,
    },
    /// Print the tree of a shader unit
    Dump {
        /// Path to the shader unit JSON
        input: PathBuf,
    },
}

/// One compilation unit as handed over by a front end.
#[derive(Serialize, Deserialize)]
struct ShaderUnit {
    tree: Tree,
    #[serde(default = "SymbolTable::with_fragment_builtins")]
    symbols: SymbolTable,
}

struct RewriteArgs {
    config: RewriteConfig,
    emit: Emit,
    output: Option<PathBuf>,
    source: Option<PathBuf>,
    json: bool,
    diag_opts: DiagnosticOptions,
}

/// Why a command failed.
enum CliError {
    /// A diagnostic has already been written to stderr.
    Reported,
    Message(String),
}

impl From<String> for CliError {
    fn from(message: String) -> Self {
        CliError::Message(message)
    }
}

fn parse_precision(s: &str) -> Result<Precision, String> {
    match s.parse::<Precision>()? {
        Precision::Undefined => Err(format!(
            "invalid precision '{s}', expected lowp, mediump, or highp"
        )),
        precision => Ok(precision),
    }
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let (result, json) = match cli.command {
        Commands::Rewrite {
            input,
            suffix,
            precision,
            config,
            no_tex_coord_varying,
            allow_missing_entry,
            emit,
            output,
            source,
            json,
            no_color,
        } => {
            let result = resolve_config(
                config.as_deref(),
                suffix,
                precision,
                no_tex_coord_varying,
                allow_missing_entry,
            )
            .map_err(CliError::from)
            .and_then(|config| {
                let args = RewriteArgs {
                    config,
                    emit,
                    output,
                    source,
                    json,
                    diag_opts: DiagnosticOptions {
                        color: !no_color && !json,
                    },
                };
                rewrite(&input, args)
            });
            (result, json)
        }
        Commands::Dump { input } => {
            let result = read_unit(&input)
                .map(|unit| print!("{}", dump_tree(&unit.tree)))
                .map_err(CliError::from);
            (result, false)
        }
    };

    match result {
        Ok(()) => {}
        Err(CliError::Reported) => process::exit(1),
        Err(CliError::Message(e)) => {
            if json {
                // Keep stderr a single JSON stream.
                let msg = serde_json::json!({
                    "code": "C0001",
                    "severity": "error",
                    "message": e,
                    "file": "",
                    "spans": [],
                });
                eprintln!("{}", msg);
            } else {
                eprintln!("error: {}", e);
            }
            process::exit(1);
        }
    }
}

/// Start from the config file (or defaults) and apply command-line overrides.
fn resolve_config(
    path: Option<&Path>,
    suffix: Option<String>,
    precision: Option<Precision>,
    no_tex_coord_varying: bool,
    allow_missing_entry: bool,
) -> Result<RewriteConfig, String> {
    let mut config = match path {
        Some(path) => RewriteConfig::from_file(path)?,
        None => RewriteConfig::new("", Precision::High),
    };
    if let Some(suffix) = suffix {
        config.hidden_symbol_suffix = suffix;
    }
    if let Some(precision) = precision {
        config.alias_precision = precision;
    }
    if no_tex_coord_varying {
        config.declare_tex_coord_varying = false;
    }
    if allow_missing_entry {
        config.require_entry_function = false;
    }
    Ok(config)
}

fn read_unit(path: &Path) -> Result<ShaderUnit, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse shader unit '{}': {}", path.display(), e))
}

/// Execute the rewrite pipeline: read unit -> rewrite -> emit.
fn rewrite(input: &Path, args: RewriteArgs) -> Result<(), CliError> {
    let mut unit = read_unit(input)?;
    log::debug!(
        "loaded {} nodes from '{}'",
        unit.tree.node_count(),
        input.display()
    );

    let mut rewriter = Rewriter::new(&mut unit.tree, &unit.symbols, args.config);
    let report = match rewriter.rewrite() {
        Ok(report) => report,
        Err(err) => {
            report_error(&err, args.source.as_deref(), args.json, &args.diag_opts)?;
            if args.json {
                return Err(CliError::Reported);
            }
            return Err(CliError::Message("rewrite failed".to_string()));
        }
    };
    log::info!(
        "redirected {} output reference(s), composed {} entry function(s)",
        report.renamed_references,
        report.entry_functions
    );

    let text = match args.emit {
        Emit::Ir => dump_tree(&unit.tree),
        Emit::Json => {
            let mut json = serde_json::to_string_pretty(&unit)
                .map_err(|e| format!("Failed to serialize shader unit: {}", e))?;
            json.push('\n');
            json
        }
    };

    match &args.output {
        Some(path) => std::fs::write(path, text)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e).into()),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn report_error(
    err: &RewriteError,
    source: Option<&Path>,
    json: bool,
    opts: &DiagnosticOptions,
) -> Result<(), String> {
    let source_text = match source {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?,
        None => String::new(),
    };

    if json {
        let spans: Vec<_> = err
            .span()
            .map(|span| serde_json::json!({ "start": span.start, "end": span.end }))
            .into_iter()
            .collect();
        let msg = serde_json::json!({
            "code": error_code(err),
            "severity": "error",
            "message": err.to_string(),
            "file": source.map(|p| p.display().to_string()).unwrap_or_default(),
            "spans": spans,
        });
        eprintln!("{}", msg);
    } else {
        eprint!("{}", render_diagnostic(err, &source_text, opts));
    }
    Ok(())
}
