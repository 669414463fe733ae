//! # protoschema
//!
//! Generate `.proto` schema files from Rust types deriving `ProtoSchema`.
//!
//! ## Usage
//!
//! ```bash
//! # Generate protos for the project in the current directory
//! protoschema generate
//!
//! # Write below a specific directory
//! protoschema generate --output ./target/proto
//!
//! # Regenerate on every change
//! protoschema generate --watch
//!
//! # Preview without writing
//! protoschema generate --dry-run
//!
//! # Write a commented protoschema.toml
//! protoschema init
//!
//! # Fail when files on disk are stale
//! protoschema validate --path ./proto
//!
//! # List the process ids of the model types
//! protoschema ids
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use protoschema_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::{CliError, ParseError},
    generator::SchemaGenerator,
    parser::{ParsedType, RustParser},
    scanner::SourceScanner,
    watcher::{FileWatcher, WatchEvent},
    writer::{CheckResult, FileWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "protoschema")]
#[command(author, version, about = "Generate protobuf schemas from Rust types", long_about = None)]
struct Cli {
    /// Log engine decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate .proto files from Rust source files
    Generate {
        /// Input directory containing Rust source files
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Output directory for generated .proto files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Watch for file changes and regenerate
        #[arg(short, long)]
        watch: bool,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Filter source files by path pattern (glob)
        #[arg(long)]
        filter: Option<String>,

        /// Crate name the type keys start with
        #[arg(long)]
        crate_name: Option<String>,

        /// Proto syntax: proto2 or proto3
        #[arg(long)]
        syntax: Option<String>,
    },

    /// Initialize a new protoschema configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate that generated .proto files are up-to-date
    Validate {
        /// Directory holding the generated files
        #[arg(short, long)]
        path: PathBuf,

        /// Input directory containing Rust source files
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the process ids referenced by the model types
    Ids {
        /// Input directory containing Rust source files
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            match e {
                CliError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// Install the log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            input,
            output,
            watch,
            dry_run,
            config,
            filter,
            crate_name,
            syntax,
        } => {
            let args = CliArgs {
                output,
                crate_name,
                syntax,
            };
            let config = load_config(config.as_deref(), &args)?;
            if watch {
                run_watch_mode(&input, &config, filter.as_deref(), dry_run)
            } else {
                run_generate(&input, &config, filter.as_deref(), dry_run)
            }
        }

        Commands::Init { output, force } => cmd_init(output, force),

        Commands::Validate {
            path,
            input,
            config,
        } => cmd_validate(path, input, config),

        Commands::Ids { input, config } => cmd_ids(input, config),
    }
}

fn load_config(path: Option<&Path>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::merge_cli_args(ConfigManager::load(path)?, args);
    config.syntax()?;
    Ok(config)
}

/// Scan and parse the sources below `input`. Parse errors are fatal.
///
/// Returns the number of scanned files along with the derived types.
fn collect_types(
    input: &Path,
    config: &Config,
    filter: Option<&str>,
) -> Result<(usize, Vec<ParsedType>), CliError> {
    let mut scanner = SourceScanner::new(input);
    if let Some(pattern) = filter {
        scanner = scanner.with_filter(pattern)?;
    }
    let files = scanner.scan_allow_empty()?;

    let parser = RustParser::new(config.crate_name_for(input));
    let (types, errors) = parser.parse_files(&files);
    if let Some(error) = ParseError::collect(errors) {
        return Err(error.into());
    }
    Ok((files.len(), types))
}

/// Run generation once.
fn run_generate(input: &Path, config: &Config, filter: Option<&str>, dry_run: bool) -> Result<(), CliError> {
    println!("{}", "Scanning for Rust source files...".cyan());
    let (files, types) = collect_types(input, config, filter)?;
    if files == 0 {
        println!("{}", "No Rust files found.".yellow());
    } else {
        println!("  Found {} Rust file(s)", files.to_string().green());
    }

    if types.is_empty() && config.input.descriptors.is_empty() {
        println!("{}", "No types with #[derive(ProtoSchema)] found.".yellow());
        return Ok(());
    }
    println!("  Found {} type(s) with ProtoSchema", types.len().to_string().green());

    println!("{}", "Generating proto schemas...".cyan());
    let output = SchemaGenerator::new(config.clone()).generate(&types)?;
    println!(
        "  {} model type(s), {} data type(s)",
        output.model_types.len().to_string().green(),
        output.data_types.len().to_string().green()
    );

    if output.is_empty() {
        println!("{}", "Nothing to write: no model type carries a reference.".yellow());
        return Ok(());
    }

    let writer = FileWriter::new(&config.output.dir, dry_run);
    for result in writer.write_all(&output.artifacts)? {
        match result {
            WriteResult::Written { path, bytes } => {
                println!("{} Written {} bytes to {}", "✓".green(), bytes, path.display());
            }
            WriteResult::Unchanged { path } => {
                println!("{} Unchanged {}", "✓".green(), path.display());
            }
            WriteResult::DryRun { content, path } => {
                println!("{} Would write to {}:", "[dry-run]".yellow(), path.display());
                println!("{}", "─".repeat(60).dimmed());
                println!("{}", content);
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    Ok(())
}

/// Run in watch mode.
fn run_watch_mode(input: &Path, config: &Config, filter: Option<&str>, dry_run: bool) -> Result<(), CliError> {
    println!("{}", "Starting watch mode...".cyan());
    println!("  Watching: {}", input.display());
    println!("  Press Ctrl+C to stop\n");

    if let Err(e) = run_generate(input, config, filter, dry_run) {
        print_error(&e);
    }

    let watcher = FileWatcher::new(input);
    let (_debouncer, rx) = watcher.watch()?;

    println!("\n{}", "Watching for changes...".cyan());

    while let Ok(event) = rx.recv() {
        let paths = match event {
            WatchEvent::Error(message) => {
                println!("{} {}", "Watch error:".red(), message);
                continue;
            }
            WatchEvent::Changed(paths) => paths,
        };

        println!();
        for path in &paths {
            println!("{} {}", "File changed:".cyan(), path.display());
        }

        if let Err(e) = run_generate(input, config, filter, dry_run) {
            print_error(&e);
        }

        println!("\n{}", "Watching for changes...".cyan());
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(format!(
            "Configuration file already exists: {}",
            output.display()
        )));
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;
    println!("{} Created configuration file: {}", "✓".green(), output.display());
    Ok(())
}

/// Validate command implementation.
fn cmd_validate(proto_dir: PathBuf, input: PathBuf, config_path: Option<PathBuf>) -> Result<(), CliError> {
    println!("{}", "Validating proto files...".cyan());

    if !proto_dir.is_dir() {
        return Err(CliError::Validation(format!(
            "Proto directory not found: {}",
            proto_dir.display()
        )));
    }

    let config = load_config(config_path.as_deref(), &CliArgs::default())?;
    let (_, types) = collect_types(&input, &config, None)?;
    let output = SchemaGenerator::new(config).generate(&types)?;

    let results = FileWriter::new(&proto_dir, false).check(&output.artifacts);
    let stale: Vec<&CheckResult> = results.iter().filter(|r| !r.is_up_to_date()).collect();

    if stale.is_empty() {
        println!("{} {} proto file(s) up-to-date", "✓".green(), results.len());
        return Ok(());
    }

    for result in &stale {
        let state = match result {
            CheckResult::Missing(_) => "missing",
            _ => "out of date",
        };
        println!("{} {} ({})", "✗".red(), result.path().display(), state);
    }
    println!("  Run 'protoschema generate' to update");
    Err(CliError::Validation(format!(
        "{} proto file(s) are out of date",
        stale.len()
    )))
}

/// Ids command implementation.
fn cmd_ids(input: PathBuf, config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref(), &CliArgs::default())?;
    let (_, types) = collect_types(&input, &config, None)?;

    for id in SchemaGenerator::new(config).process_ids(&types)? {
        println!("{id}");
    }
    Ok(())
}

fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
