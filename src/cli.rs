use crate::assembler::DocumentAssembler;
use crate::collector::DeclarationCollector;
use crate::definition::{load_definition, OpenApiDefinition};
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Title used when no base definition file is given
pub const DEFAULT_TITLE: &str = "Generated API";
/// API version used when no base definition file is given
pub const DEFAULT_VERSION: &str = "1.0.0";

/// OpenAPI from comments - Generate an OpenAPI 3 document from `@openapi` doc comments
#[derive(Parser, Debug)]
#[command(name = "openapi-from-comments")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Base definition (YAML or JSON) holding info, servers, tags and static components
    #[arg(short = 'b', long = "base", value_name = "FILE")]
    pub base_path: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Directory name to skip while scanning, in addition to `target` (repeatable)
    #[arg(short = 'e', long = "exclude", value_name = "DIR")]
    pub excluded_dirs: Vec<String>,

    /// Skip OpenAPI validation of the merged document
    #[arg(long = "no-validate")]
    pub no_validate: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    if let Some(ref base) = args.base_path {
        if !base.is_file() {
            anyhow::bail!("Base definition file does not exist: {}", base.display());
        }
    }

    info!("Project path: {}", args.project_path.display());
    match args.base_path {
        Some(ref base) => info!("Base definition: {}", base.display()),
        None => info!("Base definition: default ({} {})", DEFAULT_TITLE, DEFAULT_VERSION),
    }
    if !args.excluded_dirs.is_empty() {
        info!("Excluded directories: {}", args.excluded_dirs.join(", "));
    }
    info!("Output format: {:?}", args.output_format);
    match args.output_path {
        Some(ref output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
    if args.no_validate {
        info!("Validation: disabled");
    }

    Ok(args)
}

/// Generates the OpenAPI document for the project under `root`.
///
/// Scans `root` for Rust sources, collects their documented declarations and
/// merges every `@openapi` comment into `base`. When `validate` is set the
/// result must pass OpenAPI validation.
///
/// # Errors
///
/// Returns an error if a source file cannot be read or parsed, or if
/// assembly fails (see [`DocumentAssembler::assemble`]).
pub fn generate_document(root: &Path, base: &OpenApiDefinition, validate: bool) -> Result<Value> {
    generate_with_scanner(&FileScanner::new(root.to_path_buf()), base, validate)
}

/// Same as [`generate_document`], with a caller-configured scanner.
pub fn generate_with_scanner(
    scanner: &FileScanner,
    base: &OpenApiDefinition,
    validate: bool,
) -> Result<Value> {
    info!("Scanning project directory...");
    let scan_result = scanner.scan()?;
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    info!("Found {} Rust files", scan_result.rust_files.len());

    info!("Collecting documented declarations...");
    let sources = DeclarationCollector::collect_files(&scan_result.rust_files)?;
    let declaration_count: usize = sources.iter().map(|s| s.declarations.len()).sum();
    info!("Collected {} declarations", declaration_count);

    info!("Assembling OpenAPI document...");
    let document = DocumentAssembler::new()
        .validate(validate)
        .assemble(base, &sources)?;

    Ok(document)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let base = match &args.base_path {
        Some(path) => load_definition(path)?,
        None => OpenApiDefinition::new(DEFAULT_TITLE, DEFAULT_VERSION),
    };

    let scanner = args
        .excluded_dirs
        .iter()
        .fold(FileScanner::new(args.project_path.clone()), |scanner, dir| {
            scanner.exclude_dir(dir.as_str())
        });
    let document = generate_with_scanner(&scanner, &base, !args.no_validate)?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
