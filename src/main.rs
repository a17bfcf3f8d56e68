//! OpenAPI from comments - Command-line tool for generating OpenAPI documents.
//!
//! Scans a Rust project for doc comments that start with `@openapi`, merges
//! the YAML below the marker into a base definition, validates the result and
//! writes it out as YAML or JSON.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-comments [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML from a base definition:
//! ```bash
//! openapi-from-comments ./my-api -b base.yaml -o openapi.yaml
//! ```
//!
//! Generate JSON without validation:
//! ```bash
//! openapi-from-comments ./my-api -f json --no-validate
//! ```
//!
//! Skip vendored sources while scanning:
//! ```bash
//! openapi-from-comments ./my-api -e vendor -e generated
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-comments ./my-api -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_comments::cli;

fn main() -> Result<()> {
    // Parse once up front so the verbose flag can configure the logger
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("OpenAPI from comments starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
