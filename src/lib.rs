//! OpenAPI from comments - an OpenAPI 3 document assembled from doc comments.
//!
//! API definitions live next to the code they describe. Any public type,
//! function or method whose doc comment starts with the line `@openapi` carries
//! a YAML fragment of the OpenAPI document:
//!
//! ```rust,ignore
//! /// @openapi
//! /// components:
//! ///   schemas:
//! ///     Message:
//! ///       type: object
//! ///       properties:
//! ///         content:
//! ///           type: string
//! pub struct Message {
//!     pub content: String,
//! }
//! ```
//!
//! Fragments are deep-merged into a base definition in a fixed order and the
//! result is validated against the OpenAPI 3 structure.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Lists the Rust files of a project in path order
//! 2. [`collector`] - Parses files and collects documented declarations
//! 3. [`selector`] - Picks out `@openapi` comments and normalizes them
//! 4. [`fragment`] - Decodes YAML fragments into JSON values
//! 5. [`merge`] - Deep-merges value trees
//! 6. [`assembler`] - Runs the pipeline over a base [`definition`]
//! 7. [`validator`] - Checks the finished document
//! 8. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_comments::{
//!     cli::generate_document,
//!     definition::OpenApiDefinition,
//!     serializer::serialize_yaml,
//! };
//! use std::path::Path;
//!
//! let base = OpenApiDefinition::new("Hello API", "1.0.0");
//! let document = generate_document(Path::new("./my-project"), &base, true).unwrap();
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod assembler;
pub mod cli;
pub mod collector;
pub mod declaration;
pub mod definition;
pub mod error;
pub mod fragment;
pub mod merge;
pub mod scanner;
pub mod selector;
pub mod serializer;
pub mod validator;
