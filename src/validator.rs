//! Validation of finished OpenAPI 3.0 documents.
//!
//! The assembler only sees the [`SchemaValidator`] trait: a document either
//! passes or fails with a message. [`OpenApiSchemaValidator`] checks the
//! document against the published OpenAPI 3.0 JSON Schema, bundled with the
//! crate, and adds the rules a JSON Schema cannot express: unique
//! `operationId`s and tag names, component identifiers, and local `$ref`s that
//! resolve.

use log::debug;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// OpenAPI 3.0 schema (2021-09-28 revision), draft-04
const OPENAPI_3_0_SCHEMA: &str = include_str!("../schemas/openapi-3.0.json");

/// Diagnostic returned by a failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefixes the message with the enclosing location, kin-openapi style
    fn within(self, location: impl std::fmt::Display) -> Self {
        Self {
            message: format!("invalid {}: {}", location, self.message),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "OpenAPI document validation failed: {}", self.message)
    }
}

impl std::error::Error for ValidationError {}

type Result<T> = std::result::Result<T, ValidationError>;

/// Checks a finished document against the target schema's rules.
pub trait SchemaValidator {
    fn validate(&self, document: &Value) -> Result<()>;
}

/// Operation keys of an OpenAPI path item
const OPERATION_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Component sections whose entries are keyed by name
const COMPONENT_SECTIONS: [&str; 9] = [
    "schemas",
    "parameters",
    "securitySchemes",
    "requestBodies",
    "responses",
    "headers",
    "examples",
    "links",
    "callbacks",
];

/// Keys holding user data rather than OpenAPI objects
const LITERAL_KEYS: [&str; 4] = ["example", "default", "enum", "value"];

/// Keys holding maps from user-chosen names to OpenAPI objects
const NAMED_MAP_KEYS: [&str; 14] = [
    "paths",
    "properties",
    "schemas",
    "parameters",
    "securitySchemes",
    "requestBodies",
    "responses",
    "headers",
    "examples",
    "links",
    "callbacks",
    "content",
    "encoding",
    "variables",
];

/// Validator for OpenAPI 3.0 documents backed by the official JSON Schema.
///
/// The `openapi` version and the `info` object are checked before the schema
/// so that an empty base definition is reported the way kin-openapi reports
/// it (`value of openapi must be a non-empty string`).
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenApiSchemaValidator;

impl OpenApiSchemaValidator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaValidator for OpenApiSchemaValidator {
    fn validate(&self, document: &Value) -> Result<()> {
        debug!("Validating OpenAPI document");

        let root = document
            .as_object()
            .ok_or_else(|| ValidationError::new("document must be an object"))?;

        non_empty_str(root, "openapi")?;
        validate_info(root.get("info")).map_err(|e| e.within("info"))?;
        validate_against_schema(document)?;

        if let Some(paths) = root.get("paths") {
            validate_operation_ids(paths).map_err(|e| e.within("paths"))?;
        }
        if let Some(tags) = root.get("tags") {
            validate_tag_names(tags).map_err(|e| e.within("tags"))?;
        }
        if let Some(components) = root.get("components") {
            validate_component_names(components).map_err(|e| e.within("components"))?;
        }
        validate_references(document, document)?;

        debug!("OpenAPI document is valid");
        Ok(())
    }
}

fn compile_schema() -> Result<jsonschema::Validator> {
    let schema: Value = serde_json::from_str(OPENAPI_3_0_SCHEMA).map_err(|e| {
        ValidationError::new(format!("bundled OpenAPI schema is not valid JSON: {}", e))
    })?;
    jsonschema::validator_for(&schema).map_err(|e| {
        ValidationError::new(format!("bundled OpenAPI schema does not compile: {}", e))
    })
}

/// Reports the first schema violation, located by its JSON pointer
fn validate_against_schema(document: &Value) -> Result<()> {
    let schema = compile_schema()?;
    let mut violations = schema.iter_errors(document);

    let Some(first) = violations.next() else {
        return Ok(());
    };
    let location = first.instance_path.to_string();
    let error = ValidationError::new(first.to_string());

    let remaining = violations.count();
    if remaining > 0 {
        debug!("{} further schema violations not reported", remaining);
    }

    if location.is_empty() {
        Err(error)
    } else {
        Err(error.within(location))
    }
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    match object.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ValidationError::new(format!(
            "value of {} must be a non-empty string",
            field
        ))),
    }
}

fn validate_info(info: Option<&Value>) -> Result<()> {
    let info = info
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::new("must be an object"))?;
    non_empty_str(info, "title")?;
    non_empty_str(info, "version")?;
    Ok(())
}

fn validate_operation_ids(paths: &Value) -> Result<()> {
    let Some(paths) = paths.as_object() else {
        return Ok(());
    };
    let mut operation_ids = HashSet::new();

    for item in paths.values() {
        for method in OPERATION_METHODS {
            let Some(id) = item
                .get(method)
                .and_then(|operation| operation.get("operationId"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            if !operation_ids.insert(id) {
                return Err(ValidationError::new(format!(
                    "operations must have unique operationId, found duplicate {:?}",
                    id
                )));
            }
        }
    }
    Ok(())
}

fn validate_tag_names(tags: &Value) -> Result<()> {
    let mut names = HashSet::new();
    for name in tags
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|tag| tag.get("name").and_then(Value::as_str))
    {
        if !names.insert(name) {
            return Err(ValidationError::new(format!("tag {:?} is duplicated", name)));
        }
    }
    Ok(())
}

fn validate_component_names(components: &Value) -> Result<()> {
    for section in COMPONENT_SECTIONS {
        let Some(entries) = components.get(section).and_then(Value::as_object) else {
            continue;
        };
        for name in entries.keys() {
            if !is_component_identifier(name) {
                return Err(ValidationError::new(format!(
                    "identifier {:?} is not supported by OpenAPIv3 standard (charset: [a-zA-Z0-9.\\-_])",
                    name
                ))
                .within(section));
            }
        }
    }
    Ok(())
}

fn is_component_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Checks that every local `$ref` points into the document.
///
/// Example payloads, defaults, enums and extensions are data and are not
/// walked. Entries of name-keyed maps (`properties`, component sections,
/// `responses`, ...) are walked, but the map itself is never a reference, so a
/// property literally named `$ref` is fine.
fn validate_references(document: &Value, value: &Value) -> Result<()> {
    match value {
        Value::Object(object) => {
            if let Some(reference) = object.get("$ref") {
                check_reference(document, reference)?;
            }
            for (key, child) in object {
                if LITERAL_KEYS.contains(&key.as_str()) || key.starts_with("x-") {
                    continue;
                }
                match child.as_object() {
                    Some(entries) if NAMED_MAP_KEYS.contains(&key.as_str()) => entries
                        .values()
                        .try_for_each(|entry| validate_references(document, entry))?,
                    _ => validate_references(document, child)?,
                }
            }
            Ok(())
        }
        Value::Array(items) => items
            .iter()
            .try_for_each(|child| validate_references(document, child)),
        _ => Ok(()),
    }
}

fn check_reference(document: &Value, reference: &Value) -> Result<()> {
    let reference = reference
        .as_str()
        .ok_or_else(|| ValidationError::new("value of $ref must be a string"))?;
    if let Some(pointer) = reference.strip_prefix('#') {
        if document.pointer(pointer).is_none() {
            return Err(ValidationError::new(format!(
                "unresolved reference {:?}",
                reference
            )));
        }
    }
    Ok(())
}
