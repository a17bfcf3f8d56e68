//! Assembly of the OpenAPI document from a base definition and annotated
//! declarations.
//!
//! Merging is last-write-wins at the leaves, so the order fragments are
//! merged in is visible in the output. The assembler fixes that order itself:
//!
//! 1. source files by path;
//! 2. within a file, each type followed by its methods, in declared order;
//! 3. then the free functions, in declared order;
//! 4. then methods whose type is not declared in the file.
//!
//! # Example
//!
//! ```
//! use openapi_from_comments::assembler::DocumentAssembler;
//! use openapi_from_comments::declaration::{DeclarationRecord, SourceDeclarations};
//! use openapi_from_comments::definition::OpenApiDefinition;
//!
//! let base = OpenApiDefinition::new("Hello API", "1.0.0");
//! let sources = vec![SourceDeclarations::new(
//!     "src/models.rs",
//!     vec![DeclarationRecord::new_type(
//!         "Message",
//!         "@openapi\ncomponents:\n  schemas:\n    Message:\n      type: object",
//!     )],
//! )];
//!
//! let document = DocumentAssembler::new().assemble(&base, &sources).unwrap();
//! assert_eq!(document["components"]["schemas"]["Message"]["type"], "object");
//! ```

use crate::declaration::{DeclarationKind, DeclarationRecord, SourceDeclarations};
use crate::definition::OpenApiDefinition;
use crate::error::{Error, Result};
use crate::fragment;
use crate::merge::merge_into;
use crate::selector::{select, Selection};
use crate::validator::{OpenApiSchemaValidator, SchemaValidator};
use log::{debug, info};
use serde_json::Value;
use std::path::Path;

/// Builds one OpenAPI document per call to [`DocumentAssembler::assemble`].
///
/// The assembler holds no document state between runs, so one instance can
/// serve any number of independent generations.
#[derive(Debug, Clone)]
pub struct DocumentAssembler<V = OpenApiSchemaValidator> {
    validator: V,
    validate: bool,
}

impl DocumentAssembler<OpenApiSchemaValidator> {
    /// Creates an assembler that validates with [`OpenApiSchemaValidator`]
    pub fn new() -> Self {
        Self::with_validator(OpenApiSchemaValidator::new())
    }
}

impl Default for DocumentAssembler<OpenApiSchemaValidator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SchemaValidator> DocumentAssembler<V> {
    /// Creates an assembler that validates with a custom validator
    pub fn with_validator(validator: V) -> Self {
        Self {
            validator,
            validate: true,
        }
    }

    /// Enables or disables validation of the finished document
    pub fn validate(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Merges every annotated declaration into the base definition.
    ///
    /// # Errors
    ///
    /// - [`Error::FragmentDecode`] if an annotated comment is not valid YAML
    /// - [`Error::MergeConflict`] if a fragment disagrees in kind with the document
    /// - [`Error::Validation`] if validation is enabled and the document fails it
    ///
    /// No document is returned when any step fails.
    pub fn assemble(
        &self,
        base: &OpenApiDefinition,
        sources: &[SourceDeclarations],
    ) -> Result<Value> {
        let mut document = serde_json::to_value(base)?;
        let mut merged = 0usize;

        for (path, declaration) in visit_order(sources) {
            let markup = match select(&declaration.doc) {
                Selection::NotAnnotated => continue,
                Selection::Annotated(markup) => markup,
            };

            let fragment = fragment::decode(&markup).map_err(|source| Error::FragmentDecode {
                declaration: declaration.to_string(),
                file: path.to_path_buf(),
                source,
            })?;

            if fragment.is_null() {
                debug!("Empty OpenAPI fragment on {}", declaration);
                continue;
            }

            merge_into(&mut document, fragment).map_err(|source| Error::MergeConflict {
                declaration: declaration.to_string(),
                file: path.to_path_buf(),
                source,
            })?;

            debug!(
                "Merged OpenAPI fragment from {} ({})",
                declaration,
                path.display()
            );
            merged += 1;
        }

        info!("Merged {} OpenAPI fragments", merged);

        if self.validate {
            self.validator.validate(&document)?;
            info!("OpenAPI document passed validation");
        }

        Ok(document)
    }
}

/// Assembles a document with the default validator.
pub fn assemble(
    base: &OpenApiDefinition,
    sources: &[SourceDeclarations],
    validate: bool,
) -> Result<Value> {
    DocumentAssembler::new().validate(validate).assemble(base, sources)
}

/// Returns every declaration paired with its file, in merge order.
pub fn visit_order(sources: &[SourceDeclarations]) -> Vec<(&Path, &DeclarationRecord)> {
    let mut files: Vec<&SourceDeclarations> = sources.iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut order = Vec::new();
    for file in files {
        let path = file.path.as_path();
        let declarations = &file.declarations;
        let mut claimed = vec![false; declarations.len()];

        for ty in declarations.iter().filter(|d| d.kind == DeclarationKind::Type) {
            order.push((path, ty));
            for (index, method) in declarations.iter().enumerate() {
                if !claimed[index]
                    && method.kind == DeclarationKind::Method
                    && method.owner.as_deref() == Some(ty.name.as_str())
                {
                    claimed[index] = true;
                    order.push((path, method));
                }
            }
        }

        order.extend(
            declarations
                .iter()
                .filter(|d| d.kind == DeclarationKind::Function)
                .map(|d| (path, d)),
        );

        order.extend(
            declarations
                .iter()
                .enumerate()
                .filter(|(index, d)| d.kind == DeclarationKind::Method && !claimed[*index])
                .map(|(_, d)| (path, d)),
        );
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeError;
    use crate::validator::ValidationError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::Cell;
    use std::error::Error as _;

    fn hello_base() -> OpenApiDefinition {
        OpenApiDefinition::new("Hello API", "1.0.0")
    }

    fn single_file(declarations: Vec<DeclarationRecord>) -> Vec<SourceDeclarations> {
        vec![SourceDeclarations::new("src/lib.rs", declarations)]
    }

    fn names(order: &[(&Path, &DeclarationRecord)]) -> Vec<String> {
        order.iter().map(|(_, d)| d.qualified_name()).collect()
    }

    /// Counts calls and fails with a fixed message
    struct RejectingValidator {
        calls: Cell<usize>,
    }

    impl SchemaValidator for RejectingValidator {
        fn validate(&self, _document: &Value) -> std::result::Result<(), ValidationError> {
            self.calls.set(self.calls.get() + 1);
            Err(ValidationError::new("rejected by policy"))
        }
    }

    #[test]
    fn test_no_annotations_returns_base() {
        let sources = single_file(vec![
            DeclarationRecord::new_type("User", "A user of the system."),
            DeclarationRecord::new_function("list_users", "Lists users.\n@openapi"),
            DeclarationRecord::new_method("User", "name", ""),
        ]);

        let document = assemble(&hello_base(), &sources, true).unwrap();
        assert_eq!(document, serde_json::to_value(hello_base()).unwrap());
    }

    #[test]
    fn test_non_marker_first_line_ignored() {
        let sources = single_file(vec![
            DeclarationRecord::new_type("A", "@openapi-ish\npaths: {}"),
            DeclarationRecord::new_type("B", "About this type\n  @openapi\ninfo:\n  title: Hijacked"),
        ]);

        let document = assemble(&hello_base(), &sources, false).unwrap();
        assert_eq!(document, serde_json::to_value(hello_base()).unwrap());
    }

    #[test]
    fn test_hello_api_end_to_end() {
        let base = OpenApiDefinition {
            openapi: "3.0.0".to_string(),
            ..hello_base()
        };
        let sources = single_file(vec![DeclarationRecord::new_type(
            "Message",
            "@openapi\ncomponents:\n  schemas:\n    Message:\n      type: object\n      properties:\n        content:\n          type: string\n",
        )]);

        let document = assemble(&base, &sources, true).unwrap();
        assert_eq!(
            document,
            json!({
                "openapi": "3.0.0",
                "info": {"title": "Hello API", "version": "1.0.0"},
                "paths": {},
                "components": {"schemas": {"Message": {
                    "type": "object",
                    "properties": {"content": {"type": "string"}}
                }}}
            })
        );
    }

    #[test]
    fn test_empty_openapi_fails_validation() {
        let base = OpenApiDefinition {
            openapi: String::new(),
            ..hello_base()
        };

        let err = assemble(&base, &[], true).unwrap_err();
        match &err {
            Error::Validation(e) => {
                assert_eq!(e.message(), "value of openapi must be a non-empty string")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "failed to validate OpenAPI document: OpenAPI document validation failed: value of openapi must be a non-empty string"
        );
    }

    #[test]
    fn test_validation_disabled_returns_invalid_document() {
        let document = assemble(&OpenApiDefinition::default(), &[], false).unwrap();
        assert_eq!(document["openapi"], "");
    }

    #[test]
    fn test_later_declaration_wins_whole_leaf() {
        let sources = single_file(vec![
            DeclarationRecord::new_type(
                "ErrorResponse",
                "@openapi\ncomponents:\n  schemas:\n    Error:\n      required: [status, error]\n",
            ),
            DeclarationRecord::new_type(
                "ApiError",
                "@openapi\ncomponents:\n  schemas:\n    Error:\n      required: [code]\n",
            ),
        ]);

        let document = assemble(&hello_base(), &sources, true).unwrap();
        assert_eq!(
            document["components"]["schemas"]["Error"],
            json!({"required": ["code"]})
        );
    }

    #[test]
    fn test_conflicting_properties_last_visited_wins() {
        let sources = single_file(vec![
            DeclarationRecord::new_type(
                "First",
                "@openapi\ncomponents:\n  schemas:\n    Error:\n      properties:\n        status:\n          type: string\n",
            ),
            DeclarationRecord::new_type(
                "Second",
                "@openapi\ncomponents:\n  schemas:\n    Error:\n      properties:\n        status:\n          type: integer\n",
            ),
        ]);

        let document = assemble(&hello_base(), &sources, true).unwrap();
        assert_eq!(
            document["components"]["schemas"]["Error"]["properties"]["status"],
            json!({"type": "integer"})
        );
    }

    #[test]
    fn test_disjoint_properties_are_unioned() {
        let sources = single_file(vec![
            DeclarationRecord::new_type(
                "ErrorResponse",
                "@openapi\ncomponents:\n  schemas:\n    Error:\n      type: object\n      properties:\n        status:\n          type: string\n",
            ),
            DeclarationRecord::new_type(
                "ApiError",
                "@openapi\ncomponents:\n  schemas:\n    Error:\n      properties:\n        code:\n          type: integer\n",
            ),
        ]);

        let document = assemble(&hello_base(), &sources, true).unwrap();
        assert_eq!(
            document["components"]["schemas"]["Error"],
            json!({
                "type": "object",
                "properties": {
                    "code": {"type": "integer"},
                    "status": {"type": "string"}
                }
            })
        );
    }

    #[test]
    fn test_merge_conflict_names_declaration() {
        let sources = single_file(vec![
            DeclarationRecord::new_type("Good", "@openapi\npaths:\n  /a:\n    get: {}\n"),
            DeclarationRecord::new_function("bad_handler", "@openapi\npaths:\n  - /b\n"),
        ]);

        let err = assemble(&hello_base(), &sources, false).unwrap_err();
        match &err {
            Error::MergeConflict {
                declaration,
                file,
                source,
            } => {
                assert_eq!(declaration, "function bad_handler");
                assert_eq!(file, Path::new("src/lib.rs"));
                assert!(matches!(source, MergeError::IncompatibleTypes { path, .. } if path == "/paths"));
            }
            other => panic!("expected merge conflict, got {:?}", other),
        }
        assert_eq!(err.declaration(), Some("function bad_handler"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_conflict_with_base_definition() {
        let sources = single_file(vec![DeclarationRecord::new_type(
            "Info",
            "@openapi\ninfo: just a string\n",
        )]);

        let err = assemble(&hello_base(), &sources, false).unwrap_err();
        assert!(matches!(err, Error::MergeConflict { .. }));
        assert!(err.to_string().contains("type Info"));
    }

    #[test]
    fn test_non_object_fragment_conflicts() {
        let sources = single_file(vec![DeclarationRecord::new_type("List", "@openapi\n- a\n- b\n")]);

        let err = assemble(&hello_base(), &sources, false).unwrap_err();
        assert!(matches!(err, Error::MergeConflict { .. }));
    }

    #[test]
    fn test_malformed_fragment_names_declaration() {
        let sources = single_file(vec![DeclarationRecord::new_method(
            "UserService",
            "create",
            "@openapi\npaths:\n  /users: [unclosed\n",
        )]);

        let err = assemble(&hello_base(), &sources, false).unwrap_err();
        assert!(matches!(err, Error::FragmentDecode { .. }));
        assert_eq!(err.declaration(), Some("method UserService::create"));
        assert!(err
            .to_string()
            .starts_with("failed to convert OpenAPI definition YAML to JSON for method UserService::create"));
    }

    #[test]
    fn test_empty_fragment_is_skipped() {
        let sources = single_file(vec![DeclarationRecord::new_type("Empty", "@openapi\n")]);

        let document = assemble(&hello_base(), &sources, true).unwrap();
        assert_eq!(document, serde_json::to_value(hello_base()).unwrap());
    }

    #[test]
    fn test_tabs_in_fragment_are_normalized() {
        let sources = single_file(vec![DeclarationRecord::new_type(
            "Message",
            "@openapi\ncomponents:\n\tschemas:\n\t\tMessage:\n\t\t\ttype: object\n",
        )]);

        let document = assemble(&hello_base(), &sources, true).unwrap();
        assert_eq!(document["components"]["schemas"]["Message"]["type"], "object");
    }

    #[test]
    fn test_custom_validator_is_consulted() {
        let validator = RejectingValidator {
            calls: Cell::new(0),
        };
        let assembler = DocumentAssembler::with_validator(validator);

        let err = assembler.assemble(&hello_base(), &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to validate OpenAPI document: OpenAPI document validation failed: rejected by policy"
        );
        assert_eq!(assembler.validator.calls.get(), 1);
    }

    #[test]
    fn test_custom_validator_skipped_when_disabled() {
        let validator = RejectingValidator {
            calls: Cell::new(0),
        };
        let assembler = DocumentAssembler::with_validator(validator).validate(false);

        assert!(assembler.assemble(&hello_base(), &[]).is_ok());
        assert_eq!(assembler.validator.calls.get(), 0);
    }

    #[test]
    fn test_visit_order_types_methods_then_functions() {
        let sources = single_file(vec![
            DeclarationRecord::new_function("index", ""),
            DeclarationRecord::new_type("User", ""),
            DeclarationRecord::new_method("Order", "total", ""),
            DeclarationRecord::new_method("User", "name", ""),
            DeclarationRecord::new_type("Order", ""),
            DeclarationRecord::new_function("health", ""),
            DeclarationRecord::new_method("User", "email", ""),
        ]);

        assert_eq!(
            names(&visit_order(&sources)),
            vec!["User", "User::name", "User::email", "Order", "Order::total", "index", "health"]
        );
    }

    #[test]
    fn test_visit_order_orphan_methods_last() {
        let sources = single_file(vec![
            DeclarationRecord::new_method("Elsewhere", "run", ""),
            DeclarationRecord::new_function("index", ""),
            DeclarationRecord::new_type("User", ""),
        ]);

        assert_eq!(
            names(&visit_order(&sources)),
            vec!["User", "index", "Elsewhere::run"]
        );
    }

    #[test]
    fn test_visit_order_sorts_files_by_path() {
        let sources = vec![
            SourceDeclarations::new("src/routes.rs", vec![DeclarationRecord::new_function("b", "")]),
            SourceDeclarations::new("src/api/models.rs", vec![DeclarationRecord::new_type("A", "")]),
            SourceDeclarations::new("src/lib.rs", vec![DeclarationRecord::new_function("c", "")]),
        ];

        let order = visit_order(&sources);
        let paths: Vec<&Path> = order.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            paths,
            vec![
                Path::new("src/api/models.rs"),
                Path::new("src/lib.rs"),
                Path::new("src/routes.rs")
            ]
        );
    }

    #[test]
    fn test_file_order_decides_last_write() {
        let fragment = |title: &str| format!("@openapi\ninfo:\n  description: {}\n", title);
        let forward = vec![
            SourceDeclarations::new("a.rs", vec![DeclarationRecord::new_type("A", fragment("from a"))]),
            SourceDeclarations::new("b.rs", vec![DeclarationRecord::new_type("B", fragment("from b"))]),
        ];
        let reversed: Vec<SourceDeclarations> = forward.iter().rev().cloned().collect();

        let first = assemble(&hello_base(), &forward, true).unwrap();
        let second = assemble(&hello_base(), &reversed, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(first["info"]["description"], "from b");
    }
}
