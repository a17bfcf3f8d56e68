//! Base definition of the OpenAPI document.
//!
//! The base definition holds the general properties of an API (info, servers,
//! tags, shared components) and seeds the document before any `@openapi`
//! fragment is merged in. It can be built in code or loaded from a YAML or
//! JSON file.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// General properties of an API, combined with the annotated fragments.
///
/// `openapi`, `info.title`, `info.version` and `paths` are always serialized,
/// even when empty, so that validation can report them. Every other empty
/// field is left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiDefinition {
    /// OpenAPI version, e.g. `3.0.0`
    #[serde(default)]
    pub openapi: String,
    /// API info
    #[serde(default)]
    pub info: Info,
    /// Statically declared path items, keyed by path
    #[serde(default)]
    pub paths: BTreeMap<String, Value>,
    /// Security requirements that apply to the whole API
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Servers hosting the API
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Tags with additional metadata
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Additional external documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// Statically declared reusable components
    #[serde(default, skip_serializing_if = "Components::is_empty")]
    pub components: Components,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    #[serde(default)]
    pub title: String,
    /// API version
    #[serde(default)]
    pub version: String,
    /// API description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// OpenAPI Contact object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// OpenAPI License object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Security requirement: scheme name -> required scopes
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// OpenAPI Server object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL
    pub url: String,
    /// Server description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Variables substituted into the URL template
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, ServerVariable>,
}

/// OpenAPI Server Variable object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    pub default: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag name
    pub name: String,
    /// Tag description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

/// OpenAPI External Documentation object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

/// OpenAPI Components object.
///
/// Entries are free-form values keyed by name; they are merged with the
/// component definitions found in annotated comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_bodies: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub callbacks: BTreeMap<String, Value>,
}

impl Components {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.parameters.is_empty()
            && self.security_schemes.is_empty()
            && self.request_bodies.is_empty()
            && self.responses.is_empty()
            && self.headers.is_empty()
            && self.examples.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
    }
}

impl OpenApiDefinition {
    /// Creates a minimal OpenAPI 3.0.0 definition with the given title and version
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: "3.0.0".to_string(),
            info: Info {
                title: title.into(),
                version: version.into(),
                ..Info::default()
            },
            ..Self::default()
        }
    }
}

/// Loads a base definition from a YAML or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not describe a
/// definition.
pub fn load_definition(path: &Path) -> Result<OpenApiDefinition> {
    debug!("Loading base definition from {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read base definition: {}", path.display()))?;

    // YAML is a superset of JSON, one parser covers both
    let definition: OpenApiDefinition = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse base definition: {}", path.display()))?;

    debug!(
        "Loaded base definition '{}' version {}",
        definition.info.title, definition.info.version
    );
    Ok(definition)
}
