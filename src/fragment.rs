//! Conversion of YAML fragment markup into JSON value trees.
//!
//! OpenAPI documents are JSON-shaped, but YAML allows things JSON does not:
//! non-string mapping keys (`200:` is an integer), tags, and non-finite floats.
//! Scalar keys are stringified; anything else is rejected.

use log::debug;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

/// Error produced while decoding a fragment
#[derive(Debug)]
pub enum FragmentError {
    /// The markup is not well-formed YAML
    Yaml(serde_yaml::Error),
    /// A mapping key is not a scalar
    UnsupportedKey(String),
    /// A float has no JSON representation (NaN or infinity)
    NonFiniteNumber(f64),
}

impl std::fmt::Display for FragmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FragmentError::Yaml(e) => write!(f, "invalid YAML: {}", e),
            FragmentError::UnsupportedKey(key) => {
                write!(f, "mapping key {} cannot be used as a JSON object key", key)
            }
            FragmentError::NonFiniteNumber(n) => {
                write!(f, "number {} cannot be represented in JSON", n)
            }
        }
    }
}

impl std::error::Error for FragmentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FragmentError::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for FragmentError {
    fn from(err: serde_yaml::Error) -> Self {
        FragmentError::Yaml(err)
    }
}

/// Decodes a normalized YAML block into a JSON value tree.
///
/// An empty block decodes to [`Value::Null`].
pub fn decode(markup: &str) -> Result<Value, FragmentError> {
    debug!("Decoding fragment of {} bytes", markup.len());
    let yaml: YamlValue = serde_yaml::from_str(markup)?;
    yaml_to_json(yaml)
}

fn yaml_to_json(value: YamlValue) -> Result<Value, FragmentError> {
    match value {
        YamlValue::Null => Ok(Value::Null),
        YamlValue::Bool(b) => Ok(Value::Bool(b)),
        YamlValue::Number(n) => number_to_json(&n),
        YamlValue::String(s) => Ok(Value::String(s)),
        YamlValue::Sequence(items) => items
            .into_iter()
            .map(yaml_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                object.insert(key_to_string(&key)?, yaml_to_json(value)?);
            }
            Ok(Value::Object(object))
        }
        // Tags carry no meaning for OpenAPI, keep the tagged value
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn number_to_json(n: &serde_yaml::Number) -> Result<Value, FragmentError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Number(i.into()));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::Number(u.into()));
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or(FragmentError::NonFiniteNumber(f))
}

fn key_to_string(key: &YamlValue) -> Result<String, FragmentError> {
    match key {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => key_to_string(&tagged.value),
        other => Err(FragmentError::UnsupportedKey(format!("{:?}", other))),
    }
}
