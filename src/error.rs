use crate::fragment::FragmentError;
use crate::merge::MergeError;
use crate::validator::ValidationError;
use std::path::PathBuf;

/// Result type alias for document assembly
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a generation run.
///
/// Every variant is fatal: the assembler never returns a partial document
/// alongside one of these.
#[derive(Debug)]
pub enum Error {
    /// An annotated comment is not well-formed YAML
    FragmentDecode {
        declaration: String,
        file: PathBuf,
        source: FragmentError,
    },
    /// A fragment disagrees in kind with the accumulated document
    MergeConflict {
        declaration: String,
        file: PathBuf,
        source: MergeError,
    },
    /// The finished document fails OpenAPI validation
    Validation(ValidationError),
    /// The base definition could not be turned into a value tree
    SerializationError(String),
}

impl Error {
    /// Name of the declaration that caused the error, if any.
    pub fn declaration(&self) -> Option<&str> {
        match self {
            Error::FragmentDecode { declaration, .. } | Error::MergeConflict { declaration, .. } => {
                Some(declaration.as_str())
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::FragmentDecode {
                declaration,
                file,
                source,
            } => write!(
                f,
                "failed to convert OpenAPI definition YAML to JSON for {} ({}): {}",
                declaration,
                file.display(),
                source
            ),
            Error::MergeConflict {
                declaration,
                file,
                source,
            } => write!(
                f,
                "failed to merge OpenAPI definition for {} ({}) into OpenAPI document: {}",
                declaration,
                file.display(),
                source
            ),
            Error::Validation(e) => write!(f, "failed to validate OpenAPI document: {}", e),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FragmentDecode { source, .. } => Some(source),
            Error::MergeConflict { source, .. } => Some(source),
            Error::Validation(e) => Some(e),
            Error::SerializationError(_) => None,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}
