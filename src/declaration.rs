//! Declaration records handed from source collection to the assembler.

use std::fmt;
use std::path::PathBuf;

/// Kind of documented declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// A public type (struct, enum, union, type alias or trait)
    Type,
    /// A public free function
    Function,
    /// A public method of an inherent `impl` block
    Method,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationKind::Type => f.write_str("type"),
            DeclarationKind::Function => f.write_str("function"),
            DeclarationKind::Method => f.write_str("method"),
        }
    }
}

/// One documented declaration and its raw documentation text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRecord {
    pub kind: DeclarationKind,
    pub name: String,
    /// Owning type name, set only for methods
    pub owner: Option<String>,
    /// Documentation with comment leaders already stripped
    pub doc: String,
}

impl DeclarationRecord {
    pub fn new_type(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            kind: DeclarationKind::Type,
            name: name.into(),
            owner: None,
            doc: doc.into(),
        }
    }

    pub fn new_function(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            kind: DeclarationKind::Function,
            name: name.into(),
            owner: None,
            doc: doc.into(),
        }
    }

    pub fn new_method(
        owner: impl Into<String>,
        name: impl Into<String>,
        doc: impl Into<String>,
    ) -> Self {
        Self {
            kind: DeclarationKind::Method,
            name: name.into(),
            owner: Some(owner.into()),
            doc: doc.into(),
        }
    }

    /// `Type::method` for methods, the plain name otherwise
    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}::{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for DeclarationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.qualified_name())
    }
}

/// Declarations of one source file, in declared order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDeclarations {
    pub path: PathBuf,
    pub declarations: Vec<DeclarationRecord>,
}

impl SourceDeclarations {
    pub fn new(path: impl Into<PathBuf>, declarations: Vec<DeclarationRecord>) -> Self {
        Self {
            path: path.into(),
            declarations,
        }
    }
}
