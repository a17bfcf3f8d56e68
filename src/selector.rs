//! Comment selection for `@openapi` annotated documentation.
//!
//! A documentation comment carries an OpenAPI fragment only when its very first
//! line is the marker. The rest of the comment is YAML, which is indentation
//! sensitive, so tabs are expanded before it reaches the converter.

/// The first-line literal that flags a comment as an OpenAPI fragment.
pub const MARKER: &str = "@openapi";

/// Outcome of inspecting one declaration's documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The comment does not start with the marker
    NotAnnotated,
    /// The comment is a fragment; holds the normalized YAML body
    Annotated(String),
}

/// Inspects raw documentation text and extracts the YAML body if annotated.
///
/// The first line, trimmed, must be exactly [`MARKER`]. The marker line is
/// removed and every tab in the remaining text becomes two spaces.
///
/// # Example
///
/// ```
/// use openapi_from_comments::selector::{select, Selection};
///
/// let doc = "@openapi\npaths:\n\t/: {}";
/// assert_eq!(select(doc), Selection::Annotated("paths:\n  /: {}".to_string()));
/// assert_eq!(select("Just a comment"), Selection::NotAnnotated);
/// ```
pub fn select(doc: &str) -> Selection {
    let first_line = doc.lines().next().unwrap_or("");
    if first_line.trim() != MARKER {
        return Selection::NotAnnotated;
    }

    let body = doc.replacen(first_line, "", 1);
    // Drop the line break the marker line leaves behind
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(&body);

    Selection::Annotated(body.replace('\t', "  "))
}
