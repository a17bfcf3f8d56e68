use crate::declaration::{DeclarationRecord, SourceDeclarations};
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use syn::{Attribute, Expr, ExprLit, ImplItem, Item, Lit, Meta, Type, Visibility};

/// Collects documented public declarations from Rust source files.
///
/// The `DeclarationCollector` parses a file with `syn` and produces one
/// [`DeclarationRecord`] per public type, public free function and public
/// inherent method, in the order they are declared. Items of inline `mod`
/// blocks are collected where the block appears.
///
/// # Example
///
/// ```
/// use openapi_from_comments::collector::DeclarationCollector;
/// use std::path::Path;
///
/// let source = "/// A greeting\npub struct Message;\n";
/// let collected = DeclarationCollector::collect_source(Path::new("lib.rs"), source).unwrap();
/// assert_eq!(collected.declarations[0].name, "Message");
/// assert_eq!(collected.declarations[0].doc, "A greeting");
/// ```
pub struct DeclarationCollector;

impl DeclarationCollector {
    /// Reads and collects a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust
    /// syntax.
    pub fn collect_file(path: &Path) -> Result<SourceDeclarations> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Self::collect_source(path, &content)
    }

    /// Collects declarations from source text attributed to `path`.
    pub fn collect_source(path: &Path, source: &str) -> Result<SourceDeclarations> {
        debug!("Collecting declarations from {}", path.display());

        let syntax_tree = syn::parse_file(source)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        let mut declarations = Vec::new();
        collect_items(&syntax_tree.items, &mut declarations);

        debug!(
            "Collected {} declarations from {}",
            declarations.len(),
            path.display()
        );
        Ok(SourceDeclarations::new(path, declarations))
    }

    /// Collects every file, stopping at the first failure.
    ///
    /// A file that cannot be parsed would silently drop its fragments from
    /// the document, so it fails the whole run.
    pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<SourceDeclarations>> {
        debug!("Collecting declarations from {} files", paths.len());
        paths.iter().map(|path| Self::collect_file(path)).collect()
    }
}

fn collect_items(items: &[Item], out: &mut Vec<DeclarationRecord>) {
    for item in items {
        match item {
            Item::Struct(s) if is_public(&s.vis) => {
                out.push(DeclarationRecord::new_type(s.ident.to_string(), doc_text(&s.attrs)))
            }
            Item::Enum(e) if is_public(&e.vis) => {
                out.push(DeclarationRecord::new_type(e.ident.to_string(), doc_text(&e.attrs)))
            }
            Item::Union(u) if is_public(&u.vis) => {
                out.push(DeclarationRecord::new_type(u.ident.to_string(), doc_text(&u.attrs)))
            }
            Item::Type(t) if is_public(&t.vis) => {
                out.push(DeclarationRecord::new_type(t.ident.to_string(), doc_text(&t.attrs)))
            }
            Item::Trait(t) if is_public(&t.vis) => {
                out.push(DeclarationRecord::new_type(t.ident.to_string(), doc_text(&t.attrs)))
            }
            Item::Fn(f) if is_public(&f.vis) => out.push(DeclarationRecord::new_function(
                f.sig.ident.to_string(),
                doc_text(&f.attrs),
            )),
            Item::Impl(imp) if imp.trait_.is_none() => {
                let Some(owner) = type_name(&imp.self_ty) else {
                    continue;
                };
                for impl_item in &imp.items {
                    if let ImplItem::Fn(method) = impl_item {
                        if is_public(&method.vis) {
                            out.push(DeclarationRecord::new_method(
                                owner.clone(),
                                method.sig.ident.to_string(),
                                doc_text(&method.attrs),
                            ));
                        }
                    }
                }
            }
            Item::Mod(m) => {
                if let Some((_, content)) = &m.content {
                    collect_items(content, out);
                }
            }
            _ => {}
        }
    }
}

fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

/// Last path segment of an impl's self type (`Foo` for `models::Foo<T>`)
fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        Type::Group(group) => type_name(&group.elem),
        Type::Paren(paren) => type_name(&paren.elem),
        _ => None,
    }
}

/// Joins the `#[doc = "..."]` attributes of an item.
///
/// `///` comments become one attribute per line with a leading space, which
/// is removed so that indentation inside the comment is preserved as written.
fn doc_text(attrs: &[Attribute]) -> String {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        let Meta::NameValue(name_value) = &attr.meta else {
            continue;
        };
        if let Expr::Lit(ExprLit {
            lit: Lit::Str(text), ..
        }) = &name_value.value
        {
            let text = text.value();
            for line in text.split('\n') {
                let line = line.strip_suffix('\r').unwrap_or(line);
                lines.push(line.strip_prefix(' ').unwrap_or(line).to_string());
            }
        }
    }
    lines.join("\n")
}
