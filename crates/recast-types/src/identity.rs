//! Canonical type identities and conversion signatures.
//!
//! An identity is the canonical spelling of a shape (`*models.Person`,
//! `[]string`, `map[string]int`). Two descriptors denote the same type
//! exactly when their identities are equal, regardless of which store
//! slot they occupy. A `Signature` pairs a source identity with a
//! target identity and is the registry's primary lookup key.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::kind::TypeKind;
use crate::store::{TypeId, TypeStore};

impl TypeStore {
    /// The canonical spelling of a shape.
    ///
    /// `Named` nodes contribute their qualified name and do not recurse
    /// into the underlying shape; that is what makes identities of
    /// cyclic shapes finite. Anonymous cycles (representable only by
    /// misusing `reserve`/`fill`) render as `<cycle>` instead of
    /// recursing forever.
    pub fn identity(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_identity(id, &mut out, &mut FxHashSet::default());
        out
    }

    fn write_identity(&self, id: TypeId, out: &mut String, visiting: &mut FxHashSet<TypeId>) {
        if !visiting.insert(id) {
            out.push_str("<cycle>");
            return;
        }
        match self.kind(id) {
            TypeKind::Basic(kind) => out.push_str(kind.as_str()),
            TypeKind::Named { name, .. } => {
                out.push_str(&name.to_string());
            }
            TypeKind::Pointer(inner) => {
                out.push('*');
                self.write_identity(*inner, out, visiting);
            }
            TypeKind::List { elem, len } => {
                match len {
                    Some(n) => {
                        out.push('[');
                        out.push_str(&n.to_string());
                        out.push(']');
                    }
                    None => out.push_str("[]"),
                }
                self.write_identity(*elem, out, visiting);
            }
            TypeKind::Map { key, value } => {
                out.push_str("map[");
                self.write_identity(*key, out, visiting);
                out.push(']');
                self.write_identity(*value, out, visiting);
            }
            TypeKind::Struct { fields } => {
                out.push_str("struct {");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(';');
                    }
                    out.push(' ');
                    out.push_str(&field.name);
                    out.push(' ');
                    self.write_identity(field.ty, out, visiting);
                }
                out.push_str(" }");
            }
            TypeKind::Interface { methods } => {
                out.push_str("interface {");
                for (i, method) in methods.iter().enumerate() {
                    if i > 0 {
                        out.push(';');
                    }
                    out.push(' ');
                    out.push_str(method);
                }
                out.push_str(" }");
            }
        }
        visiting.remove(&id);
    }
}

/// The (source identity, target identity) pair keying routine lookup.
///
/// Equality is structural: two signatures built from different store
/// slots compare equal when both spellings match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Signature {
    pub source: String,
    pub target: String,
}

impl Signature {
    pub fn of(store: &TypeStore, source: TypeId, target: TypeId) -> Self {
        Signature { source: store.identity(source), target: store.identity(target) }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
