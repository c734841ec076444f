//! Shape descriptors for the recast synthesizer.
//!
//! Defines `TypeKind`, the tagged union describing a value's shape, plus
//! `BasicKind` for primitive leaves and `QualifiedName` for named-type
//! identity. Descriptors are built once per distinct type, stored in a
//! [`TypeStore`](crate::store::TypeStore), and referenced by `TypeId`
//! afterwards; they are never mutated once filled.

use std::fmt;

use serde::Serialize;

use crate::store::TypeId;

/// A primitive value kind.
///
/// Two basics are directly convertible only when their kinds are equal;
/// everything else goes through an explicit cast or a registered routine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    /// Alias-like byte kind; distinct from `Uint8` for identity.
    Byte,
    /// Alias-like rune kind; distinct from `Int32` for identity.
    Rune,
}

impl BasicKind {
    /// The canonical spelling used in identities and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::String => "string",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
        }
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The qualified identity of a named type, e.g. `models.Person`.
///
/// The `package` segment is used for identity and display; an empty
/// package means the type lives in the root scope and displays bare.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct QualifiedName {
    pub package: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        QualifiedName { package: package.into(), name: name.into() }
    }

    /// A name with no package qualifier.
    pub fn bare(name: impl Into<String>) -> Self {
        QualifiedName { package: String::new(), name: name.into() }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// One field of a struct shape. Field order is declaration order and is
/// preserved by synthesis.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Field { name: name.into(), ty }
    }
}

/// The shape of a value.
///
/// Exactly one variant describes any given type. `Named` wraps another
/// shape and carries the qualified identity used for signature hashing;
/// identity never recurses through a `Named` node, which is what keeps
/// self-referential shapes (a tree node pointing at itself) finite.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    /// A primitive leaf.
    Basic(BasicKind),
    /// A named wrapper around another shape, e.g. `type Age int`.
    Named { name: QualifiedName, underlying: TypeId },
    /// A pointer/optional wrapper.
    Pointer(TypeId),
    /// A sequence; `len` is `Some` for fixed-length arrays.
    List { elem: TypeId, len: Option<usize> },
    /// A key/value mapping.
    Map { key: TypeId, value: TypeId },
    /// An ordered field record.
    Struct { fields: Vec<Field> },
    /// An opaque method-set shape. Only identical interfaces or
    /// registered routines can convert these.
    Interface { methods: Vec<String> },
}
