//! Shape descriptors and conversion signatures for the recast synthesizer.
//!
//! This crate is the leaf of the workspace: it defines how value shapes
//! are described (`TypeKind` in a `TypeStore` arena, referenced by
//! copyable `TypeId`s) and how a (source, target) pair is keyed for
//! routine lookup (`Signature` over canonical identity strings).

pub mod identity;
pub mod kind;
pub mod store;

pub use identity::Signature;
pub use kind::{BasicKind, Field, QualifiedName, TypeKind};
pub use store::{TypeId, TypeStore};
