//! The type store: an append-only arena of shape descriptors.
//!
//! Shapes reference each other through copyable `TypeId` indices rather
//! than owned subtrees, so cyclic shapes (a struct containing a pointer
//! to itself through a named type) are representable without reference
//! cycles. Cycles are built with `reserve` + `fill`: reserve the id for
//! the named node, build the rest of the shape against that id, then
//! fill the slot.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::kind::{BasicKind, Field, QualifiedName, TypeKind};

/// An index into a [`TypeStore`], identifying one distinct shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub u32);

/// Append-only arena of shape descriptors.
///
/// One store serves one generation run; descriptors are immutable once
/// filled and are shared by id everywhere else in the engine.
#[derive(Debug, Default)]
pub struct TypeStore {
    slots: Vec<Option<TypeKind>>,
}

impl TypeStore {
    pub fn new() -> Self {
        TypeStore::default()
    }

    /// Add a fully-built shape and return its id.
    pub fn add(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.slots.len() as u32);
        self.slots.push(Some(kind));
        id
    }

    /// Reserve an id whose shape will be supplied later via [`fill`].
    ///
    /// Required for self-referential shapes: the reserved id can appear
    /// inside the shape that eventually fills it.
    ///
    /// [`fill`]: TypeStore::fill
    pub fn reserve(&mut self) -> TypeId {
        let id = TypeId(self.slots.len() as u32);
        self.slots.push(None);
        id
    }

    /// Fill a reserved slot. Filling an already-filled slot is an
    /// internal contract violation.
    pub fn fill(&mut self, id: TypeId, kind: TypeKind) {
        let slot = &mut self.slots[id.0 as usize];
        debug_assert!(slot.is_none(), "type slot {} filled twice", id.0);
        *slot = Some(kind);
    }

    /// Look up the shape behind an id.
    ///
    /// # Panics
    ///
    /// Panics on a reserved-but-unfilled slot; a descriptor must be
    /// complete before synthesis starts.
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        self.slots[id.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("type slot {} reserved but never filled", id.0))
    }

    // ── Constructor helpers ─────────────────────────────────────────

    pub fn basic(&mut self, kind: BasicKind) -> TypeId {
        self.add(TypeKind::Basic(kind))
    }

    pub fn named(&mut self, name: QualifiedName, underlying: TypeId) -> TypeId {
        self.add(TypeKind::Named { name, underlying })
    }

    pub fn pointer(&mut self, inner: TypeId) -> TypeId {
        self.add(TypeKind::Pointer(inner))
    }

    pub fn list(&mut self, elem: TypeId) -> TypeId {
        self.add(TypeKind::List { elem, len: None })
    }

    pub fn array(&mut self, elem: TypeId, len: usize) -> TypeId {
        self.add(TypeKind::List { elem, len: Some(len) })
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.add(TypeKind::Map { key, value })
    }

    pub fn strukt(&mut self, fields: Vec<Field>) -> TypeId {
        self.add(TypeKind::Struct { fields })
    }

    pub fn interface(&mut self, methods: Vec<String>) -> TypeId {
        self.add(TypeKind::Interface { methods })
    }

    // ── Shape queries ───────────────────────────────────────────────

    pub fn is_basic(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Basic(_))
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Pointer(_))
    }

    /// Unwrap `Named` wrappers until a structural shape is reached.
    /// Returns the id of the base shape (the id itself when unnamed).
    pub fn underlying(&self, id: TypeId) -> TypeId {
        let mut current = id;
        let mut seen = FxHashSet::default();
        while let TypeKind::Named { underlying, .. } = self.kind(current) {
            if !seen.insert(current) {
                // A Named chain that loops back on itself; stop rather
                // than spin. Identity still renders it by name.
                return current;
            }
            current = *underlying;
        }
        current
    }

    /// The qualified name when `id` is a `Named` shape.
    pub fn name_of(&self, id: TypeId) -> Option<&QualifiedName> {
        match self.kind(id) {
            TypeKind::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The fields of a struct shape, looking through `Named` wrappers.
    pub fn struct_fields(&self, id: TypeId) -> Option<&[Field]> {
        match self.kind(self.underlying(id)) {
            TypeKind::Struct { fields } => Some(fields),
            _ => None,
        }
    }

    /// Whether the shape gets its own synthesized routine instead of
    /// inline rule output. Only struct-shaped values do; a named basic
    /// is an inline cast, not a routine.
    pub fn warrants_routine(&self, id: TypeId) -> bool {
        matches!(self.kind(self.underlying(id)), TypeKind::Struct { .. })
    }

    /// Total number of descriptors (filled or reserved).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_read_back() {
        let mut store = TypeStore::new();
        let int = store.basic(BasicKind::Int);
        assert_eq!(store.kind(int), &TypeKind::Basic(BasicKind::Int));
    }

    #[test]
    fn reserve_then_fill_cycle() {
        // type Node struct { next *Node }
        let mut store = TypeStore::new();
        let node = store.reserve();
        let ptr = store.pointer(node);
        let body = store.strukt(vec![Field::new("next", ptr)]);
        store.fill(node, TypeKind::Named { name: QualifiedName::bare("Node"), underlying: body });
        assert!(store.name_of(node).is_some());
        assert_eq!(store.underlying(node), body);
    }

    #[test]
    #[should_panic(expected = "reserved but never filled")]
    fn unfilled_reserved_slot_panics() {
        let mut store = TypeStore::new();
        let id = store.reserve();
        store.kind(id);
    }

    #[test]
    fn underlying_unwraps_named_chain() {
        // type Age int; type Years Age
        let mut store = TypeStore::new();
        let int = store.basic(BasicKind::Int);
        let age = store.named(QualifiedName::bare("Age"), int);
        let years = store.named(QualifiedName::bare("Years"), age);
        assert_eq!(store.underlying(years), int);
    }

    #[test]
    fn only_struct_shapes_warrant_routines() {
        let mut store = TypeStore::new();
        let int = store.basic(BasicKind::Int);
        let age = store.named(QualifiedName::bare("Age"), int);
        let body = store.strukt(vec![Field::new("Value", int)]);
        let wrapper = store.named(QualifiedName::bare("Wrapper"), body);
        assert!(!store.warrants_routine(int));
        assert!(!store.warrants_routine(age));
        assert!(store.warrants_routine(body));
        assert!(store.warrants_routine(wrapper));
    }

    #[test]
    fn struct_fields_through_named() {
        let mut store = TypeStore::new();
        let s = store.basic(BasicKind::String);
        let body = store.strukt(vec![Field::new("Name", s)]);
        let person = store.named(QualifiedName::new("models", "Person"), body);
        let fields = store.struct_fields(person).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Name");
    }
}
