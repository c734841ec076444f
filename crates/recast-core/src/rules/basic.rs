//! Identity skip and primitive conversions.

use recast_types::{TypeId, TypeKind};

use crate::error::SynthError;
use crate::generator::Generator;
use crate::ops::{addr_of, cast, var, Expr, Stmt};
use crate::rules::ConversionRule;

/// Identical types with the skip-copy opt-in: a straight pass-through,
/// no recursion. Must run before every structural rule.
pub struct SkipCopy;

impl ConversionRule for SkipCopy {
    fn name(&self) -> &'static str {
        "skip-copy"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        gen.config().skip_copy_same_type
            && gen.store().identity(source) == gen.store().identity(target)
    }

    fn build(
        &self,
        _gen: &mut Generator<'_>,
        source_expr: Expr,
        _source: TypeId,
        _target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        Ok((Vec::new(), source_expr))
    }
}

/// Basic source to pointer-of-basic target: convert the value, park it
/// in a temporary, and take the temporary's address. Runs before the
/// generic pointer rules so the basic path keeps its shape.
pub struct BasicTargetPointer;

impl ConversionRule for BasicTargetPointer {
    fn name(&self) -> &'static str {
        "basic-to-pointer"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        let store = gen.store();
        if !store.is_basic(store.underlying(source)) {
            return false;
        }
        match store.kind(target) {
            TypeKind::Pointer(inner) => store.is_basic(store.underlying(*inner)),
            _ => false,
        }
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let store = gen.store();
        let inner = match store.kind(target) {
            TypeKind::Pointer(inner) => *inner,
            _ => unreachable!("basic-to-pointer matched a non-pointer target"),
        };
        let (mut stmts, converted) = gen.convert(source_expr, source, inner)?;
        let tmp = gen.fresh("tmp");
        stmts.push(Stmt::VarDecl {
            name: tmp.clone(),
            ty: gen.store().identity(inner),
            init: Some(converted),
        });
        Ok((stmts, addr_of(var(tmp))))
    }
}

/// Same primitive kind on both sides: pass the handle through, or emit
/// an explicit cast when either side is a distinct named primitive.
pub struct BasicToBasic;

impl ConversionRule for BasicToBasic {
    fn name(&self) -> &'static str {
        "basic-to-basic"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        let store = gen.store();
        let source_kind = match store.kind(store.underlying(source)) {
            TypeKind::Basic(kind) => *kind,
            _ => return false,
        };
        let target_kind = match store.kind(store.underlying(target)) {
            TypeKind::Basic(kind) => *kind,
            _ => return false,
        };
        if source_kind != target_kind {
            return false;
        }
        // A named primitive on either side needs an explicit cast,
        // which the caller can disallow.
        gen.store().identity(source) == gen.store().identity(target)
            || gen.config().use_underlying_basic
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let store = gen.store();
        let source_ident = store.identity(source);
        let target_ident = store.identity(target);
        if source_ident == target_ident {
            Ok((Vec::new(), source_expr))
        } else {
            Ok((Vec::new(), cast(target_ident, source_expr)))
        }
    }
}
