//! Pointer/optional conversions.

use recast_types::{TypeId, TypeKind};

use crate::error::SynthError;
use crate::generator::Generator;
use crate::ops::{addr_of, deref, not_nil, var, Expr, Stmt};
use crate::rules::ConversionRule;

fn pointer_inner(gen: &Generator<'_>, id: TypeId) -> Option<TypeId> {
    match gen.store().kind(id) {
        TypeKind::Pointer(inner) => Some(*inner),
        _ => None,
    }
}

/// Pointer to pointer: guard on nil, convert the pointee, take its
/// address. A nil source normally yields a nil target; under the
/// zero-value-on-inconsistency configuration it yields a pointer to
/// the target pointee's zero value instead.
pub struct PointerToPointer;

impl ConversionRule for PointerToPointer {
    fn name(&self) -> &'static str {
        "pointer-to-pointer"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        pointer_inner(gen, source).is_some() && pointer_inner(gen, target).is_some()
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let source_inner = pointer_inner(gen, source)
            .unwrap_or_else(|| unreachable!("pointer rule matched a non-pointer source"));
        let target_inner = pointer_inner(gen, target)
            .unwrap_or_else(|| unreachable!("pointer rule matched a non-pointer target"));
        let target_ident = gen.store().identity(target);
        let inner_ident = gen.store().identity(target_inner);

        let out = gen.fresh("out");
        let (inner_stmts, converted) =
            gen.convert(deref(source_expr.clone()), source_inner, target_inner)?;
        let tmp = gen.fresh("tmp");
        let mut then = inner_stmts;
        then.push(Stmt::VarDecl { name: tmp.clone(), ty: inner_ident.clone(), init: Some(converted) });
        then.push(Stmt::Assign { lhs: var(&out), rhs: addr_of(var(tmp)) });

        let els = if gen.config().zero_value_on_pointer_inconsistency {
            let zero_tmp = gen.fresh("tmp");
            vec![
                Stmt::VarDecl { name: zero_tmp.clone(), ty: inner_ident, init: None },
                Stmt::Assign { lhs: var(&out), rhs: addr_of(var(zero_tmp)) },
            ]
        } else {
            Vec::new()
        };

        let stmts = vec![
            Stmt::VarDecl { name: out.clone(), ty: target_ident, init: None },
            Stmt::If { cond: not_nil(source_expr), then, els },
        ];
        Ok((stmts, var(out)))
    }
}

/// Pointer source, non-pointer target. Only viable under the
/// zero-value-on-inconsistency configuration: dereference when
/// non-nil, fall back to the target's zero value otherwise. Without
/// that opt-in the pairing stays a hard type mismatch.
pub struct SourcePointer;

impl ConversionRule for SourcePointer {
    fn name(&self) -> &'static str {
        "source-pointer"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        gen.config().zero_value_on_pointer_inconsistency
            && pointer_inner(gen, source).is_some()
            && pointer_inner(gen, target).is_none()
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let source_inner = pointer_inner(gen, source)
            .unwrap_or_else(|| unreachable!("source-pointer rule matched a non-pointer source"));
        let target_ident = gen.store().identity(target);

        let out = gen.fresh("out");
        let (mut then, converted) =
            gen.convert(deref(source_expr.clone()), source_inner, target)?;
        then.push(Stmt::Assign { lhs: var(&out), rhs: converted });

        let stmts = vec![
            Stmt::VarDecl { name: out.clone(), ty: target_ident, init: None },
            Stmt::If { cond: not_nil(source_expr), then, els: Vec::new() },
        ];
        Ok((stmts, var(out)))
    }
}

/// Non-pointer source, pointer target: convert, then take the address
/// of a fresh temporary holding the result.
pub struct TargetPointer;

impl ConversionRule for TargetPointer {
    fn name(&self) -> &'static str {
        "target-pointer"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        pointer_inner(gen, source).is_none() && pointer_inner(gen, target).is_some()
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let target_inner = pointer_inner(gen, target)
            .unwrap_or_else(|| unreachable!("target-pointer rule matched a non-pointer target"));
        let (mut stmts, converted) = gen.convert(source_expr, source, target_inner)?;
        let tmp = gen.fresh("tmp");
        stmts.push(Stmt::VarDecl {
            name: tmp.clone(),
            ty: gen.store().identity(target_inner),
            init: Some(converted),
        });
        Ok((stmts, addr_of(var(tmp))))
    }
}
