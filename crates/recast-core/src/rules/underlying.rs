//! Underlying-type delegation, the last-resort rule.
//!
//! When no direct rule matches a pair involving named types, but a
//! registered routine exists between their underlying representations,
//! unwrap the source with a cast, delegate, and rewrap the result.

use recast_types::{Signature, TypeId};

use crate::error::SynthError;
use crate::generator::Generator;
use crate::ops::{cast, Expr, Stmt};
use crate::rules::ConversionRule;

pub struct UnderlyingDelegation;

impl ConversionRule for UnderlyingDelegation {
    fn name(&self) -> &'static str {
        "underlying-delegation"
    }

    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool {
        let store = gen.store();
        let source_under = store.underlying(source);
        let target_under = store.underlying(target);
        if source_under == source && target_under == target {
            return false;
        }
        let sig = Signature::of(store, source_under, target_under);
        gen.registry().has_satisfiable(&sig, &gen.available_context())
    }

    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let store = gen.store();
        let source_under = store.underlying(source);
        let target_under = store.underlying(target);
        let unwrapped = if source_under != source {
            cast(store.identity(source_under), source_expr)
        } else {
            source_expr
        };
        let (stmts, converted) = gen.convert(unwrapped, source_under, target_under)?;
        let rewrapped = if target_under != target {
            cast(store.identity(target), converted)
        } else {
            converted
        };
        Ok((stmts, rewrapped))
    }
}
