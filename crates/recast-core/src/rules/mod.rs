//! The ordered conversion-rule set.
//!
//! Each rule is an independent strategy answering two questions: does
//! it apply to a (source, target) pair, and what code converts one to
//! the other. Rules are tried in a fixed priority order and the first
//! match wins, so the order encodes precedence: identical-type skip
//! beats struct copy, the basic-to-pointer special case beats generic
//! pointer handling, and underlying-type delegation is the last
//! resort. Rules recurse into nested conversions exclusively through
//! [`Generator::convert`], and are side-effect-free on failure: a
//! `build` error means none of its partial output is used.

pub mod basic;
pub mod collections;
pub mod pointer;
pub mod structs;
pub mod underlying;

use std::rc::Rc;

use recast_types::TypeId;

use crate::error::SynthError;
use crate::generator::Generator;
use crate::ops::{Expr, Stmt};

/// One conversion strategy.
pub trait ConversionRule {
    /// A stable name for debugging and traceability.
    fn name(&self) -> &'static str;

    /// Whether this rule applies to the pair under the current
    /// routine's configuration.
    fn matches(&self, gen: &Generator<'_>, source: TypeId, target: TypeId) -> bool;

    /// Emit the conversion of `source_expr`. Nested conversions go
    /// back through `gen.convert`; errors bubble out lifted with this
    /// level's path frame.
    fn build(
        &self,
        gen: &mut Generator<'_>,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError>;
}

/// The default rule set in priority order. Caller-supplied rules (the
/// extension point for policies such as enumeration matching) are
/// tried ahead of these.
pub fn default_rules() -> Vec<Rc<dyn ConversionRule>> {
    vec![
        Rc::new(basic::SkipCopy),
        Rc::new(basic::BasicTargetPointer),
        Rc::new(basic::BasicToBasic),
        Rc::new(pointer::PointerToPointer),
        Rc::new(pointer::SourcePointer),
        Rc::new(pointer::TargetPointer),
        Rc::new(collections::ListToList),
        Rc::new(collections::MapToMap),
        Rc::new(structs::StructToStruct),
        Rc::new(underlying::UnderlyingDelegation),
    ]
}
