//! Conversion routines: named, reusable units of generated code.

use recast_types::{Signature, TypeId};
use serde::Serialize;

use crate::config::RequestConfig;
use crate::error::SynthError;
use crate::ops::{render_block, render_expr, Expr, Stmt};

/// How a routine came to exist.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum RoutineKind {
    /// Created on demand by the generator for a named/composite pair.
    Synthesized,
    /// The root routine of one conversion request; its signature and
    /// failure contract were declared by the caller.
    RequestRoot,
    /// User-supplied; the engine only calls it, never builds its body.
    Extend,
}

/// One extra named input a routine requires beyond the source value.
/// The type is known for user-supplied routines and absent for request
/// context parameters, where only the key participates in lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContextParam {
    pub key: String,
    pub ty: Option<TypeId>,
}

impl ContextParam {
    pub fn new(key: impl Into<String>, ty: Option<TypeId>) -> Self {
        ContextParam { key: key.into(), ty }
    }
}

/// A named conversion routine.
///
/// Lifecycle: registered in the method registry before its body is
/// built (so recursive shapes resolve to a callable stub); rebuilt
/// whenever `dirty`; immutable once a full pass ends with nothing
/// dirty. `failed` pins the first build error so later callers of a
/// broken routine see the same diagnostic instead of half-built code.
#[derive(Clone, Debug, Serialize)]
pub struct Routine {
    pub name: String,
    pub sig: Signature,
    pub source: TypeId,
    pub target: TypeId,
    /// Name of the source-value parameter.
    pub source_param: String,
    /// Whether calls go through the converter receiver (`c.name(...)`).
    pub self_ref: bool,
    pub context: Vec<ContextParam>,
    pub may_fail: bool,
    /// Update-in-place: the routine takes a target handle and assigns
    /// through it instead of returning a fresh value.
    pub update_target: bool,
    pub dirty: bool,
    pub kind: RoutineKind,
    pub body: Vec<Stmt>,
    /// The result handle; `None` for update-in-place routines.
    pub result: Option<Expr>,
    #[serde(skip)]
    pub failed: Option<Box<SynthError>>,
    #[serde(skip)]
    pub config: RequestConfig,
}

impl Routine {
    /// The required-context key set, in declaration order.
    pub fn required_context(&self) -> impl Iterator<Item = &str> {
        self.context.iter().map(|c| c.key.as_str())
    }

    /// Whether the failure contract was pinned by the user rather than
    /// inferred; only synthesized routines may escalate to failing.
    pub fn contract_is_explicit(&self) -> bool {
        matches!(self.kind, RoutineKind::RequestRoot | RoutineKind::Extend)
    }

    /// Debug rendering of the routine: signature header, body, and
    /// final return. Not the production emitter.
    pub fn render(&self) -> String {
        let mut params = format!("{} {}", self.source_param, self.sig.source);
        if self.update_target {
            params.push_str(&format!(", target *{}", self.sig.target));
        }
        for ctx in &self.context {
            params.push_str(&format!(", {} context", ctx.key));
        }
        let ret = match (self.update_target, self.may_fail) {
            (true, true) => "error".to_string(),
            (true, false) => "".to_string(),
            (false, true) => format!("({}, error)", self.sig.target),
            (false, false) => self.sig.target.clone(),
        };
        let receiver = if self.self_ref { "(c *Converter) " } else { "" };
        let mut out = format!("func {}{}({}) {} {{\n", receiver, self.name, params, ret);
        out.push_str(&render_block(&self.body, 1));
        let mut returns: Vec<String> = Vec::new();
        if let Some(result) = &self.result {
            returns.push(render_expr(result));
        }
        if self.may_fail {
            returns.push("nil".to_string());
        }
        if !returns.is_empty() {
            out.push_str(&format!("  return {}\n", returns.join(", ")));
        }
        out.push_str("}\n");
        out
    }
}
