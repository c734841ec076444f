//! The synthesis orchestrator.
//!
//! `Generator` drives conversion synthesis for one generation unit: it
//! resolves (source, target) pairs against the method registry, creates
//! named routines on demand for composite pairs (registering them
//! before their bodies are built, which is what breaks recursion on
//! self-referential shapes), walks the ordered rule set for everything
//! else, and drains the dirty set to a fixed point when a routine's
//! failure contract changes after its callers were already built.
//!
//! One generator owns one registry and one name allocator; independent
//! generation units get independent generators.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use recast_types::{Signature, TypeId, TypeKind, TypeStore};

use crate::config::RequestConfig;
use crate::error::{ErrorKind, Frame, SynthError};
use crate::namer::Namer;
use crate::ops::{deref, var, Expr, Stmt};
use crate::registry::{MethodId, MethodRegistry};
use crate::routine::{ContextParam, Routine, RoutineKind};
use crate::rules::{default_rules, ConversionRule};

/// One in-progress routine body build.
struct BuildFrame {
    routine: MethodId,
    namer: Namer,
    config: RequestConfig,
    /// True until the body's first `convert` call. The body's own
    /// top-level pair must not resolve to the routine itself, or the
    /// generated body would be a bare self-call.
    root_pending: bool,
}

/// The conversion synthesizer for one generation unit.
pub struct Generator<'s> {
    store: &'s TypeStore,
    registry: MethodRegistry,
    rules: Vec<Rc<dyn ConversionRule>>,
    routine_namer: Namer,
    stack: Vec<BuildFrame>,
    /// Recorded call edges: callee -> set of callers. Used to mark
    /// already-built callers dirty when a callee starts failing.
    callers: FxHashMap<MethodId, FxHashSet<MethodId>>,
    default_config: RequestConfig,
}

impl<'s> Generator<'s> {
    pub fn new(store: &'s TypeStore) -> Self {
        Generator::with_rules(store, Vec::new())
    }

    /// A generator whose rule set starts with `extra` rules, tried
    /// ahead of the defaults. This is the extension point for policies
    /// (e.g. enumeration matching) the default set does not carry.
    pub fn with_rules(store: &'s TypeStore, extra: Vec<Rc<dyn ConversionRule>>) -> Self {
        let mut rules = extra;
        rules.extend(default_rules());
        Generator {
            store,
            registry: MethodRegistry::new(),
            rules,
            routine_namer: Namer::new(),
            stack: Vec::new(),
            callers: FxHashMap::default(),
            default_config: RequestConfig::default(),
        }
    }

    pub fn store(&self) -> &'s TypeStore {
        self.store
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// The configuration of the routine currently being built.
    pub fn config(&self) -> &RequestConfig {
        self.stack.last().map(|f| &f.config).unwrap_or(&self.default_config)
    }

    /// Context keys available at the current call site.
    pub fn available_context(&self) -> FxHashSet<String> {
        match self.stack.last() {
            Some(frame) => self
                .registry
                .routine(frame.routine)
                .required_context()
                .map(str::to_string)
                .collect(),
            None => FxHashSet::default(),
        }
    }

    /// Allocate a unique local name in the current body scope.
    pub fn fresh(&mut self, base: &str) -> String {
        match self.stack.last_mut() {
            Some(frame) => frame.namer.unique(base),
            None => base.to_string(),
        }
    }

    /// Allocate a loop-counter name in the current body scope.
    pub fn fresh_index(&mut self) -> String {
        match self.stack.last_mut() {
            Some(frame) => frame.namer.index_var(),
            None => "i".to_string(),
        }
    }

    fn current(&self) -> Option<MethodId> {
        self.stack.last().map(|f| f.routine)
    }

    // ── Registration ────────────────────────────────────────────────

    /// Register a user-supplied routine. The engine never builds its
    /// body; it only emits calls to it.
    pub fn register_extend(
        &mut self,
        name: &str,
        source: TypeId,
        target: TypeId,
        may_fail: bool,
        self_ref: bool,
        context: Vec<ContextParam>,
    ) -> Result<MethodId, SynthError> {
        let sig = Signature::of(self.store, source, target);
        self.routine_namer.claim(name);
        self.registry.register(Routine {
            name: name.to_string(),
            sig,
            source,
            target,
            source_param: "source".to_string(),
            self_ref,
            context,
            may_fail,
            update_target: false,
            dirty: false,
            kind: RoutineKind::Extend,
            body: Vec::new(),
            result: None,
            failed: None,
            config: RequestConfig::default(),
        })
    }

    /// Register the root routine of one conversion request. The body
    /// is built by [`run`](Generator::run).
    pub fn add_request(
        &mut self,
        name: &str,
        source: TypeId,
        target: TypeId,
        config: RequestConfig,
    ) -> Result<MethodId, SynthError> {
        let sig = Signature::of(self.store, source, target);
        let name = self.routine_namer.unique(name);
        let context = config
            .context
            .iter()
            .map(|key| ContextParam::new(key.clone(), None))
            .collect();
        self.registry.register(Routine {
            name,
            sig,
            source,
            target,
            source_param: "source".to_string(),
            self_ref: true,
            context,
            may_fail: config.may_fail,
            update_target: config.update_target,
            dirty: true,
            kind: RoutineKind::RequestRoot,
            body: Vec::new(),
            result: None,
            failed: None,
            config,
        })
    }

    // ── The driving loop ────────────────────────────────────────────

    /// Build every dirty routine, sweeping repeatedly until no routine
    /// is left dirty. Each sweep may dirty previously-built routines
    /// (a callee's failure contract changed), but a routine's contract
    /// flips from non-failing to failing at most once, so the number
    /// of sweeps is bounded by the number of routines. Failures are
    /// pinned on their routine and do not stop other routines from
    /// building.
    pub fn run(&mut self) {
        let mut sweeps = 0usize;
        loop {
            let dirty: Vec<MethodId> = self
                .registry
                .ids()
                .filter(|&id| {
                    let routine = self.registry.routine(id);
                    routine.dirty && routine.failed.is_none()
                })
                .collect();
            if dirty.is_empty() {
                break;
            }
            sweeps += 1;
            debug_assert!(
                sweeps <= self.registry.len() + 1,
                "dirty re-pass failed to reach a fixed point after {sweeps} sweeps"
            );
            for id in dirty {
                let routine = self.registry.routine(id);
                if !routine.dirty || routine.failed.is_some() {
                    continue;
                }
                // The error is pinned on the routine; rendering happens
                // at the batch boundary.
                let _ = self.build_body(id);
            }
        }
    }

    /// (Re)build one routine body.
    fn build_body(&mut self, id: MethodId) -> Result<(), SynthError> {
        let (source, target, source_param, update_target, kind, sig, config, context_keys) = {
            let routine = self.registry.routine(id);
            (
                routine.source,
                routine.target,
                routine.source_param.clone(),
                routine.update_target,
                routine.kind,
                routine.sig.clone(),
                routine.config.clone(),
                routine.context.iter().map(|c| c.key.clone()).collect::<Vec<_>>(),
            )
        };
        // Clear dirtiness up front: an escalation during this build may
        // legitimately re-mark this routine for the next sweep.
        self.registry.routine_mut(id).dirty = false;

        let mut namer = Namer::new();
        namer.claim(&source_param);
        namer.claim("err");
        if update_target {
            namer.claim("target");
        }
        for key in &context_keys {
            namer.claim(key.clone());
        }
        self.stack.push(BuildFrame { routine: id, namer, config, root_pending: true });
        let converted = self.convert(var(&source_param), source, target);
        self.stack.pop();

        match converted {
            Ok((mut body, result)) => {
                let routine = self.registry.routine_mut(id);
                if update_target {
                    body.push(Stmt::Assign { lhs: deref(var("target")), rhs: result });
                    routine.result = None;
                } else {
                    routine.result = Some(result);
                }
                routine.body = body;
                Ok(())
            }
            Err(err) => {
                let err = if kind == RoutineKind::RequestRoot {
                    err.lift(Frame::root(sig.source, sig.target))
                } else {
                    err
                };
                self.registry.routine_mut(id).failed = Some(Box::new(err.clone()));
                Err(err)
            }
        }
    }

    // ── The conversion entry point rules recurse through ────────────

    /// Derive the conversion of `source_expr` from shape `source` to
    /// shape `target`: registry first, then on-demand routine synthesis
    /// for composite pairs, then the ordered rule set.
    pub fn convert(
        &mut self,
        source_expr: Expr,
        source: TypeId,
        target: TypeId,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        let skip_self = match self.stack.last_mut() {
            Some(frame) => {
                let pending = frame.root_pending;
                frame.root_pending = false;
                pending
            }
            None => false,
        };
        let sig = Signature::of(self.store, source, target);

        if let Some(id) = self.registry.lookup(&sig, &self.available_context())? {
            if !(skip_self && Some(id) == self.current()) {
                return self.emit_call(id, source_expr);
            }
        } else if self.store.warrants_routine(source) && self.store.warrants_routine(target) {
            let id = self.synthesize(source, target)?;
            return self.emit_call(id, source_expr);
        }

        let rules = self.rules.clone();
        for rule in &rules {
            if rule.matches(self, source, target) {
                return rule.build(self, source_expr, source, target);
            }
        }
        Err(SynthError::new(ErrorKind::TypeMismatch {
            source: sig.source,
            target: sig.target,
        }))
    }

    /// Create and build a routine for a composite pair that has no
    /// registered counterpart. The routine is registered before its
    /// body is built so that recursive shapes resolve to a callable
    /// stub instead of recursing forever.
    fn synthesize(&mut self, source: TypeId, target: TypeId) -> Result<MethodId, SynthError> {
        let sig = Signature::of(self.store, source, target);
        let base = routine_base_name(self.store, source, target);
        let name = self.routine_namer.unique(&base);
        let (config, context) = match self.current() {
            Some(cur) => {
                let routine = self.registry.routine(cur);
                (routine.config.clone(), routine.context.clone())
            }
            None => (self.default_config.clone(), Vec::new()),
        };
        let id = self.registry.register(Routine {
            name,
            sig,
            source,
            target,
            source_param: "source".to_string(),
            self_ref: true,
            context,
            may_fail: false,
            update_target: false,
            dirty: true,
            kind: RoutineKind::Synthesized,
            body: Vec::new(),
            result: None,
            failed: None,
            config,
        })?;
        self.build_body(id)?;
        Ok(id)
    }

    /// Emit a call to a registered routine, threading context arguments
    /// and the error binding when the callee may fail.
    fn emit_call(
        &mut self,
        id: MethodId,
        source_expr: Expr,
    ) -> Result<(Vec<Stmt>, Expr), SynthError> {
        if let Some(cur) = self.current() {
            self.callers.entry(id).or_default().insert(cur);
        }
        let (callee, on_self, may_fail, context_keys, failed) = {
            let routine = self.registry.routine(id);
            (
                routine.name.clone(),
                routine.self_ref,
                routine.may_fail,
                routine.context.iter().map(|c| c.key.clone()).collect::<Vec<_>>(),
                routine.failed.clone(),
            )
        };
        if let Some(err) = failed {
            return Err(*err);
        }
        let mut args = vec![source_expr];
        args.extend(context_keys.into_iter().map(var));
        let call = Expr::Call { callee, on_self, args };
        if !may_fail {
            return Ok((Vec::new(), call));
        }
        self.escalate_current()?;
        let result = self.fresh("tmp");
        let on_err = vec![Stmt::Return(self.error_returns())];
        Ok((
            vec![Stmt::CheckedCall { result: result.clone(), call, on_err }],
            var(result),
        ))
    }

    /// The current routine is about to call a failing routine. If it
    /// cannot fail itself: synthesized routines escalate (flip the
    /// contract, dirty their already-built callers, settle in the next
    /// sweep); explicit signatures are a terminal contract violation.
    fn escalate_current(&mut self) -> Result<(), SynthError> {
        let Some(cur_id) = self.current() else {
            return Ok(());
        };
        let current = self.registry.routine(cur_id);
        if current.may_fail {
            return Ok(());
        }
        if current.contract_is_explicit() {
            return Err(SynthError::new(ErrorKind::ReturnContractViolation {
                routine: current.name.clone(),
            }));
        }
        self.registry.routine_mut(cur_id).may_fail = true;
        if let Some(callers) = self.callers.get(&cur_id).cloned() {
            for caller in callers {
                self.registry.routine_mut(caller).dirty = true;
            }
        }
        Ok(())
    }

    /// The early-return value list for error propagation out of the
    /// current routine.
    pub fn error_returns(&self) -> Vec<Expr> {
        match self.current() {
            Some(cur) => {
                let routine = self.registry.routine(cur);
                if routine.update_target {
                    vec![var("err")]
                } else {
                    vec![Expr::Zero(routine.sig.target.clone()), var("err")]
                }
            }
            None => vec![var("err")],
        }
    }
}

/// A readable base name for a synthesized routine, e.g.
/// `personToAPerson` for `models.Person -> models.APerson`.
fn routine_base_name(store: &TypeStore, source: TypeId, target: TypeId) -> String {
    let source = short_name(store, source);
    let target = short_name(store, target);
    format!("{}To{}", lower_first(&source), upper_first(&target))
}

fn short_name(store: &TypeStore, id: TypeId) -> String {
    match store.kind(id) {
        TypeKind::Basic(kind) => kind.as_str().to_string(),
        TypeKind::Named { name, .. } => name.name.clone(),
        TypeKind::Pointer(inner) => format!("Ptr{}", upper_first(&short_name(store, *inner))),
        TypeKind::List { elem, .. } => format!("List{}", upper_first(&short_name(store, *elem))),
        TypeKind::Map { .. } => "Map".to_string(),
        TypeKind::Struct { .. } => "Struct".to_string(),
        TypeKind::Interface { .. } => "Interface".to_string(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
