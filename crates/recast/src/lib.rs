//! recast: type-directed conversion-code synthesis.
//!
//! Callers describe value shapes in a [`TypeStore`], submit a batch of
//! conversion requests plus any user-supplied ("extend") routines, and
//! get back named routines made of abstract code operations, ready for
//! a separate emitter to render. A failing request never stops the
//! batch: every failure is collected as one rendered diagnostic
//! pointing at the exact unconvertible sub-path.
//!
//! ```
//! use recast::{synthesize, ConversionRequest};
//! use recast_types::{BasicKind, Field, QualifiedName, TypeStore};
//!
//! let mut store = TypeStore::new();
//! let name = store.basic(BasicKind::String);
//! let a_body = store.strukt(vec![Field::new("Name", name)]);
//! let a = store.named(QualifiedName::new("models", "A"), a_body);
//! let b_body = store.strukt(vec![Field::new("Name", name)]);
//! let b = store.named(QualifiedName::new("models", "B"), b_body);
//!
//! let result = synthesize(
//!     &store,
//!     vec![ConversionRequest::new("Convert", a, b)],
//!     Vec::new(),
//! );
//! assert!(result.failures.is_empty());
//! assert_eq!(result.routines[0].name, "Convert");
//! ```

use std::rc::Rc;

pub use recast_core::{
    default_rules, CandidateContext, ContextParam, ConversionRule, ErrorKind, FieldPath,
    FieldsConfig, Frame, Generator, MethodId, MethodRegistry, RequestConfig, Routine, RoutineKind,
    SynthError,
};
pub use recast_types::{BasicKind, Field, QualifiedName, Signature, TypeId, TypeKind, TypeStore};

/// One conversion to synthesize, with its per-request configuration.
#[derive(Clone, Debug)]
pub struct ConversionRequest {
    pub name: String,
    pub source: TypeId,
    pub target: TypeId,
    pub config: RequestConfig,
}

impl ConversionRequest {
    pub fn new(name: impl Into<String>, source: TypeId, target: TypeId) -> Self {
        ConversionRequest { name: name.into(), source, target, config: RequestConfig::default() }
    }

    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }
}

/// A user-supplied conversion routine registered directly into the
/// method index. The engine emits calls to it but never builds its
/// body; the collaborator has already validated its shapes.
#[derive(Clone, Debug)]
pub struct ExtendRoutine {
    pub name: String,
    pub source: TypeId,
    pub target: TypeId,
    pub may_fail: bool,
    pub self_ref: bool,
    pub context: Vec<ContextParam>,
}

impl ExtendRoutine {
    pub fn new(name: impl Into<String>, source: TypeId, target: TypeId) -> Self {
        ExtendRoutine {
            name: name.into(),
            source,
            target,
            may_fail: false,
            self_ref: false,
            context: Vec::new(),
        }
    }

    pub fn may_fail(mut self) -> Self {
        self.may_fail = true;
        self
    }

    pub fn with_context(mut self, keys: &[&str]) -> Self {
        self.context = keys.iter().map(|key| ContextParam::new(*key, None)).collect();
        self
    }
}

/// One failed request or registration, with its rendered diagnostic.
#[derive(Clone, Debug)]
pub struct RequestFailure {
    pub request: String,
    pub diagnostic: String,
}

/// The outcome of one batch: every successfully generated routine
/// (request roots and the routines synthesized on their behalf), plus
/// one diagnostic per failure.
#[derive(Debug)]
pub struct BatchResult {
    pub routines: Vec<Routine>,
    pub failures: Vec<RequestFailure>,
}

impl BatchResult {
    /// Debug rendering of every generated routine, in registration
    /// order. Used by snapshot tests; not the production emitter.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for routine in &self.routines {
            out.push_str(&routine.render());
            out.push('\n');
        }
        out
    }
}

/// Run a batch of conversion requests with the default rule set.
pub fn synthesize(
    store: &TypeStore,
    requests: Vec<ConversionRequest>,
    extends: Vec<ExtendRoutine>,
) -> BatchResult {
    synthesize_with_rules(store, requests, extends, Vec::new())
}

/// Run a batch with caller-supplied rules tried ahead of the default
/// set -- the extension point for policies (such as enumeration
/// matching) the defaults do not carry.
pub fn synthesize_with_rules(
    store: &TypeStore,
    requests: Vec<ConversionRequest>,
    extends: Vec<ExtendRoutine>,
    extra_rules: Vec<Rc<dyn ConversionRule>>,
) -> BatchResult {
    let mut gen = Generator::with_rules(store, extra_rules);
    let mut failures = Vec::new();

    // Registration errors (ambiguous overloads) are configuration
    // errors and surface immediately, without deferring to the build.
    for extend in extends {
        if let Err(err) = gen.register_extend(
            &extend.name,
            extend.source,
            extend.target,
            extend.may_fail,
            extend.self_ref,
            extend.context,
        ) {
            failures.push(RequestFailure { request: extend.name, diagnostic: err.render() });
        }
    }

    let mut roots = Vec::new();
    for request in requests {
        match gen.add_request(&request.name, request.source, request.target, request.config) {
            Ok(id) => roots.push((request.name, id)),
            Err(err) => {
                failures.push(RequestFailure { request: request.name, diagnostic: err.render() })
            }
        }
    }

    gen.run();

    for (name, id) in roots {
        if let Some(err) = gen.registry().routine(id).failed.clone() {
            failures.push(RequestFailure { request: name, diagnostic: err.render() });
        }
    }

    let routines = gen
        .registry()
        .ids()
        .map(|id| gen.registry().routine(id))
        .filter(|r| r.kind != RoutineKind::Extend && r.failed.is_none())
        .cloned()
        .collect();

    BatchResult { routines, failures }
}
