//! The method registry: named conversion routines indexed by signature.
//!
//! Overload handling is two-part. At registration time, two routines
//! for the same signature whose required-context sets are mutually
//! satisfiable (one a subset of the other, including equality) are
//! rejected outright -- they would be indistinguishable whenever both
//! contexts are available. At call time, the first candidate whose
//! required context is fully satisfied wins; if candidates exist but
//! none is satisfied, the error lists per candidate which keys are
//! available, missing, and unused.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use recast_types::Signature;

use crate::error::{CandidateContext, ErrorKind, SynthError};
use crate::routine::Routine;

/// An index into the registry, identifying one routine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MethodId(pub u32);

/// Stores routines and resolves (signature, available-context) lookups.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: Vec<Routine>,
    by_sig: FxHashMap<Signature, Vec<MethodId>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        MethodRegistry::default()
    }

    /// Register a routine. Fails with `AmbiguousOverload` when an
    /// existing entry for the same signature has a required-context set
    /// that is a subset of the new one's, or vice versa.
    pub fn register(&mut self, routine: Routine) -> Result<MethodId, SynthError> {
        let new_required: FxHashSet<&str> = routine.required_context().collect();
        if let Some(entries) = self.by_sig.get(&routine.sig) {
            for &existing_id in entries {
                let existing = &self.methods[existing_id.0 as usize];
                let existing_required: FxHashSet<&str> = existing.required_context().collect();
                if existing_required.is_subset(&new_required)
                    || new_required.is_subset(&existing_required)
                {
                    return Err(SynthError::new(ErrorKind::AmbiguousOverload {
                        signature: routine.sig.to_string(),
                        existing: existing.name.clone(),
                        new: routine.name.clone(),
                    }));
                }
            }
        }
        let id = MethodId(self.methods.len() as u32);
        self.by_sig.entry(routine.sig.clone()).or_default().push(id);
        self.methods.push(routine);
        Ok(id)
    }

    /// Register every routine whose name matches a `*`-wildcard pattern
    /// (leading and/or trailing `*`). All matches are registered, then
    /// the standard ambiguity detection applies to each.
    pub fn register_all(
        &mut self,
        routines: Vec<Routine>,
        pattern: &str,
    ) -> Result<Vec<MethodId>, SynthError> {
        let mut ids = Vec::new();
        for routine in routines {
            if name_matches(pattern, &routine.name) {
                ids.push(self.register(routine)?);
            }
        }
        Ok(ids)
    }

    /// Find the first routine for `sig` whose required context is
    /// satisfied by `available`. `Ok(None)` when no entry exists at
    /// all; `UnsatisfiedContext` when entries exist but none fits.
    pub fn lookup(
        &self,
        sig: &Signature,
        available: &FxHashSet<String>,
    ) -> Result<Option<MethodId>, SynthError> {
        let Some(entries) = self.by_sig.get(sig) else {
            return Ok(None);
        };
        for &id in entries {
            let routine = &self.methods[id.0 as usize];
            if routine.required_context().all(|key| available.contains(key)) {
                return Ok(Some(id));
            }
        }
        let mut candidates = Vec::new();
        for &id in entries {
            let routine = &self.methods[id.0 as usize];
            let required: FxHashSet<&str> = routine.required_context().collect();
            let mut avail: Vec<String> = available.iter().cloned().collect();
            avail.sort();
            let mut missing: Vec<String> = required
                .iter()
                .filter(|key| !available.contains(**key))
                .map(|key| key.to_string())
                .collect();
            missing.sort();
            let mut unused: Vec<String> = available
                .iter()
                .filter(|key| !required.contains(key.as_str()))
                .cloned()
                .collect();
            unused.sort();
            candidates.push(CandidateContext {
                name: routine.name.clone(),
                available: avail,
                missing,
                unused,
            });
        }
        Err(SynthError::new(ErrorKind::UnsatisfiedContext {
            signature: sig.to_string(),
            candidates,
        }))
    }

    /// Whether a satisfiable routine exists for `sig`, without
    /// constructing a diagnostic. Used by rule `matches` checks.
    pub fn has_satisfiable(&self, sig: &Signature, available: &FxHashSet<String>) -> bool {
        matches!(self.lookup(sig, available), Ok(Some(_)))
    }

    pub fn routine(&self, id: MethodId) -> &Routine {
        &self.methods[id.0 as usize]
    }

    pub fn routine_mut(&mut self, id: MethodId) -> &mut Routine {
        &mut self.methods[id.0 as usize]
    }

    /// All ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = MethodId> {
        (0..self.methods.len() as u32).map(MethodId)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Match a routine name against a pattern with optional leading and/or
/// trailing `*` wildcards. No other metacharacters are supported.
fn name_matches(pattern: &str, name: &str) -> bool {
    match (pattern.strip_prefix('*'), pattern.strip_suffix('*')) {
        (Some(rest), _) if rest.is_empty() => true,
        (Some(rest), Some(_)) => {
            // *mid* -- strip both ends.
            let mid = &rest[..rest.len() - 1];
            name.contains(mid)
        }
        (Some(suffix), None) => name.ends_with(suffix),
        (None, Some(prefix)) => name.starts_with(prefix),
        (None, None) => name == pattern,
    }
}
