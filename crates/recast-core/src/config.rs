//! Per-request configuration.
//!
//! Callers resolve annotations, flags, and field-mapping overrides
//! before the engine runs; this module only carries the result. The
//! config of a request propagates to every routine synthesized on its
//! behalf.

use rustc_hash::{FxHashMap, FxHashSet};

/// A dotted accessor path into the source value, e.g. `Inner.Name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath(pub Vec<String>);

impl FieldPath {
    /// Parse a dotted path. Empty segments are preserved and will fail
    /// resolution later with a precise missing-field error.
    pub fn parse(path: &str) -> Self {
        FieldPath(path.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

/// Field-mapping overrides for struct conversions.
#[derive(Clone, Debug, Default)]
pub struct FieldsConfig {
    /// Target field name -> source accessor path.
    pub rename: FxHashMap<String, FieldPath>,
    /// Target fields left at their zero value.
    pub ignore: FxHashSet<String>,
    /// Match source fields case-insensitively when no exact match
    /// exists. Ambiguity under case folding is an error.
    pub ignore_case: bool,
}

/// Configuration of one conversion request.
#[derive(Clone, Debug)]
pub struct RequestConfig {
    pub fields: FieldsConfig,
    /// Emit a straight assignment when source and target types are
    /// identical instead of recursing.
    pub skip_copy_same_type: bool,
    /// Whether the request's root routine is allowed to fail. Pinned:
    /// a non-failing root that needs a failing callee is an error.
    pub may_fail: bool,
    /// Update-in-place: the root routine writes through a target
    /// handle instead of returning a new value.
    pub update_target: bool,
    /// Pointer-inconsistency handling: a nil pointer source converting
    /// to a non-pointer target yields the target's zero value instead
    /// of failing, and nil pointer-to-pointer conversions produce an
    /// explicit zero rather than a nil target.
    pub zero_value_on_pointer_inconsistency: bool,
    /// Allow delegating named-type pairs to a conversion between their
    /// underlying basic representations.
    pub use_underlying_basic: bool,
    /// Extra named inputs available to this request's routines and
    /// every nested lookup.
    pub context: Vec<String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        RequestConfig {
            fields: FieldsConfig::default(),
            skip_copy_same_type: true,
            may_fail: false,
            update_target: false,
            zero_value_on_pointer_inconsistency: false,
            use_underlying_basic: true,
            context: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dotted_path() {
        let path = FieldPath::parse("Inner.Name");
        assert_eq!(path.segments(), ["Inner".to_string(), "Name".to_string()]);
    }

    #[test]
    fn parse_single_segment() {
        let path = FieldPath::parse("Name");
        assert_eq!(path.segments(), ["Name".to_string()]);
    }
}
