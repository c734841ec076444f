//! Synthesis errors and nested-location diagnostics.
//!
//! Every fallible layer of the engine returns a `SynthError`. As a
//! failure bubbles outward, each level lifts the error by prepending
//! one `Frame` of location context, so the final error carries the
//! full accessor chain from the request root down to the exact
//! unconvertible sub-field. `render` draws that chain as a two-sided
//! diagram: the source-side path above the fault line, the target-side
//! path below it, type annotations bracketing both, and the root cause
//! last.

use std::fmt;

use serde::Serialize;

/// Per-candidate context report attached to an unsatisfied lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateContext {
    pub name: String,
    /// Context keys available at the call site (sorted).
    pub available: Vec<String>,
    /// Required keys the call site does not provide (sorted).
    pub missing: Vec<String>,
    /// Available keys the candidate does not use (sorted).
    pub unused: Vec<String>,
}

/// The failure taxonomy of the synthesizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// No rule and no registered routine matches the pair.
    TypeMismatch { source: String, target: String },
    /// A target struct field has no resolvable source.
    MissingField { field: String, target_type: String },
    /// Case-insensitive matching found more than one source candidate.
    AmbiguousField { field: String, candidates: Vec<String> },
    /// Two routines for one signature have mutually satisfiable
    /// context requirements. Raised at registration time.
    AmbiguousOverload {
        signature: String,
        existing: String,
        new: String,
    },
    /// Routines exist for the signature but no candidate's required
    /// context is satisfied at the call site.
    UnsatisfiedContext {
        signature: String,
        candidates: Vec<CandidateContext>,
    },
    /// A routine with a user-pinned non-failing signature would have to
    /// call a failing routine. Synthesized routines escalate via the
    /// dirty re-pass instead; only explicit signatures reach this.
    ReturnContractViolation { routine: String },
}

impl ErrorKind {
    /// Kinds that can only arise inside a conversion walk and must
    /// therefore carry at least one accessor frame by the time they
    /// render. Lookup-shaped kinds may or may not have a path: raised
    /// at registration time they have none, raised at a nested call
    /// site they accumulate frames like any other failure.
    fn requires_path(&self) -> bool {
        matches!(
            self,
            ErrorKind::TypeMismatch { .. }
                | ErrorKind::MissingField { .. }
                | ErrorKind::AmbiguousField { .. }
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TypeMismatch { source, target } => {
                write!(f, "no viable conversion from {source} to {target}")
            }
            ErrorKind::MissingField { field, target_type } => {
                write!(
                    f,
                    "target field {field} of {target_type} has no matching source field"
                )
            }
            ErrorKind::AmbiguousField { field, candidates } => {
                write!(
                    f,
                    "case-insensitive match for target field {field} is ambiguous: {}",
                    candidates.join(", ")
                )
            }
            ErrorKind::AmbiguousOverload { signature, existing, new } => {
                write!(
                    f,
                    "ambiguous overload for {signature}: the required context of {new} \
                     and {existing} would be satisfiable from the same caller"
                )
            }
            ErrorKind::UnsatisfiedContext { signature, candidates } => {
                writeln!(f, "no candidate for {signature} has its context satisfied:")?;
                for c in candidates {
                    writeln!(
                        f,
                        "  {}: available [{}], missing [{}], unused [{}]",
                        c.name,
                        c.available.join(", "),
                        c.missing.join(", "),
                        c.unused.join(", ")
                    )?;
                }
                Ok(())
            }
            ErrorKind::ReturnContractViolation { routine } => {
                write!(f, "cannot add failure to the explicit signature of {routine}")
            }
        }
    }
}

/// One nesting level of diagnostic context.
///
/// `prefix` is the path symbol (`.` for fields, `[` for indexed
/// access, empty for the request root); `source`/`target` are the
/// accessor labels on each side; the type names are optional
/// annotations shown bracketing the diagram.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub prefix: &'static str,
    pub source: String,
    pub target: String,
    pub source_type: Option<String>,
    pub target_type: Option<String>,
}

impl Frame {
    /// The request-root frame: bare `source`/`target` heads with the
    /// outer type names.
    pub fn root(source_type: impl Into<String>, target_type: impl Into<String>) -> Self {
        Frame {
            prefix: "",
            source: String::new(),
            target: String::new(),
            source_type: Some(source_type.into()),
            target_type: Some(target_type.into()),
        }
    }

    /// A struct-field frame, `.Name` on both sides.
    pub fn field(
        source: impl Into<String>,
        target: impl Into<String>,
        source_type: Option<String>,
        target_type: Option<String>,
    ) -> Self {
        Frame { prefix: ".", source: source.into(), target: target.into(), source_type, target_type }
    }

    /// An indexed frame, `[label]` on both sides.
    pub fn indexed(label: impl Into<String>) -> Self {
        let label = label.into();
        Frame {
            prefix: "[",
            source: label.clone(),
            target: label,
            source_type: None,
            target_type: None,
        }
    }

    fn segment(prefix: &str, label: &str) -> String {
        match prefix {
            "." if !label.is_empty() => format!(".{label}"),
            "[" => format!("[{label}]"),
            _ => String::new(),
        }
    }

    fn source_segment(&self) -> String {
        Frame::segment(self.prefix, &self.source)
    }

    fn target_segment(&self) -> String {
        Frame::segment(self.prefix, &self.target)
    }
}

/// A synthesis failure with its accumulated location frames.
///
/// Frames run outermost-first; `lift` prepends, so the innermost
/// failure adds its frame first and each enclosing level pushes its own
/// in front on the way out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SynthError {
    pub kind: ErrorKind,
    pub frames: Vec<Frame>,
}

impl SynthError {
    pub fn new(kind: ErrorKind) -> Self {
        SynthError { kind, frames: Vec::new() }
    }

    /// Prepend one frame of location context. Pure: consumes and
    /// returns, never touches an already-rendered error.
    pub fn lift(mut self, frame: Frame) -> Self {
        self.frames.insert(0, frame);
        self
    }

    /// Render the error, consuming it: the two-sided path diagram
    /// whenever location frames were accumulated, the plain message
    /// for frame-less (registration-time) errors.
    ///
    /// Path-shaped errors with zero frames are an internal contract
    /// violation: every layer between the failing rule and the request
    /// root must have lifted at least one frame.
    pub fn render(self) -> String {
        debug_assert!(
            !self.kind.requires_path() || !self.frames.is_empty(),
            "path-shaped error rendered with no frames: {}",
            self.kind
        );
        if self.frames.is_empty() {
            return self.kind.to_string();
        }

        let source_cols = column_starts("source", self.frames.iter().map(Frame::source_segment));
        let target_cols = column_starts("target", self.frames.iter().map(Frame::target_segment));

        let mut out = String::new();
        // Source side, outermost frame first, narrowing toward the
        // fault line. A frame with no accessor and no annotation on
        // this side (a missing-field frame) contributes no lines.
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 && frame.source_segment().is_empty() && frame.source_type.is_none() {
                continue;
            }
            if let Some(ty) = &frame.source_type {
                out.push_str(&pipes(&source_cols[..=i], Some(ty)));
            }
            out.push_str(&pipes(&source_cols[..=i], None));
        }
        // The fault line: full accessor chains on both sides.
        out.push_str("source");
        for frame in &self.frames {
            out.push_str(&frame.source_segment());
        }
        out.push('\n');
        out.push_str("target");
        for frame in &self.frames {
            out.push_str(&frame.target_segment());
        }
        out.push('\n');
        // Target side, mirrored: innermost frame first, widening back
        // out.
        for (i, frame) in self.frames.iter().enumerate().rev() {
            if i > 0 && frame.target_segment().is_empty() && frame.target_type.is_none() {
                continue;
            }
            out.push_str(&pipes(&target_cols[..=i], None));
            if let Some(ty) = &frame.target_type {
                out.push_str(&pipes(&target_cols[..=i], Some(ty)));
            }
        }
        out.push('\n');
        out.push_str(&self.kind.to_string());
        out
    }
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for SynthError {}

/// Starting column of each frame's segment within the accessor chain.
/// The root frame contributes no segment of its own; its column is the
/// head word itself, at column zero.
fn column_starts(head: &str, segments: impl Iterator<Item = String>) -> Vec<usize> {
    let mut cols = Vec::new();
    let mut col = head.len();
    for seg in segments {
        if seg.is_empty() {
            cols.push(col - head.len());
        } else {
            cols.push(col);
        }
        col += seg.len();
    }
    cols
}

/// A line with a `|` at every column, optionally followed by a label
/// after the last pipe.
fn pipes(cols: &[usize], label: Option<&str>) -> String {
    let mut line = String::new();
    for &col in cols {
        // Frames without a segment share a column with the head word.
        if line.len() > col {
            continue;
        }
        while line.len() < col {
            line.push(' ');
        }
        line.push('|');
    }
    if let Some(label) = label {
        line.push(' ');
        line.push_str(label);
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lift_prepends_frames() {
        let err = SynthError::new(ErrorKind::TypeMismatch {
            source: "string".into(),
            target: "int".into(),
        })
        .lift(Frame::field("Name", "Name", None, None))
        .lift(Frame::root("models.Person", "models.APerson"));
        assert_eq!(err.frames.len(), 2);
        assert_eq!(err.frames[0].prefix, "");
        assert_eq!(err.frames[1].source, "Name");
    }

    #[test]
    fn render_single_field_diagram() {
        let err = SynthError::new(ErrorKind::TypeMismatch {
            source: "string".into(),
            target: "int".into(),
        })
        .lift(Frame::field(
            "Age",
            "Age",
            Some("string".into()),
            Some("int".into()),
        ))
        .lift(Frame::root("models.Person", "models.APerson"));
        let rendered = err.render();
        assert!(rendered.contains("source.Age"));
        assert!(rendered.contains("target.Age"));
        assert!(rendered.contains("models.Person"));
        assert!(rendered.contains("models.APerson"));
        assert!(rendered.ends_with("no viable conversion from string to int"));
    }

    #[test]
    fn render_indexed_frame() {
        let err = SynthError::new(ErrorKind::TypeMismatch {
            source: "string".into(),
            target: "int".into(),
        })
        .lift(Frame::indexed("i"))
        .lift(Frame::field("Items", "Items", None, None))
        .lift(Frame::root("A", "B"));
        let rendered = err.render();
        assert!(rendered.contains("source.Items[i]"));
        assert!(rendered.contains("target.Items[i]"));
    }

    #[test]
    fn registration_errors_render_as_plain_messages() {
        let err = SynthError::new(ErrorKind::AmbiguousOverload {
            signature: "string -> int".into(),
            existing: "parseInt".into(),
            new: "parseIntToo".into(),
        });
        let rendered = err.render();
        assert!(rendered.starts_with("ambiguous overload for string -> int"));
        assert!(!rendered.contains("source"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no frames")]
    fn path_error_without_frames_is_a_contract_violation() {
        SynthError::new(ErrorKind::TypeMismatch {
            source: "a".into(),
            target: "b".into(),
        })
        .render();
    }

    #[test]
    fn nested_unsatisfied_context_keeps_its_path() {
        let err = SynthError::new(ErrorKind::UnsatisfiedContext {
            signature: "string -> int".into(),
            candidates: vec![CandidateContext {
                name: "localizedParse".into(),
                available: Vec::new(),
                missing: vec!["locale".into()],
                unused: Vec::new(),
            }],
        })
        .lift(Frame::field("Value", "Value", Some("string".into()), Some("int".into())))
        .lift(Frame::root("models.Person", "models.APerson"));
        let rendered = err.render();
        assert!(rendered.contains("source.Value"));
        assert!(rendered.contains("target.Value"));
        assert!(rendered.contains("no candidate for string -> int"));
    }

    #[test]
    fn unsatisfied_context_lists_candidates() {
        let err = SynthError::new(ErrorKind::UnsatisfiedContext {
            signature: "string -> int".into(),
            candidates: vec![CandidateContext {
                name: "localizedParse".into(),
                available: vec!["format".into()],
                missing: vec!["locale".into()],
                unused: vec!["format".into()],
            }],
        });
        let rendered = err.render();
        assert!(rendered.contains("localizedParse"));
        assert!(rendered.contains("missing [locale]"));
        assert!(rendered.contains("unused [format]"));
    }
}
