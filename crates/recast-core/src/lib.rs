//! The recast conversion-synthesis engine.
//!
//! Given two shape descriptors, the engine derives an abstract
//! operation sequence converting one to the other: an ordered rule set
//! handles the structural cases, a signature-keyed method registry
//! resolves calls to user-supplied or previously synthesized routines
//! through context-aware overload selection, and the generator drives
//! the recursion, creating named routines on demand and re-sweeping to
//! a fixed point when a routine's failure contract changes. Failures
//! accumulate nested-location frames and render as a single two-sided
//! path diagram.

pub mod config;
pub mod error;
pub mod generator;
pub mod namer;
pub mod ops;
pub mod registry;
pub mod routine;
pub mod rules;

pub use config::{FieldPath, FieldsConfig, RequestConfig};
pub use error::{CandidateContext, ErrorKind, Frame, SynthError};
pub use generator::Generator;
pub use namer::Namer;
pub use registry::{MethodId, MethodRegistry};
pub use routine::{ContextParam, Routine, RoutineKind};
pub use rules::{default_rules, ConversionRule};
