//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns. `Trace` correlates
//! logs, `ValidateBody` guards mutating routes with a schema, and
//! `NormalizeErrors` renders every failure as an error envelope.

pub mod normalize_errors;
pub mod trace;
pub mod validate_body;

pub use normalize_errors::NormalizeErrors;
pub use trace::{TRACE_ID_HEADER, Trace};
pub use validate_body::ValidateBody;
