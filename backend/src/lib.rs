//! User management backend.
//!
//! Request bodies are validated against declarative schemas before handlers
//! run, and every failure leaves the service as the same JSON error
//! envelope, classified from a tagged [`domain::Failure`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
