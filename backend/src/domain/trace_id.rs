//! Correlation identifier carried by every request.
//!
//! The [`Trace`](crate::middleware::Trace) middleware places a [`TraceId`] in
//! task-local storage for the lifetime of the request future so handlers,
//! services and the error normalizer can tag log records without threading
//! the value through every call. Task-locals do not follow `tokio::spawn`;
//! wrap spawned work in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// Request correlation identifier.
///
/// # Examples
/// ```
/// use userdesk::TraceId;
///
/// let id: TraceId = "6f1c1a52-0d7e-4f8a-9a44-0b1f5a9c2d10".parse().expect("uuid");
/// assert_eq!(id.to_string(), "6f1c1a52-0d7e-4f8a-9a44-0b1f5a9c2d10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a caller-supplied identifier when it is a valid UUID, otherwise
    /// generate a new one.
    #[must_use]
    pub fn from_header_or_generate(header: Option<&str>) -> Self {
        header
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// Identifier of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current identifier.
    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn scope_exposes_current_id() {
        let id = TraceId::generate();
        assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    }

    #[tokio::test]
    async fn no_id_outside_a_scope() {
        assert_eq!(TraceId::current(), None);
    }

    #[rstest]
    fn valid_header_is_reused() {
        let header = "6f1c1a52-0d7e-4f8a-9a44-0b1f5a9c2d10";
        let id = TraceId::from_header_or_generate(Some(header));
        assert_eq!(id.to_string(), header);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("not-a-uuid"))]
    #[case(Some(""))]
    fn invalid_or_missing_header_generates(#[case] header: Option<&str>) {
        let id = TraceId::from_header_or_generate(header);
        assert!(Uuid::parse_str(&id.to_string()).is_ok());
    }
}
