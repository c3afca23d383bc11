//! Task-local trace context.
//!
//! `RequestTrace` scopes every request future with a fresh trace id; the
//! background sweeper scopes each pass the same way. Anything running inside
//! the scope (error rendering, store error mapping, logs) can read it.

use std::cell::RefCell;
use std::fmt;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: RefCell<Option<String>>;
}

/// Trace id as stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(String);

impl TraceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current trace id, or "unknown" outside any scope.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
        .unwrap_or_else(|| "unknown".to_string())
}

/// Run `future` with `trace_id` as the task-local trace id.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(RefCell::new(Some(trace_id)), future).await
}
