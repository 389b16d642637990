use http::Method;
use std::fmt;
use std::sync::Arc;

use crate::endpoint::Handler;

/// A routable target: one verb method of one endpoint.
///
/// Cheap to clone; the handler is shared.
#[derive(Clone)]
pub struct Target {
    endpoint: Arc<str>,
    method: Method,
    handler: Arc<dyn Handler>,
}

impl Target {
    /// Bind `handler` as the `method` target of the endpoint named `endpoint`.
    pub fn new(endpoint: impl Into<Arc<str>>, method: Method, handler: Arc<dyn Handler>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            handler,
        }
    }

    /// Name of the endpoint type that owns the target.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Verb the target answers.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The callable behind the target.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// `true` unless the target answers `GET`, the only verb exempt from the
    /// malformed JSON check.
    #[must_use]
    pub fn reads_body(&self) -> bool {
        self.method != Method::GET
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("params", &self.handler.params().len())
            .finish()
    }
}
