use http::Method;
use std::sync::Arc;

use super::handler::{FnHandler, Handler, HandlerResult};
use crate::params::{Args, ParamSpec};

/// Endpoint answers `GET`.
pub trait Gettable: Send + Sync + 'static {
    /// Parameters of [`Gettable::get`]. Read once, at registration.
    fn get_params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Handle a `GET`.
    fn get(&self, args: Args) -> HandlerResult;
}

/// Endpoint answers `POST`.
pub trait Postable: Send + Sync + 'static {
    /// Parameters of [`Postable::post`]. Read once, at registration.
    fn post_params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Handle a `POST`.
    fn post(&self, args: Args) -> HandlerResult;
}

/// Endpoint answers `PUT`.
pub trait Puttable: Send + Sync + 'static {
    /// Parameters of [`Puttable::put`]. Read once, at registration.
    fn put_params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Handle a `PUT`.
    fn put(&self, args: Args) -> HandlerResult;
}

/// Endpoint answers `DELETE`.
pub trait Deletable: Send + Sync + 'static {
    /// Parameters of [`Deletable::delete`]. Read once, at registration.
    fn delete_params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Handle a `DELETE`.
    fn delete(&self, args: Args) -> HandlerResult;
}

/// A routable resource.
///
/// An endpoint names its route pattern and lists the verbs it answers. Only
/// listed verbs become targets; the remaining configured verbs are registered
/// unbound so that the path answers 405 for them.
///
/// ```rust
/// use apidispatch::endpoint::{Capabilities, Endpoint, Gettable, HandlerResult};
/// use apidispatch::params::{Args, ParamSpec};
/// use apidispatch::response::{Response, Status};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// struct Health;
///
/// impl Gettable for Health {
///     fn get_params(&self) -> Vec<ParamSpec> {
///         vec![ParamSpec::bool("verbose", false)]
///     }
///
///     fn get(&self, args: Args) -> HandlerResult {
///         Ok(Response::json(Status::Ok, json!({ "ok": true, "verbose": args.bool("verbose") })))
///     }
/// }
///
/// impl Endpoint for Health {
///     fn route_pattern(&self) -> &str {
///         "/health"
///     }
///
///     fn capabilities(self: Arc<Self>) -> Capabilities {
///         Capabilities::for_endpoint::<Self>().get(&self)
///     }
/// }
/// ```
pub trait Endpoint: Send + Sync + 'static {
    /// Route pattern, relative to the dispatcher's base path.
    fn route_pattern(&self) -> &str;

    /// Verb targets this endpoint exposes.
    fn capabilities(self: Arc<Self>) -> Capabilities;
}

/// Endpoint for a single addressable item: answers `GET`, `PUT` and
/// `DELETE`.
pub trait ItemEndpoint: Endpoint + Gettable + Puttable + Deletable {}

impl<T> ItemEndpoint for T where T: Endpoint + Gettable + Puttable + Deletable {}

macro_rules! verb_adapter {
    ($adapter:ident, $capability:ident, $params:ident, $call:ident) => {
        struct $adapter<T: ?Sized> {
            inner: Arc<T>,
            params: Vec<ParamSpec>,
        }

        impl<T: $capability> $adapter<T> {
            fn new(inner: &Arc<T>) -> Self {
                Self {
                    params: inner.$params(),
                    inner: Arc::clone(inner),
                }
            }
        }

        impl<T: $capability> Handler for $adapter<T> {
            fn params(&self) -> &[ParamSpec] {
                &self.params
            }

            fn call(&self, args: Args) -> HandlerResult {
                self.inner.$call(args)
            }
        }
    };
}

verb_adapter!(GetAdapter, Gettable, get_params, get);
verb_adapter!(PostAdapter, Postable, post_params, post);
verb_adapter!(PutAdapter, Puttable, put_params, put);
verb_adapter!(DeleteAdapter, Deletable, delete_params, delete);

/// The verb targets an endpoint exposes.
///
/// Each verb maps to at most one handler; declaring a verb twice keeps the
/// later handler.
#[derive(Clone)]
pub struct Capabilities {
    endpoint: Arc<str>,
    handlers: Vec<(Method, Arc<dyn Handler>)>,
}

impl Capabilities {
    /// Empty capability set for an endpoint called `endpoint`.
    pub fn new(endpoint: impl Into<Arc<str>>) -> Self {
        Self {
            endpoint: endpoint.into(),
            handlers: Vec::with_capacity(4),
        }
    }

    /// Empty capability set named after the type `E`.
    #[must_use]
    pub fn for_endpoint<E: ?Sized>() -> Self {
        Self::new(std::any::type_name::<E>())
    }

    /// Expose [`Gettable::get`].
    #[must_use]
    pub fn get<T: Gettable>(self, endpoint: &Arc<T>) -> Self {
        self.handler(Method::GET, Arc::new(GetAdapter::new(endpoint)))
    }

    /// Expose [`Postable::post`].
    #[must_use]
    pub fn post<T: Postable>(self, endpoint: &Arc<T>) -> Self {
        self.handler(Method::POST, Arc::new(PostAdapter::new(endpoint)))
    }

    /// Expose [`Puttable::put`].
    #[must_use]
    pub fn put<T: Puttable>(self, endpoint: &Arc<T>) -> Self {
        self.handler(Method::PUT, Arc::new(PutAdapter::new(endpoint)))
    }

    /// Expose [`Deletable::delete`].
    #[must_use]
    pub fn delete<T: Deletable>(self, endpoint: &Arc<T>) -> Self {
        self.handler(Method::DELETE, Arc::new(DeleteAdapter::new(endpoint)))
    }

    /// Expose `GET`, `PUT` and `DELETE` of an item endpoint.
    #[must_use]
    pub fn item<T: Gettable + Puttable + Deletable>(self, endpoint: &Arc<T>) -> Self {
        self.get(endpoint).put(endpoint).delete(endpoint)
    }

    /// Expose a closure for any verb, typically one of the configured extra
    /// verbs such as `PATCH`.
    #[must_use]
    pub fn verb<F>(self, method: Method, params: Vec<ParamSpec>, func: F) -> Self
    where
        F: Fn(Args) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler(method, Arc::new(FnHandler::new(params, func)))
    }

    /// Expose an arbitrary handler for `method`.
    #[must_use]
    pub fn handler(mut self, method: Method, handler: Arc<dyn Handler>) -> Self {
        match self.handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((method, handler)),
        }
        self
    }

    /// Endpoint name used in log events and [`Target`](crate::router::Target)s.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Handler for `method`, if exposed.
    #[must_use]
    pub fn handler_for(&self, method: &Method) -> Option<&Arc<dyn Handler>> {
        self.handlers
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, h)| h)
    }

    /// Exposed verbs in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.handlers.iter().map(|(m, _)| m)
    }

    /// `true` when no verb is exposed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("endpoint", &self.endpoint)
            .field("methods", &self.methods().collect::<Vec<_>>())
            .finish()
    }
}
