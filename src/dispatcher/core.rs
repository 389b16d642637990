use http::Method;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::DispatchConfig;
use crate::endpoint::Endpoint;
use crate::error::{DispatchError, HandlerFailure, RouteError};
use crate::params::ParameterResolver;
use crate::request::Request;
use crate::response::{Response, Transport};
use crate::router::{RouteMatch, RouteTable, Target};

/// Hook that may turn a handler failure into a response.
///
/// Returning `None` falls through to the generic 500 `unhandled_exception`
/// response.
pub type ErrorHandler = Arc<dyn Fn(&HandlerFailure) -> Option<Response> + Send + Sync>;

/// Verbs every dispatcher routes.
pub const DEFAULT_VERBS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Maps requests to endpoint targets and turns their outcome into a
/// [`Response`].
///
/// The dispatcher is immutable while serving; share it behind an `Arc` across
/// request threads. All per-request state lives in the [`Request`].
pub struct Dispatcher {
    routes: RouteTable<Target>,
    verbs: Vec<Method>,
    error_handler: Option<ErrorHandler>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher with no base path and the default verb set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("")
    }

    /// Dispatcher whose route patterns are prefixed with `base_path`.
    #[must_use]
    pub fn with_base_path(base_path: &str) -> Self {
        Self {
            routes: RouteTable::with_base_path(base_path),
            verbs: DEFAULT_VERBS.to_vec(),
            error_handler: None,
        }
    }

    /// Dispatcher configured from a [`DispatchConfig`].
    ///
    /// # Errors
    ///
    /// Fails when an extra verb is not a valid HTTP method token.
    pub fn from_config(config: &DispatchConfig) -> anyhow::Result<Self> {
        let mut dispatcher = Self::with_base_path(&config.base_path);
        for method in config.extra_methods()? {
            dispatcher.add_verb(method);
        }
        info!(
            base_path = %dispatcher.routes.base_path(),
            verbs = ?dispatcher.verbs,
            "Dispatcher configured"
        );
        Ok(dispatcher)
    }

    /// Add a verb to the routed set. Endpoints registered afterwards get an
    /// entry for it.
    pub fn add_verb(&mut self, method: Method) {
        if !self.verbs.contains(&method) {
            self.verbs.push(method);
        }
    }

    /// Builder form of [`Dispatcher::add_verb`].
    #[must_use]
    pub fn with_verb(mut self, method: Method) -> Self {
        self.add_verb(method);
        self
    }

    /// Routed verbs.
    #[must_use]
    pub fn verbs(&self) -> &[Method] {
        &self.verbs
    }

    /// Install the handler-failure hook, replacing any previous one.
    pub fn set_error_handler<F>(&mut self, hook: F)
    where
        F: Fn(&HandlerFailure) -> Option<Response> + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(hook));
    }

    /// Builder form of [`Dispatcher::set_error_handler`].
    #[must_use]
    pub fn with_error_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HandlerFailure) -> Option<Response> + Send + Sync + 'static,
    {
        self.set_error_handler(hook);
        self
    }

    /// The underlying route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable<Target> {
        &self.routes
    }

    /// Register an endpoint under its route pattern.
    ///
    /// One entry is added per routed verb: bound to the endpoint's handler
    /// when it exposes that verb, unbound otherwise. Handlers for verbs
    /// outside the routed set are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the endpoint's pattern is invalid.
    pub fn register_endpoint<E: Endpoint>(&mut self, endpoint: Arc<E>) -> Result<(), RouteError> {
        let pattern = endpoint.route_pattern().to_string();
        let capabilities = endpoint.capabilities();
        let name: Arc<str> = Arc::from(capabilities.endpoint());

        for method in capabilities.methods() {
            if !self.verbs.contains(method) {
                warn!(
                    endpoint = %name,
                    method = %method,
                    route_pattern = %pattern,
                    "Capability for a verb that is not routed; ignoring"
                );
            }
        }

        for method in &self.verbs {
            let target = capabilities
                .handler_for(method)
                .map(|h| Target::new(Arc::clone(&name), method.clone(), Arc::clone(h)));
            self.routes.register(method.clone(), &pattern, target)?;
        }

        info!(
            endpoint = %name,
            route_pattern = %pattern,
            methods = ?capabilities.methods().collect::<Vec<_>>(),
            "Endpoint registered"
        );
        Ok(())
    }

    /// Dispatch `req`, reporting every non-success outcome as an error.
    ///
    /// The error hook is not consulted here; see [`Dispatcher::dispatch`].
    ///
    /// # Errors
    ///
    /// - [`DispatchError::RouteNotFound`] when no pattern matches the path
    /// - [`DispatchError::VerbNotSupported`] when the path matches but the
    ///   verb has no target
    /// - [`DispatchError::MalformedRequestBody`] for a non-`GET` target and a
    ///   JSON body that is not an object
    /// - [`DispatchError::HandlerFailure`] when the target returns an error or
    ///   panics
    pub fn try_dispatch(&self, req: &Request) -> Result<Response, DispatchError> {
        let start = Instant::now();
        let request_id = req.request_id();

        let (target, captures, pattern) =
            match self.routes.match_route(req.method(), req.path()) {
                RouteMatch::Matched {
                    target,
                    captures,
                    pattern,
                } => (target, captures, pattern),
                RouteMatch::NoMatch => {
                    info!(
                        request_id = %request_id,
                        method = %req.method(),
                        path = %req.path(),
                        status = 404,
                        "Route not found"
                    );
                    return Err(DispatchError::RouteNotFound);
                }
                RouteMatch::MatchedNoVerb => {
                    info!(
                        request_id = %request_id,
                        method = %req.method(),
                        path = %req.path(),
                        status = 405,
                        "Verb not supported"
                    );
                    return Err(DispatchError::VerbNotSupported);
                }
            };

        let context = req.context();
        if target.reads_body() && context.has_malformed_json() {
            warn!(
                request_id = %request_id,
                method = %req.method(),
                path = %req.path(),
                content_type = ?req.content_type(),
                body_len = req.body().len(),
                "Malformed JSON body; handler not invoked"
            );
            return Err(DispatchError::MalformedRequestBody);
        }

        let handler = target.handler();
        let args = ParameterResolver::new(&captures, context).resolve(handler.params());

        debug!(
            request_id = %request_id,
            endpoint = %target.endpoint(),
            method = %target.method(),
            route_pattern = %pattern,
            arg_count = args.len(),
            "Handler invoked"
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.call(args)));
        let duration_us = start.elapsed().as_micros() as u64;

        match outcome {
            Ok(Ok(response)) => {
                info!(
                    request_id = %request_id,
                    endpoint = %target.endpoint(),
                    method = %req.method(),
                    path = %req.path(),
                    status = response.status().code(),
                    duration_us,
                    "Handler completed"
                );
                Ok(response)
            }
            Ok(Err(err)) => {
                error!(
                    request_id = %request_id,
                    endpoint = %target.endpoint(),
                    method = %req.method(),
                    path = %req.path(),
                    error = %format!("{err:#}"),
                    duration_us,
                    "Handler returned an error"
                );
                Err(DispatchError::HandlerFailure(HandlerFailure::Error(err)))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    request_id = %request_id,
                    endpoint = %target.endpoint(),
                    method = %req.method(),
                    path = %req.path(),
                    panic_message = %message,
                    duration_us,
                    "Handler panicked"
                );
                Err(DispatchError::HandlerFailure(HandlerFailure::Panic(message)))
            }
        }
    }

    /// Dispatch `req`; always yields a response.
    ///
    /// Handler failures go through the error hook first; everything else uses
    /// [`DispatchError::into_response`].
    #[must_use]
    pub fn dispatch(&self, req: &Request) -> Response {
        match self.try_dispatch(req) {
            Ok(response) => response,
            Err(DispatchError::HandlerFailure(failure)) => {
                if let Some(response) = self.error_handler.as_ref().and_then(|hook| hook(&failure)) {
                    debug!(
                        request_id = %req.request_id(),
                        status = response.status().code(),
                        "Error hook produced a response"
                    );
                    return response;
                }
                DispatchError::HandlerFailure(failure).into_response()
            }
            Err(err) => err.into_response(),
        }
    }

    /// Dispatch `req` and realize the response on `transport`.
    ///
    /// # Errors
    ///
    /// Propagates transport write errors.
    pub fn serve<T: Transport + ?Sized>(&self, req: &Request, transport: &mut T) -> io::Result<()> {
        self.dispatch(req).realize(transport)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
