//! Error types surfaced by the dispatch layer.
//!
//! Only [`DispatchError::HandlerFailure`] originates outside this crate; every
//! other variant is decided by the dispatcher itself and maps onto a fixed
//! response via [`DispatchError::into_response`].

use std::fmt;

use crate::response::{Response, Status};

/// Error id carried by the 400 response for undecodable JSON bodies.
pub const MALFORMED_JSON: &str = "malformed_json";

/// Error id carried by the generic 500 response.
pub const UNHANDLED_EXCEPTION: &str = "unhandled_exception";

/// Why a handler invocation did not produce a response.
#[derive(Debug)]
pub enum HandlerFailure {
    /// The handler returned `Err`.
    Error(anyhow::Error),
    /// The handler panicked; the payload is rendered as text.
    Panic(String),
}

impl HandlerFailure {
    /// Borrow the underlying error if the handler returned one.
    #[must_use]
    pub fn as_error(&self) -> Option<&anyhow::Error> {
        match self {
            HandlerFailure::Error(err) => Some(err),
            HandlerFailure::Panic(_) => None,
        }
    }

    /// Attempt to downcast a returned error to a concrete type.
    ///
    /// Error hooks use this to translate domain errors into responses.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.as_error().and_then(|err| err.downcast_ref::<E>())
    }
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerFailure::Error(err) => write!(f, "handler returned an error: {err:#}"),
            HandlerFailure::Panic(msg) => write!(f, "handler panicked: {msg}"),
        }
    }
}

impl std::error::Error for HandlerFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandlerFailure::Error(err) => Some(err.as_ref()),
            HandlerFailure::Panic(_) => None,
        }
    }
}

/// Outcome of a dispatch attempt that did not yield a handler response.
#[derive(Debug)]
pub enum DispatchError {
    /// No registered pattern matches the request path.
    RouteNotFound,
    /// The path matches but no target is bound for the request verb.
    VerbNotSupported,
    /// A JSON content type was declared but the body is not a JSON object.
    MalformedRequestBody,
    /// The target ran and failed.
    HandlerFailure(HandlerFailure),
}

impl DispatchError {
    /// HTTP status this error translates to when no error hook intervenes.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            DispatchError::RouteNotFound => Status::NotFound,
            DispatchError::VerbNotSupported => Status::MethodNotAllowed,
            DispatchError::MalformedRequestBody => Status::BadRequest,
            DispatchError::HandlerFailure(_) => Status::InternalServerError,
        }
    }

    /// Build the default response for this error.
    ///
    /// Routing misses produce bare status responses; body and handler
    /// failures produce JSON error documents.
    #[must_use]
    pub fn into_response(self) -> Response {
        match self {
            DispatchError::RouteNotFound | DispatchError::VerbNotSupported => {
                Response::new(self.status())
            }
            DispatchError::MalformedRequestBody => {
                Response::json_error(Status::BadRequest, MALFORMED_JSON, None)
            }
            DispatchError::HandlerFailure(_) => {
                Response::json_error(Status::InternalServerError, UNHANDLED_EXCEPTION, None)
            }
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::RouteNotFound => write!(f, "no route matches the request path"),
            DispatchError::VerbNotSupported => {
                write!(f, "the request path does not support this verb")
            }
            DispatchError::MalformedRequestBody => {
                write!(f, "request body declared as JSON is not a JSON object")
            }
            DispatchError::HandlerFailure(failure) => write!(f, "{failure}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::HandlerFailure(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<HandlerFailure> for DispatchError {
    fn from(failure: HandlerFailure) -> Self {
        DispatchError::HandlerFailure(failure)
    }
}

/// Route registration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern is empty or does not start with `/`.
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
    },
    /// A `{name:regex}` segment carries a regex that does not compile, a
    /// capture has no name, or a brace is left unclosed.
    InvalidConstraint {
        /// The pattern containing the segment
        pattern: String,
        /// The offending segment
        segment: String,
        /// Compiler message
        reason: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPattern { pattern } => {
                write!(f, "invalid route pattern '{pattern}': must start with '/'")
            }
            RouteError::InvalidConstraint {
                pattern,
                segment,
                reason,
            } => write!(
                f,
                "invalid segment '{segment}' in route pattern '{pattern}': {reason}"
            ),
        }
    }
}

impl std::error::Error for RouteError {}
