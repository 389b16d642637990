//! # Response Module
//!
//! Responses are built by handlers (or by the dispatcher's error path) and
//! realized exactly once at the end of the request.
//!
//! ## Flavours
//!
//! - [`Response::new`] / [`Response::with_content`]: status plus optional fixed
//!   body. The body, with `Content-Type` and `Content-Length`, is only emitted
//!   when both a MIME type and non-empty content are present.
//! - [`Response::json`]: pretty-printed JSON, streamed without a length.
//! - [`Response::json_error`]: `{"error": id, "errorDetails": details}`.
//! - [`Response::file`]: streams a file, or realizes a fallback (404 by
//!   default) when the file is missing.
//! - [`Response::deferred`]: the body comes from a callback invoked after
//!   status and extra headers are out; no `Content-Type` is sent for it.
//!
//! ## Realization
//!
//! ```rust
//! use apidispatch::response::{BufferedTransport, Response, Status};
//!
//! let mut transport = BufferedTransport::new();
//! Response::json_error(Status::NotFound, "no_such_user", None)
//!     .realize(&mut transport)
//!     .unwrap();
//! assert_eq!(transport.status(), Some(Status::NotFound));
//! assert_eq!(transport.body_json().unwrap()["error"], "no_such_user");
//! ```

mod core;
mod transport;
mod view;

pub use self::core::{
    ContentProducer, HeaderVec, Response, Status, JSON_MIME, MAX_INLINE_HEADERS,
};
pub use self::transport::{BufferedTransport, Transport, WireTransport};
pub use self::view::JsonView;
