//! # Request Module
//!
//! Inbound request representation and the per-request variable view.
//!
//! - [`Request`]: verb, path, query string, headers, body and peer address.
//!   Built with [`Request::builder`], from an `http::Request`, or from CGI
//!   meta-variables with [`Request::from_cgi`].
//! - [`RequestContext`]: decoded JSON body, form body and query variables,
//!   plus the malformed-JSON flag. Obtained through [`Request::context`],
//!   which decodes at most once per request.
//! - [`ClientInfo`]: remote address and user agent.
//!
//! A context belongs to exactly one request; nothing here is process-wide.
//!
//! ```rust
//! use apidispatch::request::Request;
//! use http::Method;
//!
//! let req = Request::builder()
//!     .method(Method::POST)
//!     .uri("/users?notify=1")
//!     .header("Content-Type", "application/json")
//!     .body(r#"{"user_name":"ada"}"#)
//!     .build();
//!
//! let ctx = req.context();
//! assert!(!ctx.has_malformed_json());
//! assert_eq!(ctx.get_var("user_name").unwrap(), "ada");
//! assert_eq!(ctx.get_var("notify").unwrap(), "1");
//! ```

mod client;
mod context;
mod core;

pub use self::client::ClientInfo;
pub use self::context::RequestContext;
pub use self::core::{Request, RequestBuilder};
