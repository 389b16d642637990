//! # Dispatcher Module
//!
//! Top-level request handling: one [`Response`](crate::response::Response)
//! per [`Request`](crate::request::Request).
//!
//! ## Request Flow
//!
//! 1. The route table is asked for a match on verb + path
//! 2. No match → 404; path known but verb unbound → 405
//! 3. For targets other than `GET`, a JSON body that is not an object
//!    short-circuits to 400 `malformed_json` without invoking the handler
//! 4. The handler's parameter table is resolved against captures and
//!    request variables
//! 5. The handler runs under panic recovery
//! 6. `Ok(response)` is returned as is; an error or panic goes to the
//!    optional [`ErrorHandler`] hook and otherwise becomes
//!    500 `unhandled_exception`
//!
//! ## Example
//!
//! ```rust
//! use apidispatch::dispatcher::Dispatcher;
//! use apidispatch::endpoint::{Capabilities, Endpoint, Gettable, HandlerResult};
//! use apidispatch::params::{Args, ParamSpec};
//! use apidispatch::request::Request;
//! use apidispatch::response::{Response, Status};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct Users;
//!
//! impl Gettable for Users {
//!     fn get_params(&self) -> Vec<ParamSpec> {
//!         vec![ParamSpec::int("user_id", 0)]
//!     }
//!     fn get(&self, args: Args) -> HandlerResult {
//!         Ok(Response::json(Status::Ok, json!({ "id": args.int("user_id") })))
//!     }
//! }
//!
//! impl Endpoint for Users {
//!     fn route_pattern(&self) -> &str {
//!         "/users/{user_id}"
//!     }
//!     fn capabilities(self: Arc<Self>) -> Capabilities {
//!         Capabilities::for_endpoint::<Self>().get(&self)
//!     }
//! }
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_endpoint(Arc::new(Users)).unwrap();
//!
//! let resp = dispatcher.dispatch(&Request::builder().uri("/users/7").build());
//! assert_eq!(resp.status(), Status::Ok);
//! assert_eq!(resp.json_data(), Some(&json!({ "id": 7 })));
//!
//! let resp = dispatcher.dispatch(
//!     &Request::builder().method(http::Method::DELETE).uri("/users/7").build(),
//! );
//! assert_eq!(resp.status(), Status::MethodNotAllowed);
//! ```

mod core;

pub use self::core::{Dispatcher, ErrorHandler, DEFAULT_VERBS};
pub use crate::error::HandlerFailure;
