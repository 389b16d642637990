//! # Router Module
//!
//! Verb + pattern route table used by the [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route patterns into anchored regexes at registration time
//! - Matching incoming request paths and verbs against registered entries
//! - Extracting (percent-decoded) named captures from matched paths
//! - Distinguishing "no such path" from "path known, verb not supported"
//!
//! ## Pattern syntax
//!
//! | Segment | Matches |
//! |---|---|
//! | `users` | the literal text `users` |
//! | `{id}` | any non-empty segment, captured as `id` |
//! | `{id:\d+}` | a segment matching `\d+`, captured as `id` |
//!
//! `/` matches only the root path. Every pattern is prefixed with the table's
//! base path.
//!
//! ## Example
//!
//! ```rust
//! use apidispatch::router::{RouteMatch, RouteTable};
//! use http::Method;
//!
//! let mut table: RouteTable<&str> = RouteTable::with_base_path("/api");
//! table.register(Method::GET, "/users/{id:\\d+}", Some("show_user")).unwrap();
//! table.register(Method::DELETE, "/users/{id:\\d+}", None).unwrap();
//!
//! let m = table.match_route(&Method::GET, "/api/users/7");
//! assert_eq!(m.get_capture("id"), Some("7"));
//!
//! assert!(matches!(
//!     table.match_route(&Method::DELETE, "/api/users/7"),
//!     RouteMatch::MatchedNoVerb
//! ));
//! assert!(matches!(
//!     table.match_route(&Method::GET, "/users/7"),
//!     RouteMatch::NoMatch
//! ));
//! ```
//!
//! ## Performance
//!
//! Matching is a linear scan over compiled patterns in registration order.
//! Captures are stored inline ([`ParamVec`]) for up to
//! [`MAX_INLINE_PARAMS`] names, so typical matches do not allocate for the
//! capture list itself.

mod core;
mod pattern;
mod target;

pub use self::core::{ParamVec, RouteMatch, RouteTable, MAX_INLINE_PARAMS};
pub use self::target::Target;
