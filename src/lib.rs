//! # apidispatch
//!
//! **apidispatch** is a small request dispatch layer: it maps HTTP-style requests to verb methods
//! on endpoint objects, binds handler parameters from path captures, body and query variables,
//! and turns handler results (or failures) into responses that are realized on a transport.
//!
//! ## Overview
//!
//! apidispatch deliberately stays below the level of a web framework. There are no middleware
//! chains, no content negotiation beyond JSON and no connection handling: a server loop hands it
//! a [`Request`], gets back exactly one [`Response`] and writes it to whatever
//! [`Transport`](response::Transport) it owns.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`router`]** - Verb + pattern route table with `{name}` / `{name:regex}` captures
//! - **[`request`]** - Inbound request, its memoized [`RequestContext`] and client information
//! - **[`params`]** - Parameter tables, name normalization, coercion and resolution
//! - **[`endpoint`]** - Endpoint trait and per-verb capability traits
//! - **[`dispatcher`]** - Orchestration, malformed-JSON short-circuit and error hook
//! - **[`response`]** - Status codes, response variants and transports
//! - **[`config`]** - YAML and environment configuration
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`error`]** - Dispatch and route registration errors
//! - **[`ids`]** - Request correlation ids
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Server
//!     participant Dispatcher
//!     participant RouteTable
//!     participant Context as RequestContext
//!     participant Resolver as ParameterResolver
//!     participant Handler
//!
//!     Server->>Dispatcher: dispatch(&request)
//!     Dispatcher->>RouteTable: match_route(method, path)
//!     RouteTable-->>Dispatcher: Matched(target, captures)
//!     Dispatcher->>Context: request.context() (built once)
//!     Context-->>Dispatcher: has_malformed_json()?
//!     Dispatcher->>Resolver: resolve(handler.params())
//!     Resolver-->>Dispatcher: Args
//!     Dispatcher->>Handler: call(args) under catch_unwind
//!     Handler-->>Dispatcher: Ok(Response) / Err / panic
//!     Dispatcher-->>Server: Response
//!     Server->>Server: response.realize(&mut transport)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use apidispatch::endpoint::{Capabilities, Deletable, Endpoint, Gettable, HandlerResult, Puttable};
//! use apidispatch::params::{Args, ParamSpec, ParamType};
//! use apidispatch::response::{BufferedTransport, Response, Status};
//! use apidispatch::{Dispatcher, Request};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct Article;
//!
//! impl Gettable for Article {
//!     fn get_params(&self) -> Vec<ParamSpec> {
//!         vec![ParamSpec::int("article_id", 0), ParamSpec::bool("with_comments", false)]
//!     }
//!     fn get(&self, args: Args) -> HandlerResult {
//!         Ok(Response::json(
//!             Status::Ok,
//!             json!({ "id": args.int("article_id"), "comments": args.bool("with_comments") }),
//!         ))
//!     }
//! }
//!
//! impl Puttable for Article {
//!     fn put_params(&self) -> Vec<ParamSpec> {
//!         vec![ParamSpec::optional("title", ParamType::String)]
//!     }
//!     fn put(&self, args: Args) -> HandlerResult {
//!         match args.str("title") {
//!             Some(_) => Ok(Response::new(Status::NoContent)),
//!             None => Ok(Response::json_error(Status::BadRequest, "missing_title", None)),
//!         }
//!     }
//! }
//!
//! impl Deletable for Article {
//!     fn delete(&self, _args: Args) -> HandlerResult {
//!         Ok(Response::new(Status::NoContent))
//!     }
//! }
//!
//! impl Endpoint for Article {
//!     fn route_pattern(&self) -> &str {
//!         "/articles/{article_id:\\d+}"
//!     }
//!     fn capabilities(self: Arc<Self>) -> Capabilities {
//!         Capabilities::for_endpoint::<Self>().item(&self)
//!     }
//! }
//!
//! let mut dispatcher = Dispatcher::with_base_path("/api");
//! dispatcher.register_endpoint(Arc::new(Article)).unwrap();
//!
//! let request = Request::builder()
//!     .uri("/api/articles/12?withComments=yes")
//!     .build();
//! let mut transport = BufferedTransport::new();
//! dispatcher.serve(&request, &mut transport).unwrap();
//!
//! assert_eq!(transport.status(), Some(Status::Ok));
//! assert_eq!(transport.body_json().unwrap(), json!({ "id": 12, "comments": true }));
//! ```
//!
//! ## Logging
//!
//! Every stage emits structured `tracing` events (`request_id`, `method`, `path`,
//! `route_pattern`, `status`, `duration_us`). Install a subscriber with
//! [`logging::init_logging`] or bring your own.

pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod ids;
pub mod logging;
pub mod params;
pub mod request;
pub mod response;
pub mod router;

pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, HandlerFailure, RouteError};
pub use request::{Request, RequestContext};
pub use response::{Response, Status};
