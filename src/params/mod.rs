//! # Params Module
//!
//! Parameter binding: turns a handler's declared parameter table into an
//! argument list for one request.
//!
//! Handlers declare their formal parameters as [`ParamSpec`]s (name, optional
//! [`ParamType`], default) once, at registration. Per request the
//! [`ParameterResolver`] looks each one up under up to three names (see
//! [`candidate_names`]) in the route captures, then in the request variables,
//! coerces what it finds with [`coerce`], and falls back to the default.
//!
//! ```rust
//! use apidispatch::params::{ParamSpec, ParameterResolver};
//! use apidispatch::request::Request;
//! use apidispatch::router::ParamVec;
//!
//! let req = Request::builder().uri("/orders?pageSize=25").build();
//! let captures = ParamVec::new();
//! let args = ParameterResolver::new(&captures, req.context())
//!     .resolve(&[ParamSpec::int("page_size", 10), ParamSpec::int("page", 1)]);
//!
//! assert_eq!(args.int("page_size"), Some(25));
//! assert_eq!(args.int("page"), Some(1));
//! ```

mod coerce;
mod names;
mod resolver;
mod spec;

pub use self::coerce::coerce;
pub use self::names::candidate_names;
pub use self::resolver::{ParamSource, ParameterResolver};
pub use self::spec::{ArgVec, Args, ParamSpec, ParamType};
