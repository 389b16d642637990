//! # Endpoint Module
//!
//! Endpoints are the objects requests are dispatched to. Each endpoint owns a
//! route pattern and declares which verbs it answers through the capability
//! traits [`Gettable`], [`Postable`], [`Puttable`] and [`Deletable`] (plus
//! closures for extra verbs). Registration iterates only the declared
//! capabilities, so there is no runtime probing for methods.
//!
//! Every verb method declares its parameters as a [`ParamSpec`](crate::params::ParamSpec)
//! table and receives resolved [`Args`](crate::params::Args). It returns a
//! [`HandlerResult`]; errors go to the dispatcher's error hook.

mod capability;
mod handler;

pub use self::capability::{
    Capabilities, Deletable, Endpoint, Gettable, ItemEndpoint, Postable, Puttable,
};
pub use self::handler::{FnHandler, Handler, HandlerResult};
