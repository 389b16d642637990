use std::fmt;

use crate::params::{Args, ParamSpec};
use crate::response::Response;

/// What a target returns: a response, or an error for the dispatcher's error
/// hook.
pub type HandlerResult = anyhow::Result<Response>;

/// A callable dispatch target with a static parameter table.
///
/// The parameter table is read once per request to resolve [`Args`]; it
/// should not change after registration.
pub trait Handler: Send + Sync + 'static {
    /// Declared formal parameters, in call order.
    fn params(&self) -> &[ParamSpec];

    /// Invoke the target with resolved arguments.
    fn call(&self, args: Args) -> HandlerResult;
}

/// [`Handler`] backed by a closure.
pub struct FnHandler<F> {
    params: Vec<ParamSpec>,
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(Args) -> HandlerResult + Send + Sync + 'static,
{
    /// Wrap `func`, which receives arguments resolved against `params`.
    pub fn new(params: Vec<ParamSpec>, func: F) -> Self {
        Self { params, func }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(Args) -> HandlerResult + Send + Sync + 'static,
{
    fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn call(&self, args: Args) -> HandlerResult {
        (self.func)(args)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
