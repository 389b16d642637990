use serde_json::Value;
use tracing::debug;

use super::coerce::coerce;
use super::spec::{ArgVec, Args, ParamSpec};
use crate::request::RequestContext;
use crate::router::ParamVec;

/// Where a resolved argument came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// A named capture of the matched route
    Capture,
    /// A body, form or query variable
    Request,
    /// The declared default (nothing found, or coercion failed)
    Default,
}

/// Binds declared parameters to values from route captures and the request.
///
/// For each parameter, in declaration order:
///
/// 1. captures are searched with each lookup name in priority order;
/// 2. failing that, request variables are searched the same way, skipping
///    `null` values;
/// 3. a found value is coerced to the declared type, if any; a value that
///    cannot be coerced is replaced by the default;
/// 4. with nothing found, the default is used.
///
/// Resolution never fails.
#[derive(Debug, Clone, Copy)]
pub struct ParameterResolver<'a> {
    captures: &'a ParamVec,
    context: &'a RequestContext,
}

impl<'a> ParameterResolver<'a> {
    /// Resolver over one request's captures and variables.
    #[must_use]
    pub fn new(captures: &'a ParamVec, context: &'a RequestContext) -> Self {
        Self { captures, context }
    }

    /// Argument list matching `specs` in length and order.
    #[must_use]
    pub fn resolve(&self, specs: &[ParamSpec]) -> Args {
        let mut values = ArgVec::with_capacity(specs.len());
        for spec in specs {
            let (value, source) = self.resolve_one(spec);
            debug!(
                param = %spec.name(),
                source = ?source,
                value = %value,
                "Parameter resolved"
            );
            values.push((spec.shared_name(), value));
        }
        Args::from_vec(values)
    }

    /// Value for one parameter and where it came from.
    #[must_use]
    pub fn resolve_one(&self, spec: &ParamSpec) -> (Value, ParamSource) {
        let Some((raw, source)) = self.find(spec) else {
            return (spec.default_value().clone(), ParamSource::Default);
        };
        let Some(ty) = spec.ty() else {
            return (raw, source);
        };
        match coerce(&raw, ty) {
            Some(value) => (value, source),
            None => {
                debug!(
                    param = %spec.name(),
                    declared_type = %ty,
                    raw = %raw,
                    "Coercion failed, using default"
                );
                (spec.default_value().clone(), ParamSource::Default)
            }
        }
    }

    fn find(&self, spec: &ParamSpec) -> Option<(Value, ParamSource)> {
        let names = spec.lookup_names();

        let captured = names.iter().find_map(|name| {
            self.captures
                .iter()
                .rfind(|(k, _)| k.as_ref() == name.as_ref())
                .map(|(_, v)| v)
        });
        if let Some(value) = captured {
            return Some((Value::String(value.clone()), ParamSource::Capture));
        }

        names
            .iter()
            .find_map(|name| self.context.get_var(name).filter(|v| !v.is_null()))
            .map(|value| (value.clone(), ParamSource::Request))
    }
}
