use serde::de::DeserializeOwned;
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::names::candidate_names;
use crate::router::MAX_INLINE_PARAMS;

/// Type tag a handler parameter may declare.
///
/// Raw values are coerced to the declared type by
/// [`coerce`](super::coerce); see there for the exact rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Signed 64-bit integer
    Int,
    /// Finite 64-bit float
    Float,
    /// Boolean
    Bool,
    /// String
    String,
    /// JSON array (scalars are wrapped)
    Array,
    /// JSON object
    Object,
    /// Any JSON value, passed through
    Json,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::String => "string",
            ParamType::Array => "array",
            ParamType::Object => "object",
            ParamType::Json => "json",
        };
        f.write_str(s)
    }
}

/// Declared formal parameter of a handler: name, optional type, default.
///
/// Every parameter carries a default, which is what binding falls back to
/// when no source provides a usable value. Lookup names are derived once, at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    name: Arc<str>,
    ty: Option<ParamType>,
    default: Value,
    lookup_names: SmallVec<[Arc<str>; 3]>,
}

impl ParamSpec {
    /// Untyped parameter; any found value is passed through unchanged.
    #[must_use]
    pub fn new(name: &str, default: impl Into<Value>) -> Self {
        let lookup_names = candidate_names(name)
            .into_iter()
            .map(Arc::from)
            .collect();
        Self {
            name: Arc::from(name),
            ty: None,
            default: default.into(),
            lookup_names,
        }
    }

    /// Declare the parameter's type.
    #[must_use]
    pub fn typed(mut self, ty: ParamType) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Integer parameter.
    #[must_use]
    pub fn int(name: &str, default: i64) -> Self {
        Self::new(name, default).typed(ParamType::Int)
    }

    /// Float parameter.
    #[must_use]
    pub fn float(name: &str, default: f64) -> Self {
        Self::new(name, default).typed(ParamType::Float)
    }

    /// Boolean parameter.
    #[must_use]
    pub fn bool(name: &str, default: bool) -> Self {
        Self::new(name, default).typed(ParamType::Bool)
    }

    /// String parameter.
    #[must_use]
    pub fn string(name: &str, default: &str) -> Self {
        Self::new(name, default).typed(ParamType::String)
    }

    /// Array parameter defaulting to `[]`.
    #[must_use]
    pub fn array(name: &str) -> Self {
        Self::new(name, Value::Array(Vec::new())).typed(ParamType::Array)
    }

    /// Typed parameter defaulting to `null`.
    #[must_use]
    pub fn optional(name: &str, ty: ParamType) -> Self {
        Self::new(name, Value::Null).typed(ty)
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type, if any.
    #[must_use]
    pub fn ty(&self) -> Option<ParamType> {
        self.ty
    }

    /// Declared default.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Names searched for this parameter, highest priority first.
    #[must_use]
    pub fn lookup_names(&self) -> &[Arc<str>] {
        &self.lookup_names
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}

/// Resolved arguments keyed by declared name.
pub type ArgVec = SmallVec<[(Arc<str>, Value); MAX_INLINE_PARAMS]>;

/// Positional argument list handed to a handler.
///
/// Same length and order as the handler's declared parameters. Values are
/// reachable by position or by declared name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: ArgVec,
}

impl Args {
    pub(crate) fn from_vec(values: ArgVec) -> Self {
        Self { values }
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when the handler declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument by declared name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Argument by position.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, v)| v)
    }

    /// String argument.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Integer argument.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Float argument (integers widen).
    #[must_use]
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Boolean argument.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Deserialize an argument into `T`.
    pub fn parse<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("no parameter named '{name}'"))?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Values in declaration order.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values.into_iter().map(|(_, v)| v).collect()
    }
}
