use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use super::core::Request;

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Read-only view of the variables a request carries.
///
/// Built once per request by [`Request::context`] and never mutated
/// afterwards. The body is only decoded as JSON when the declared content
/// type starts with `application/json`:
///
/// - a JSON object becomes the body variables;
/// - anything else (invalid syntax, `null`, arrays, scalars, an empty body)
///   marks the body as malformed and leaves the body variables empty.
///
/// Invalid syntax and a literal `null` are deliberately indistinguishable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    body_vars: Map<String, Value>,
    form_vars: HashMap<String, Value>,
    query_vars: HashMap<String, Value>,
    malformed_json: bool,
}

impl RequestContext {
    /// Decode the body, form and query variables of `req`.
    #[must_use]
    pub fn from_request(req: &Request) -> Self {
        let content_type = req.content_type().unwrap_or("");
        let mut ctx = RequestContext {
            query_vars: parse_urlencoded(req.query_string().as_bytes()),
            ..Default::default()
        };

        if content_type.starts_with(JSON_CONTENT_TYPE) {
            match serde_json::from_slice::<Value>(req.body()) {
                Ok(Value::Object(map)) => ctx.body_vars = map,
                Ok(other) => {
                    debug!(
                        request_id = %req.request_id(),
                        json_type = json_type_name(&other),
                        "JSON body is not an object"
                    );
                    ctx.malformed_json = true;
                }
                Err(e) => {
                    debug!(
                        request_id = %req.request_id(),
                        error = %e,
                        body_size_bytes = req.body().len(),
                        "JSON body parse failed"
                    );
                    ctx.malformed_json = true;
                }
            }
        } else if content_type.starts_with(FORM_CONTENT_TYPE) {
            ctx.form_vars = parse_urlencoded(req.body());
        }

        debug!(
            request_id = %req.request_id(),
            content_type = %content_type,
            body_fields = ctx.body_vars.len(),
            form_fields = ctx.form_vars.len(),
            query_fields = ctx.query_vars.len(),
            malformed_json = ctx.malformed_json,
            "Request context built"
        );
        ctx
    }

    /// Look up a variable: JSON body first, then form body, then query string.
    ///
    /// The first source that contains the key wins, even when its value is
    /// `null` or an empty string.
    #[must_use]
    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.body_vars
            .get(name)
            .or_else(|| self.form_vars.get(name))
            .or_else(|| self.query_vars.get(name))
    }

    /// `true` when a JSON content type was declared but the body did not
    /// decode to a JSON object.
    #[must_use]
    pub fn has_malformed_json(&self) -> bool {
        self.malformed_json
    }

    /// Decoded JSON body object (empty unless the body was a JSON object).
    #[must_use]
    pub fn json_data(&self) -> &Map<String, Value> {
        &self.body_vars
    }
}

/// Last occurrence of a repeated key wins.
fn parse_urlencoded(input: &[u8]) -> HashMap<String, Value> {
    url::form_urlencoded::parse(input)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
