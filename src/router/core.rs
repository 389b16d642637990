use http::Method;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::pattern::{compile, CompiledPattern};
use crate::error::RouteError;

/// Maximum number of captures (and handler arguments) stored inline.
/// Most routes have at most a handful of named segments.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Named captures of a matched route: `(name, percent-decoded value)`.
///
/// Names are shared with the route table; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of looking a request up in a [`RouteTable`].
#[derive(Debug)]
pub enum RouteMatch<'a, T> {
    /// No pattern matches the path.
    NoMatch,
    /// Some pattern matches the path, but the request verb has no entry there
    /// or its first matching entry is unbound.
    MatchedNoVerb,
    /// A bound entry matches path and verb.
    Matched {
        /// The bound target
        target: &'a T,
        /// Named captures from the path
        captures: ParamVec,
        /// Full pattern of the entry (base path included)
        pattern: &'a str,
    },
}

impl<T> RouteMatch<'_, T> {
    /// Value of a capture by name. Last occurrence wins when a pattern
    /// repeats a name.
    #[must_use]
    pub fn get_capture(&self, name: &str) -> Option<&str> {
        match self {
            RouteMatch::Matched { captures, .. } => captures
                .iter()
                .rfind(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// `true` for [`RouteMatch::Matched`].
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, RouteMatch::Matched { .. })
    }
}

struct RouteEntry<T> {
    method: Method,
    pattern: Arc<str>,
    compiled: CompiledPattern,
    target: Option<T>,
}

/// Verb + pattern table mapping requests to targets.
///
/// Entries are registered per `(verb, pattern)`; an entry may be left
/// unbound (`None` target) so that a path the table knows about can be
/// answered with "verb not supported" rather than "not found". Each
/// `(verb, pattern)` holds at most one target: registering a target again
/// replaces the earlier one, while registering an unbound entry over an
/// existing one leaves it as it is. Lookup scans entries in registration order
/// and stops at the first entry matching both verb and path; when that entry is
/// unbound the result is [`RouteMatch::MatchedNoVerb`], even if a later pattern
/// would also match.
pub struct RouteTable<T> {
    base_path: String,
    entries: Vec<RouteEntry<T>>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    /// Empty table with no base path.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("")
    }

    /// Empty table whose patterns are all prefixed with `base_path`
    /// (e.g. `/api/v1`). A trailing `/` on the base path is ignored.
    #[must_use]
    pub fn with_base_path(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
            entries: Vec::new(),
        }
    }

    /// Prefix applied to every registered pattern.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Number of `(verb, pattern)` entries, bound or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register `target` for `method` on `pattern` (base path prepended).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the pattern does not start with `/` or a
    /// capture constraint is not a valid regex.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        target: Option<T>,
    ) -> Result<(), RouteError> {
        let full_pattern = format!("{}{}", self.base_path, pattern);

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.method == method && *e.pattern == *full_pattern)
        {
            if target.is_some() {
                warn!(
                    method = %method,
                    route_pattern = %full_pattern,
                    replaced_bound = entry.target.is_some(),
                    "Replacing existing route entry"
                );
                entry.target = target;
            }
            return Ok(());
        }

        let compiled = compile(&full_pattern)?;
        info!(
            method = %method,
            route_pattern = %full_pattern,
            params = ?compiled.params.iter().map(|(n, _)| n.as_ref()).collect::<Vec<_>>(),
            bound = target.is_some(),
            "Route registered"
        );
        self.entries.push(RouteEntry {
            method,
            pattern: Arc::from(full_pattern),
            compiled,
            target,
        });
        Ok(())
    }

    /// Look up `path` for `method`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_, T> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();
        let mut path_matched = false;

        for entry in &self.entries {
            if !entry.compiled.regex.is_match(path) {
                continue;
            }
            path_matched = true;
            if entry.method != *method {
                continue;
            }
            let Some(target) = entry.target.as_ref() else {
                info!(
                    method = %method,
                    path = %path,
                    route_pattern = %entry.pattern,
                    duration_us = match_start.elapsed().as_micros() as u64,
                    "Matched unbound entry, verb not supported"
                );
                return RouteMatch::MatchedNoVerb;
            };
            let Some(caps) = entry.compiled.regex.captures(path) else {
                continue;
            };

            let captures: ParamVec = entry
                .compiled
                .params
                .iter()
                .filter_map(|(name, group)| {
                    let raw = caps.name(group)?.as_str();
                    Some((Arc::clone(name), decode_segment(raw).into_owned()))
                })
                .collect();

            info!(
                method = %method,
                path = %path,
                route_pattern = %entry.pattern,
                captures = ?captures,
                duration_us = match_start.elapsed().as_micros() as u64,
                "Route matched"
            );
            return RouteMatch::Matched {
                target,
                captures,
                pattern: &entry.pattern,
            };
        }

        let duration_us = match_start.elapsed().as_micros() as u64;
        if path_matched {
            info!(method = %method, path = %path, duration_us, "Path matched but verb not supported");
            RouteMatch::MatchedNoVerb
        } else {
            warn!(method = %method, path = %path, duration_us, "No route matched");
            RouteMatch::NoMatch
        }
    }

    /// Registered entries as `(verb, full pattern, bound)`, in registration
    /// order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str, bool)> {
        self.entries
            .iter()
            .map(|e| (&e.method, e.pattern.as_ref(), e.target.is_some()))
    }

    /// Log every entry at `info`.
    pub fn dump_routes(&self) {
        info!(base_path = %self.base_path, count = self.entries.len(), "Route table");
        for (method, pattern, bound) in self.routes() {
            info!(method = %method, route_pattern = %pattern, bound, "Route entry");
        }
    }
}

/// Percent-decode a captured segment, keeping the raw text when it does not
/// decode to UTF-8.
fn decode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}
