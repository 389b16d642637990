use regex::Regex;
use std::sync::Arc;

use crate::error::RouteError;

/// A route pattern compiled to an anchored regex.
///
/// Captures are exposed through synthetic group names (`p0`, `p1`, ...) so
/// that groups inside user constraints never shift capture positions.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    pub(crate) regex: Regex,
    /// `(parameter name, regex group name)` in pattern order
    pub(crate) params: Vec<(Arc<str>, String)>,
}

/// Compile a pattern such as `/users/{id:\d+}/posts/{slug}`.
///
/// - static segments match literally;
/// - `{name}` matches one non-empty segment;
/// - `{name:regex}` matches `regex`, which may itself contain `/`;
/// - empty segments are ignored, so `/users/` is the same as `/users`;
/// - `/` matches only the root.
pub(crate) fn compile(pattern: &str) -> Result<CompiledPattern, RouteError> {
    if !pattern.starts_with('/') {
        return Err(RouteError::InvalidPattern {
            pattern: pattern.to_string(),
        });
    }

    let mut source = String::with_capacity(pattern.len() + 16);
    source.push('^');
    let mut params = Vec::with_capacity(pattern.matches('{').count());

    for segment in split_segments(pattern)? {
        source.push('/');
        let Some(inner) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        else {
            source.push_str(&regex::escape(segment));
            continue;
        };

        let (name, constraint) = match inner.split_once(':') {
            Some((name, constraint)) => (name.trim(), constraint),
            None => (inner.trim(), "[^/]+"),
        };
        if name.is_empty() {
            return Err(RouteError::InvalidConstraint {
                pattern: pattern.to_string(),
                segment: segment.to_string(),
                reason: "capture has no name".to_string(),
            });
        }
        if let Err(e) = Regex::new(constraint) {
            return Err(RouteError::InvalidConstraint {
                pattern: pattern.to_string(),
                segment: segment.to_string(),
                reason: e.to_string(),
            });
        }

        let group = format!("p{}", params.len());
        source.push_str(&format!("(?P<{group}>{constraint})"));
        params.push((Arc::from(name), group));
    }

    if source.len() == 1 {
        source.push('/');
    }
    source.push('$');

    let regex = Regex::new(&source).map_err(|e| RouteError::InvalidConstraint {
        pattern: pattern.to_string(),
        segment: pattern.to_string(),
        reason: e.to_string(),
    })?;

    Ok(CompiledPattern { regex, params })
}

/// Split on `/` outside of braces, dropping empty segments.
///
/// Inside a capture a `\` escapes the next character, so `\{` and `\}` do
/// not count towards brace balance.
fn split_segments(pattern: &str) -> Result<Vec<&str>, RouteError> {
    let unbalanced = |segment: &str| RouteError::InvalidConstraint {
        pattern: pattern.to_string(),
        segment: segment.to_string(),
        reason: "unbalanced braces".to_string(),
    };

    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if depth > 0 => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| unbalanced(&pattern[start..=i]))?;
            }
            '/' if depth == 0 => {
                segments.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced(&pattern[start..]));
    }
    segments.push(&pattern[start..]);
    segments.retain(|s| !s.is_empty());
    Ok(segments)
}
