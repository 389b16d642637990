use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::transport::Transport;

/// Maximum extra headers stored inline before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 8;

/// Extra header storage; names are shared, values are per-response.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Callback producing the body of a [`Response::deferred`] response.
pub type ContentProducer = Box<dyn FnOnce() -> Vec<u8> + Send>;

/// MIME type emitted by JSON responses.
pub const JSON_MIME: &str = "application/json";

/// Chunk size used when streaming file-backed responses.
const FILE_CHUNK_SIZE: usize = 16 * 1024;

/// Status codes a response may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Status {
    /// 200
    Ok = 200,
    /// 201
    Created = 201,
    /// 204
    NoContent = 204,
    /// 400, generic client error
    BadRequest = 400,
    /// 401, not logged in
    Unauthorized = 401,
    /// 403, logged in but not permitted
    Forbidden = 403,
    /// 404
    NotFound = 404,
    /// 405
    MethodNotAllowed = 405,
    /// 500
    InternalServerError = 500,
    /// 501, coming soon
    NotImplemented = 501,
}

impl Status {
    /// Numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Canonical reason phrase.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::NoContent => "No Content",
            Status::BadRequest => "Bad Request",
            Status::Unauthorized => "Unauthorized",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
        }
    }

    /// Look up a status by numeric code; codes outside the supported set
    /// yield `None`.
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            200 => Status::Ok,
            201 => Status::Created,
            204 => Status::NoContent,
            400 => Status::BadRequest,
            401 => Status::Unauthorized,
            403 => Status::Forbidden,
            404 => Status::NotFound,
            405 => Status::MethodNotAllowed,
            500 => Status::InternalServerError,
            501 => Status::NotImplemented,
            _ => return None,
        })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

impl TryFrom<u16> for Status {
    type Error = u16;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Status::from_code(code).ok_or(code)
    }
}

impl From<Status> for http::StatusCode {
    fn from(status: Status) -> Self {
        // Every variant is a valid 2xx/4xx/5xx code.
        http::StatusCode::from_u16(status.code()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

enum Content {
    Fixed {
        mime: Option<String>,
        content: Option<Vec<u8>>,
    },
    Json(Value),
    File {
        path: PathBuf,
        mime: String,
        not_found: Box<Response>,
    },
    Deferred {
        mime: String,
        produce: ContentProducer,
    },
}

/// A response waiting to be realized against a [`Transport`].
///
/// Every flavour (plain, JSON, JSON error, file-backed, deferred) is realized
/// through [`Response::realize`]; callers never inspect which one they hold.
/// Extra headers may be accumulated until realization.
pub struct Response {
    status: Status,
    headers: HeaderVec,
    content: Content,
}

impl Response {
    /// Status-only response with no body.
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            content: Content::Fixed {
                mime: None,
                content: None,
            },
        }
    }

    /// Response with a fixed body.
    ///
    /// The body and its `Content-Type`/`Content-Length` headers are only
    /// emitted when the content is non-empty.
    #[must_use]
    pub fn with_content(status: Status, mime: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            content: Content::Fixed {
                mime: Some(mime.into()),
                content: Some(content.into()),
            },
        }
    }

    /// JSON response, pretty-printed with unescaped slashes on realization.
    #[must_use]
    pub fn json(status: Status, data: Value) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            content: Content::Json(data),
        }
    }

    /// JSON error document `{"error": id, "errorDetails": details}`.
    ///
    /// `errorDetails` is omitted when `details` is `None` or empty.
    #[must_use]
    pub fn json_error(status: Status, error_id: &str, details: Option<&str>) -> Self {
        let mut data = serde_json::Map::new();
        data.insert("error".to_string(), Value::String(error_id.to_string()));
        if let Some(details) = details.filter(|d| !d.is_empty()) {
            data.insert("errorDetails".to_string(), Value::String(details.to_string()));
        }
        Self::json(status, Value::Object(data))
    }

    /// Stream a file from disk with status 200.
    ///
    /// When the path does not name a regular file at realization time, the
    /// not-found response (a bare 404 unless replaced with
    /// [`Response::with_not_found`]) is realized instead.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            headers: HeaderVec::new(),
            content: Content::File {
                path: path.into(),
                mime: mime.into(),
                not_found: Box::new(Response::new(Status::NotFound)),
            },
        }
    }

    /// Replace the fallback of a file-backed response. No effect on other
    /// responses.
    #[must_use]
    pub fn with_not_found(mut self, fallback: Response) -> Self {
        if let Content::File { not_found, .. } = &mut self.content {
            *not_found = Box::new(fallback);
        }
        self
    }

    /// Response whose body is produced by `produce` after status and headers
    /// have been emitted.
    ///
    /// Only the status and the extra headers are sent ahead of the body;
    /// `mime` is not emitted. Add a `Content-Type` with [`Response::with_header`]
    /// when the client needs one.
    #[must_use]
    pub fn deferred<F>(status: Status, mime: impl Into<String>, produce: F) -> Self
    where
        F: FnOnce() -> Vec<u8> + Send + 'static,
    {
        Self {
            status,
            headers: HeaderVec::new(),
            content: Content::Deferred {
                mime: mime.into(),
                produce: Box::new(produce),
            },
        }
    }

    /// Status this response will be realized with (before any file fallback).
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Extra headers accumulated so far.
    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// First extra header with the given name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// MIME type the response declares, if any.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        match &self.content {
            Content::Fixed { mime, .. } => mime.as_deref(),
            Content::Json(_) => Some(JSON_MIME),
            Content::File { mime, .. } | Content::Deferred { mime, .. } => Some(mime),
        }
    }

    /// Data of a JSON response.
    #[must_use]
    pub fn json_data(&self) -> Option<&Value> {
        match &self.content {
            Content::Json(data) => Some(data),
            _ => None,
        }
    }

    /// Append an extra header emitted right after the status.
    pub fn add_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.push((Arc::from(name), value.into()));
    }

    /// Append a raw `Name: value` header line. Lines without a colon are
    /// ignored.
    pub fn add_header_line(&mut self, line: &str) {
        match line.split_once(':') {
            Some((name, value)) => self.add_header(name.trim(), value.trim()),
            None => warn!(line = %line, "Ignoring header line without ':'"),
        }
    }

    /// Builder form of [`Response::add_header`].
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    /// Emit this response: status, extra headers, then the body according to
    /// the response flavour.
    pub fn realize<T: Transport + ?Sized>(self, transport: &mut T) -> io::Result<()> {
        match self.content {
            Content::Fixed { mime, content } => {
                send_head(transport, self.status, &self.headers);
                if let (Some(mime), Some(content)) = (mime, content) {
                    if !content.is_empty() {
                        transport.send_header("Content-Type", &mime);
                        transport.send_header("Content-Length", &content.len().to_string());
                        transport.write_body(&content)?;
                    }
                }
                Ok(())
            }
            Content::Json(data) => {
                send_head(transport, self.status, &self.headers);
                transport.send_header("Content-Type", JSON_MIME);
                let body = encode_json_pretty(&data)?;
                transport.write_body(&body)
            }
            Content::File {
                path,
                mime,
                not_found,
            } => {
                if !path.is_file() {
                    debug!(path = %path.display(), "Backing file missing, realizing fallback response");
                    return not_found.realize(transport);
                }
                send_head(transport, self.status, &self.headers);
                transport.send_header("Content-Type", &mime);
                stream_file(transport, &path);
                Ok(())
            }
            Content::Deferred { produce, .. } => {
                send_head(transport, self.status, &self.headers);
                let body = produce();
                transport.write_body(&body)
            }
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.content {
            Content::Fixed { .. } => "fixed",
            Content::Json(_) => "json",
            Content::File { .. } => "file",
            Content::Deferred { .. } => "deferred",
        };
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("kind", &kind)
            .field("mime_type", &self.mime_type())
            .finish()
    }
}

fn send_head<T: Transport + ?Sized>(transport: &mut T, status: Status, headers: &HeaderVec) {
    transport.send_status(status);
    for (name, value) in headers {
        transport.send_header(name, value);
    }
}

/// Pretty-print with four-space indentation; `/` is never escaped and object
/// keys keep their insertion order.
pub(crate) fn encode_json_pretty(data: &Value) -> io::Result<Vec<u8>> {
    use serde::Serialize;

    let mut out = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    data.serialize(&mut ser)?;
    Ok(out)
}

/// Best effort: read and write failures end the stream quietly.
fn stream_file<T: Transport + ?Sized>(transport: &mut T, path: &Path) {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to open backing file");
            return;
        }
    };
    let mut buf = vec![0u8; FILE_CHUNK_SIZE];
    loop {
        match file.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => {
                if let Err(e) = transport.write_body(&buf[..n]) {
                    warn!(path = %path.display(), error = %e, "File stream aborted by transport");
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "File stream read failed");
                return;
            }
        }
    }
}
