//! Sinks a [`Response`](super::Response) is realized against.

use std::io::{self, Write};
use tracing::warn;

use super::core::Status;

/// Destination for status, headers and body bytes.
///
/// Realization calls `send_status` first, then `send_header` any number of
/// times, then `write_body` any number of times.
pub trait Transport {
    /// Record the response status.
    fn send_status(&mut self, status: Status);
    /// Record one header.
    fn send_header(&mut self, name: &str, value: &str);
    /// Append body bytes.
    fn write_body(&mut self, chunk: &[u8]) -> io::Result<()>;
}

/// In-memory transport that keeps everything it is given.
#[derive(Debug, Default, Clone)]
pub struct BufferedTransport {
    status: Option<Status>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl BufferedTransport {
    /// Empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status sent, if any.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Headers in emission order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    #[must_use]
    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Convert into an `http::Response`. A transport that never received a
    /// status yields 200.
    pub fn into_http(self) -> http::Result<http::Response<Vec<u8>>> {
        let status = self.status.unwrap_or(Status::Ok);
        let mut builder = http::Response::builder().status(http::StatusCode::from(status));
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(self.body)
    }
}

impl Transport for BufferedTransport {
    fn send_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    fn send_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn write_body(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(chunk);
        Ok(())
    }
}

/// HTTP/1.1 writer over any `io::Write`.
///
/// Status and headers are buffered and written, followed by the blank line,
/// just before the first body chunk. Call [`WireTransport::finish`] to flush a
/// response that has no body.
#[derive(Debug)]
pub struct WireTransport<W: Write> {
    writer: W,
    head: Vec<u8>,
    status: Option<Status>,
    head_written: bool,
}

impl<W: Write> WireTransport<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            head: Vec::with_capacity(256),
            status: None,
            head_written: false,
        }
    }

    fn flush_head(&mut self) -> io::Result<()> {
        if self.head_written {
            return Ok(());
        }
        let status = self.status.unwrap_or(Status::Ok);
        write!(self.writer, "HTTP/1.1 {} {}\r\n", status.code(), status.reason())?;
        self.writer.write_all(&self.head)?;
        self.writer.write_all(b"\r\n")?;
        self.head.clear();
        self.head_written = true;
        Ok(())
    }

    /// Write any pending head, flush, and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_head()?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> Transport for WireTransport<W> {
    fn send_status(&mut self, status: Status) {
        if self.head_written {
            warn!(status = status.code(), "Status sent after body started, ignoring");
            return;
        }
        self.status = Some(status);
    }

    fn send_header(&mut self, name: &str, value: &str) {
        if self.head_written {
            warn!(header = %name, "Header sent after body started, ignoring");
            return;
        }
        self.head.extend_from_slice(name.as_bytes());
        self.head.extend_from_slice(b": ");
        self.head.extend_from_slice(value.as_bytes());
        self.head.extend_from_slice(b"\r\n");
    }

    fn write_body(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.flush_head()?;
        self.writer.write_all(chunk)
    }
}
