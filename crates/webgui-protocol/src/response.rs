//! Response head encoding.
//!
//! Every response is `200 OK` with `Connection: close`; the connection is
//! closed after one request.

use std::io::{self, Write};

/// Body of a set-value response.
pub const SET_OK_BODY: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    PlainText,
    Json,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::PlainText => "text/plain",
            ContentType::Json => "application/json",
        }
    }
}

/// Status line and headers. `content_length` is omitted for streamed
/// bodies, whose end is marked by closing the connection.
pub fn encode_head(content_type: ContentType, content_length: Option<usize>) -> String {
    let mut head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nConnection: close\r\n",
        content_type.as_str()
    );
    if let Some(len) = content_length {
        head.push_str(&format!("Content-Length: {}\r\n", len));
    }
    head.push_str("\r\n");
    head
}

pub fn write_head<W: Write>(out: &mut W, content_type: ContentType, content_length: Option<usize>) -> io::Result<()> {
    out.write_all(encode_head(content_type, content_length).as_bytes())
}

/// Head and body of a response whose body is already in memory.
pub fn write_response<W: Write>(out: &mut W, content_type: ContentType, body: &str) -> io::Result<()> {
    write_head(out, content_type, Some(body.len()))?;
    out.write_all(body.as_bytes())?;
    out.flush()
}
