//! Request reading and classification.
//!
//! The reader consumes a request one byte at a time and keeps only the
//! request line, capped at a configurable length. Header lines are counted,
//! not stored, so memory use does not depend on what the client sends.

use std::borrow::Cow;

use thiserror::Error;

/// Path of the set-value endpoint.
pub const SET_PATH: &str = "/set";
/// Path of the values snapshot endpoint.
pub const GET_PATH: &str = "/get";

/// Default cap on the retained request line.
pub const DEFAULT_MAX_LINE: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("empty request line")]
    EmptyRequestLine,

    #[error("malformed request line: {0}")]
    MalformedRequestLine(String),
}

/// First line of an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: Option<String>,
}

impl RequestLine {
    /// Parse `METHOD TARGET [VERSION]`.
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        let mut parts = line.split_whitespace();
        let method = parts.next().ok_or(RequestError::EmptyRequestLine)?;
        let target = parts
            .next()
            .ok_or_else(|| RequestError::MalformedRequestLine(line.to_string()))?;
        let version = parts.next().map(str::to_string);

        Ok(Self {
            method: method.to_string(),
            target: target.to_string(),
            version,
        })
    }

    /// Target without the query string.
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    /// Text after the first `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }

    pub fn kind(&self) -> RequestKind<'_> {
        RequestKind::classify(self.path(), self.query())
    }
}

/// What a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind<'a> {
    /// Anything that is not `/set` or `/get`.
    Page,
    /// `/set`, with its query string (empty when absent).
    SetValues(&'a str),
    /// `/get`.
    GetValues,
}

impl<'a> RequestKind<'a> {
    /// Classify by exact path. The method is not considered.
    pub fn classify(path: &str, query: Option<&'a str>) -> Self {
        match path {
            SET_PATH => RequestKind::SetValues(query.unwrap_or("")),
            GET_PATH => RequestKind::GetValues,
            _ => RequestKind::Page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitLine,
    DrainHeaders { line_len: usize },
    Complete,
}

/// Byte-at-a-time request reader.
///
/// Feed bytes with [`push`](Self::push) until it returns `Some`, which
/// happens on the empty line that ends the headers.
#[derive(Debug)]
pub struct RequestReader {
    state: State,
    line: Vec<u8>,
    max_line: usize,
    truncated: bool,
    request: Option<Result<RequestLine, RequestError>>,
}

impl Default for RequestReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE)
    }
}

impl RequestReader {
    /// Bytes of the request line past `max_line` are dropped.
    pub fn new(max_line: usize) -> Self {
        Self {
            state: State::AwaitLine,
            line: Vec::with_capacity(max_line.min(DEFAULT_MAX_LINE)),
            max_line,
            truncated: false,
            request: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// True when the request line was longer than the cap.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn push(&mut self, byte: u8) -> Option<Result<RequestLine, RequestError>> {
        match self.state {
            State::AwaitLine => {
                match byte {
                    b'\n' => {
                        let text = String::from_utf8_lossy(&self.line);
                        let text = text.trim_end_matches('\r');
                        // Blank lines before the request line are tolerated.
                        if !text.trim().is_empty() {
                            self.request = Some(RequestLine::parse(text));
                            self.state = State::DrainHeaders { line_len: 0 };
                        }
                        self.line.clear();
                    }
                    _ if self.line.len() < self.max_line => self.line.push(byte),
                    _ => self.truncated = true,
                }
                None
            }
            State::DrainHeaders { line_len } => {
                match byte {
                    b'\n' if line_len == 0 => {
                        self.state = State::Complete;
                        return self.request.take();
                    }
                    b'\n' => self.state = State::DrainHeaders { line_len: 0 },
                    b'\r' => {}
                    _ => {
                        self.state = State::DrainHeaders {
                            line_len: line_len + 1,
                        }
                    }
                }
                None
            }
            State::Complete => None,
        }
    }

    /// Feed a slice; returns the request once the headers end. Bytes after
    /// the end of the headers are ignored.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Option<Result<RequestLine, RequestError>> {
        for &byte in bytes {
            if let Some(request) = self.push(byte) {
                return Some(request);
            }
        }
        None
    }
}

/// Split a query string into decoded `(name, value)` pairs.
///
/// Segments are separated by `&` and split on the first `=`. Segments
/// without `=` or with an empty name are skipped. Names and values are
/// percent-decoded; text that does not decode to UTF-8 is kept raw.
pub fn parse_query(query: &str) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
    query
        .split('&')
        .filter_map(|segment| segment.split_once('='))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (decode(name), decode(value)))
}

/// The query up to its last `&`, dropping a final segment that may have
/// been cut off mid-value. A query without `&` keeps nothing.
pub fn complete_pairs(query: &str) -> &str {
    query.rsplit_once('&').map_or("", |(head, _)| head)
}

fn decode(text: &str) -> Cow<'_, str> {
    urlencoding::decode(text).unwrap_or(Cow::Borrowed(text))
}
