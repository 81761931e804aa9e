//! # webgui-protocol
//!
//! The HTTP/1.1 subset spoken by the WebGUI page.
//!
//! This crate provides:
//! - A byte-at-a-time request reader with bounded memory
//! - Request classification (page, set values, get values)
//! - Query string parsing
//! - Response head encoding
//! - Set-value application and the JSON values snapshot

pub mod messages;
pub mod request;
pub mod response;

pub use messages::{apply_set_query, SetOutcome, ValuesSnapshot};
pub use request::{complete_pairs, parse_query, RequestError, RequestKind, RequestLine, RequestReader};
pub use response::{ContentType, SET_OK_BODY};
