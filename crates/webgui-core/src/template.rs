//! `%NAME%` placeholder templates.
//!
//! Templates are plain string literals with placeholders of the form
//! `%NAME%`, where `NAME` is one or more of `A-Z` and `_`. Substitution is a
//! single left-to-right pass: replacement values are never rescanned, and no
//! escaping is applied to them.
//!
//! The same tokenizer drives both the buffered renderer (which collects
//! into a `String`) and the streaming renderer (which writes each segment to
//! the socket as it is produced).

/// A piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied to the output unchanged.
    Literal(&'a str),
    /// A placeholder name, without the surrounding `%`.
    Placeholder(&'a str),
}

/// Iterator over the segments of a template.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    rest: &'a str,
}

/// Split a template into literal and placeholder segments.
pub fn segments(template: &str) -> Segments<'_> {
    Segments { rest: template }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_uppercase() || b == b'_')
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let mut search_from = 0;
        while let Some(offset) = self.rest[search_from..].find('%') {
            let start = search_from + offset;
            let after = &self.rest[start + 1..];

            if let Some(end) = after.find('%') {
                let name = &after[..end];
                if is_placeholder_name(name) {
                    if start > 0 {
                        let literal = &self.rest[..start];
                        self.rest = &self.rest[start..];
                        return Some(Segment::Literal(literal));
                    }
                    self.rest = &after[end + 1..];
                    return Some(Segment::Placeholder(name));
                }
            }

            search_from = start + 1;
        }

        let literal = self.rest;
        self.rest = "";
        Some(Segment::Literal(literal))
    }
}

/// Replace placeholders using `lookup`.
///
/// Placeholders for which `lookup` returns `None` are kept verbatim.
pub fn substitute<'v, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'v str>,
{
    let mut out = String::with_capacity(template.len());
    for segment in segments(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => match lookup(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('%');
                    out.push_str(name);
                    out.push('%');
                }
            },
        }
    }
    out
}

/// Replace placeholders from a fixed list of `(name, value)` pairs.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    substitute(template, |name| {
        values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    })
}
