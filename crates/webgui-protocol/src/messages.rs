//! Set-value application and the values snapshot.
//!
//! Both front ends use these so that `/set` and `/get` behave the same
//! whether the page is streamed or buffered.

use serde::ser::{Serialize, SerializeMap, Serializer};
use webgui_core::Registry;

use crate::request::parse_query;

/// JSON object mapping every widget id to its current value, in display
/// order.
#[derive(Debug, Clone, Copy)]
pub struct ValuesSnapshot<'a> {
    registry: &'a Registry,
}

impl<'a> ValuesSnapshot<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for ValuesSnapshot<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.registry.len()))?;
        for element in self.registry.iter() {
            map.serialize_entry(element.id(), &element.as_control().value_string())?;
        }
        map.end()
    }
}

/// Result of applying a set-value query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOutcome {
    /// Pairs routed to a widget.
    pub applied: usize,
    /// Pairs whose name matched no widget.
    pub ignored: usize,
}

/// Route every `name=value` pair of `query` to the widget with that id.
pub fn apply_set_query(registry: &mut Registry, query: &str) -> SetOutcome {
    let mut outcome = SetOutcome::default();
    for (name, value) in parse_query(query) {
        if registry.apply_update(&name, &value) {
            outcome.applied += 1;
        } else {
            outcome.ignored += 1;
        }
    }
    outcome
}
