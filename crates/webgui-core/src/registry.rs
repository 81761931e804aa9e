//! Widget registry.
//!
//! The registry owns every widget shown on the page. Insertion order is
//! display order, identifiers come from a counter owned by the registry and
//! are never reused, and there is no removal operation.

use crate::widget::{Button, Control, Element, Handle, SensorStatus, Slider, TextBox, Toggle, Widget};

/// Prefix of generated widget identifiers.
pub const ID_PREFIX: &str = "element";

/// Ordered collection of page widgets.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    elements: Vec<Element>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> String {
        let id = format!("{}{}", ID_PREFIX, self.next_id);
        self.next_id += 1;
        id
    }

    fn push<W: Widget>(&mut self, widget: W) -> Handle<W> {
        let index = self.elements.len();
        tracing::debug!("Registered {} as {}", widget.label(), widget.id());
        self.elements.push(widget.into_element());
        Handle::new(index)
    }

    pub fn add_button(&mut self, label: &str) -> Handle<Button> {
        let id = self.allocate_id();
        self.push(Button::new(id, label))
    }

    pub fn add_toggle(&mut self, label: &str) -> Handle<Toggle> {
        let id = self.allocate_id();
        self.push(Toggle::new(id, label))
    }

    pub fn add_slider(&mut self, label: &str, min: i32, max: i32, value: i32) -> Handle<Slider> {
        let id = self.allocate_id();
        self.push(Slider::new(id, label, min, max, value))
    }

    pub fn add_sensor_status(&mut self, label: &str) -> Handle<SensorStatus> {
        let id = self.allocate_id();
        self.push(SensorStatus::new(id, label))
    }

    pub fn add_text_box(&mut self, label: &str, placeholder: &str) -> Handle<TextBox> {
        let id = self.allocate_id();
        self.push(TextBox::new(id, label, placeholder))
    }

    /// Typed access through a handle issued by this registry.
    ///
    /// Returns `None` only for a handle that came from a different registry.
    pub fn get<W: Widget>(&self, handle: Handle<W>) -> Option<&W> {
        self.elements.get(handle.index()).and_then(W::from_element)
    }

    pub fn get_mut<W: Widget>(&mut self, handle: Handle<W>) -> Option<&mut W> {
        self.elements
            .get_mut(handle.index())
            .and_then(W::from_element_mut)
    }

    /// Linear scan by identifier.
    pub fn find(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id() == id)
    }

    /// Route one raw value to the widget with identifier `id`.
    ///
    /// Returns `false` when no widget matches; the value is dropped.
    pub fn apply_update(&mut self, id: &str, raw: &str) -> bool {
        match self.find_mut(id) {
            Some(element) => {
                element.as_control_mut().apply_update(raw);
                true
            }
            None => false,
        }
    }

    /// Widgets in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_registration_order() {
        let mut registry = Registry::new();
        let a = registry.add_button("A");
        let b = registry.add_slider("B", 0, 10, 0);
        let c = registry.add_sensor_status("C");

        assert_eq!(registry.get(a).unwrap().id(), "element0");
        assert_eq!(registry.get(b).unwrap().id(), "element1");
        assert_eq!(registry.get(c).unwrap().id(), "element2");

        let order: Vec<_> = registry.iter().map(|e| e.id().to_string()).collect();
        assert_eq!(order, vec!["element0", "element1", "element2"]);
    }

    #[test]
    fn test_apply_update_routes_by_id() {
        let mut registry = Registry::new();
        let slider = registry.add_slider("Speed", 0, 100, 0);
        let toggle = registry.add_toggle("Pump");

        assert!(registry.apply_update("element0", "42"));
        assert!(registry.apply_update("element1", "true"));
        assert!(!registry.apply_update("element9", "1"));

        assert_eq!(registry.get(slider).unwrap().value(), 42);
        assert!(registry.get_mut(toggle).unwrap().was_toggled());
    }

    #[test]
    fn test_registries_number_independently() {
        let mut first = Registry::new();
        let mut second = Registry::new();
        first.add_button("x");
        first.add_button("y");
        let handle = second.add_button("z");

        assert_eq!(second.get(handle).unwrap().id(), "element0");
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_find() {
        let mut registry = Registry::new();
        registry.add_text_box("Name", "");
        assert_eq!(registry.find("element0").map(Element::kind), Some("textbox"));
        assert!(registry.find("element1").is_none());
    }
}
