//! On/off switch.

use super::{Control, Geometry, WidgetBase};
use crate::template;

const TOGGLE_TEMPLATE: &str = r#"
        <div class="webgui-toggle-container">
            <label class="webgui-toggle-label">%LABEL%</label>
            <label class="webgui-toggle-switch">
                <input type="checkbox" id="%ID%" class="webgui-toggle-input"%CHECKED% onchange="toggleChange('%ID%', this.checked)">
                <span class="webgui-toggle-slider"></span>
            </label>
        </div>
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct Toggle {
    base: WidgetBase,
    state: bool,
    changed: bool,
}

impl Toggle {
    pub const DEFAULT_WIDTH: i32 = 200;
    pub const DEFAULT_HEIGHT: i32 = 40;

    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(
                id,
                label,
                Geometry::new(0, 0, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT),
            ),
            state: false,
            changed: false,
        }
    }

    pub fn is_on(&self) -> bool {
        self.state
    }

    /// Returns `true` once after the browser changed the state.
    pub fn was_toggled(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Set the state from sketch code. Does not arm the changed flag; the
    /// page picks the new state up on its next poll.
    pub fn set_state(&mut self, on: bool) {
        self.state = on;
    }

    pub fn reset(&mut self) {
        self.state = false;
        self.changed = false;
    }
}

impl Control for Toggle {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn render_markup(&self) -> String {
        let checked = if self.state { " checked" } else { "" };
        template::fill(
            TOGGLE_TEMPLATE,
            &[
                ("ID", self.base.id()),
                ("LABEL", self.base.label()),
                ("CHECKED", checked),
            ],
        )
    }

    fn apply_update(&mut self, raw: &str) {
        let on = raw == "1" || raw == "true";
        if on != self.state {
            self.state = on;
            self.changed = true;
        }
    }

    fn value_string(&self) -> String {
        if self.state { "1" } else { "0" }.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_one_and_true() {
        let mut toggle = Toggle::new("element1", "Pump");
        toggle.apply_update("true");
        assert!(toggle.is_on());
        assert_eq!(toggle.value_string(), "1");

        toggle.apply_update("false");
        assert!(!toggle.is_on());

        toggle.apply_update("1");
        assert!(toggle.is_on());

        toggle.apply_update("yes");
        assert!(!toggle.is_on());
    }

    #[test]
    fn test_same_value_does_not_rearm() {
        let mut toggle = Toggle::new("element1", "Pump");
        toggle.apply_update("true");
        assert!(toggle.was_toggled());

        toggle.apply_update("true");
        assert!(!toggle.was_toggled());
    }

    #[test]
    fn test_flag_survives_until_read() {
        let mut toggle = Toggle::new("element1", "Pump");
        toggle.apply_update("1");
        toggle.apply_update("1");

        assert!(toggle.was_toggled());
        assert!(!toggle.was_toggled());
    }

    #[test]
    fn test_set_state_is_silent() {
        let mut toggle = Toggle::new("element1", "Pump");
        toggle.set_state(true);

        assert!(toggle.is_on());
        assert!(!toggle.was_toggled());
    }

    #[test]
    fn test_markup_reflects_state() {
        let mut toggle = Toggle::new("element1", "Pump");
        assert!(!toggle.render_markup().contains("checked onchange"));

        toggle.set_state(true);
        let html = toggle.render_markup();
        assert!(html.contains(r#"class="webgui-toggle-input" checked onchange"#));
        assert!(html.contains("toggleChange('element1', this.checked)"));
    }
}
