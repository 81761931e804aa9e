//! Integer range slider.

use super::{lenient_parse_int, Control, Geometry, WidgetBase};
use crate::template;

const SLIDER_TEMPLATE: &str = r#"
        <div class="webgui-slider-container">
            <label for="%ID%">%LABEL% <span class="webgui-slider-value" id="%ID%_value">%VALUE%</span></label>
            <input type="range" id="%ID%" class="webgui-slider" min="%MIN%" max="%MAX%" value="%VALUE%">
        </div>
"#;

/// A slider over an inclusive integer range.
///
/// Every value stored in the slider, whether it comes from the browser or
/// from sketch code, is clamped to `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    base: WidgetBase,
    min: i32,
    max: i32,
    value: i32,
    changed: bool,
    debounce_ms: u32,
}

impl Slider {
    pub const DEFAULT_WIDTH: i32 = 300;
    pub const REQUIRED_HEIGHT: i32 = 60;

    /// Reversed bounds are swapped.
    pub fn new(id: impl Into<String>, label: impl Into<String>, min: i32, max: i32, value: i32) -> Self {
        let (min, max) = ordered(min, max);
        Self {
            base: WidgetBase::new(
                id,
                label,
                Geometry::new(0, 0, Self::DEFAULT_WIDTH, Self::REQUIRED_HEIGHT),
            ),
            min,
            max,
            value: value.clamp(min, max),
            changed: false,
            debounce_ms: 0,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn value_f32(&self) -> f32 {
        self.value as f32
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Set the value from sketch code. Clamped; does not arm the changed flag.
    pub fn set_value(&mut self, value: i32) {
        self.value = value.clamp(self.min, self.max);
    }

    /// Change the range and re-clamp the current value.
    pub fn set_range(&mut self, min: i32, max: i32) {
        let (min, max) = ordered(min, max);
        self.min = min;
        self.max = max;
        self.value = self.value.clamp(min, max);
    }

    /// Returns `true` once after the browser moved the slider to a new value.
    pub fn was_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }

    /// Client-side delay before a moved slider sends its value. Zero sends
    /// on every input event.
    pub fn set_debounce_ms(&mut self, debounce_ms: u32) {
        self.debounce_ms = debounce_ms;
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Control for Slider {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn render_markup(&self) -> String {
        let min = self.min.to_string();
        let max = self.max.to_string();
        let value = self.value.to_string();
        template::fill(
            SLIDER_TEMPLATE,
            &[
                ("ID", self.base.id()),
                ("LABEL", self.base.label()),
                ("MIN", &min),
                ("MAX", &max),
                ("VALUE", &value),
            ],
        )
    }

    fn render_script(&self) -> String {
        let id = self.base.id();
        if self.debounce_ms > 0 {
            format!(
                "document.getElementById('{id}').oninput = function() {{ debouncedSliderChange('{id}', this.value, {}); }};\n",
                self.debounce_ms
            )
        } else {
            format!("document.getElementById('{id}').oninput = function() {{ sliderChange('{id}', this.value); }};\n")
        }
    }

    fn apply_update(&mut self, raw: &str) {
        let value = lenient_parse_int(raw).clamp(self.min, self.max);
        if value != self.value {
            self.value = value;
            self.changed = true;
        }
    }

    fn value_string(&self) -> String {
        self.value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_clamps_to_range() {
        let mut slider = Slider::new("element2", "Speed", 0, 100, 50);

        for (input, expected) in [(-5, 0), (0, 0), (37, 37), (100, 100), (250, 100)] {
            slider.apply_update(&input.to_string());
            assert_eq!(slider.value_string(), expected.to_string());
        }
    }

    #[test]
    fn test_non_numeric_parses_as_zero() {
        let mut slider = Slider::new("element2", "Speed", -10, 10, 5);
        slider.apply_update("fast");
        assert_eq!(slider.value(), 0);
        assert!(slider.was_changed());

        let mut bounded = Slider::new("element3", "Level", 10, 20, 15);
        bounded.apply_update("fast");
        assert_eq!(bounded.value(), 10);
    }

    #[test]
    fn test_changed_only_when_clamped_value_differs() {
        let mut slider = Slider::new("element2", "Speed", 0, 100, 100);
        slider.apply_update("150");
        assert!(!slider.was_changed());

        slider.apply_update("60");
        slider.apply_update("60");
        assert!(slider.was_changed());
        assert!(!slider.was_changed());
    }

    #[test]
    fn test_set_range_reclamps_and_orders() {
        let mut slider = Slider::new("element2", "Speed", 0, 100, 80);
        slider.set_range(50, 10);
        assert_eq!((slider.min(), slider.max()), (10, 50));
        assert_eq!(slider.value(), 50);

        slider.set_value(-3);
        assert_eq!(slider.value(), 10);
        assert!(!slider.was_changed());
    }

    #[test]
    fn test_initial_value_clamped() {
        let slider = Slider::new("element2", "Speed", 0, 10, 99);
        assert_eq!(slider.value(), 10);
        assert_eq!(slider.value_f32(), 10.0);
    }

    #[test]
    fn test_markup_and_script() {
        let mut slider = Slider::new("element2", "Speed", 0, 255, 128);
        let html = slider.render_markup();
        assert!(html.contains(r#"min="0" max="255" value="128""#));
        assert!(html.contains(r#"id="element2_value">128</span>"#));
        assert!(slider.render_script().contains("sliderChange('element2', this.value)"));

        slider.set_debounce_ms(150);
        assert!(slider
            .render_script()
            .contains("debouncedSliderChange('element2', this.value, 150)"));
    }
}
