//! Read-only status readout.

use super::{Control, Geometry, WidgetBase};
use crate::template;

const SENSOR_STATUS_TEMPLATE: &str = r#"
        <div class="webgui-sensor-container">
            <label class="webgui-sensor-label">%LABEL%</label>
            <span class="webgui-sensor-value" id="%ID%_display">%VALUE%</span>
        </div>
"#;

/// A text readout written by sketch code and refreshed by the page's poller.
///
/// The browser cannot change it: [`Control::apply_update`] is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStatus {
    base: WidgetBase,
    display: String,
}

impl SensorStatus {
    pub const DEFAULT_WIDTH: i32 = 200;
    pub const DEFAULT_HEIGHT: i32 = 40;
    pub const DEFAULT_DECIMALS: usize = 2;

    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(
                id,
                label,
                Geometry::new(0, 0, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT),
            ),
            display: "0".to_string(),
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn set_int(&mut self, value: i64) {
        self.display = value.to_string();
    }

    /// Fixed-point rendering with [`Self::DEFAULT_DECIMALS`] decimals.
    pub fn set_float(&mut self, value: f32) {
        self.set_float_with(value, Self::DEFAULT_DECIMALS);
    }

    /// Non-finite values read `nan`, `inf` or `-inf`, as printf shows them.
    pub fn set_float_with(&mut self, value: f32, decimals: usize) {
        self.display = if value.is_nan() {
            "nan".to_string()
        } else if value.is_infinite() {
            if value.is_sign_negative() { "-inf" } else { "inf" }.to_string()
        } else {
            format!("{value:.decimals$}")
        };
    }

    /// Rendered as `"true"` / `"false"`.
    pub fn set_bool(&mut self, value: bool) {
        self.display = value.to_string();
    }

    pub fn set_text(&mut self, value: impl Into<String>) {
        self.display = value.into();
    }
}

impl Control for SensorStatus {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn render_markup(&self) -> String {
        template::fill(
            SENSOR_STATUS_TEMPLATE,
            &[
                ("ID", self.base.id()),
                ("LABEL", self.base.label()),
                ("VALUE", &self.display),
            ],
        )
    }

    fn apply_update(&mut self, _raw: &str) {}

    fn value_string(&self) -> String {
        self.display.clone()
    }
}
