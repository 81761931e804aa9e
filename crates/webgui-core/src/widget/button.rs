//! Momentary push button.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::{Control, Geometry, WidgetBase};
use crate::template;

const BUTTON_TEMPLATE: &str = r#"
        <button id="%ID%" class="webgui-button webgui-button-%STYLE%" onclick="buttonClick('%ID%')">%LABEL%</button>
"#;

/// Visual style tag emitted as an extra CSS class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Success,
    Danger,
    Warning,
}

impl ButtonStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonStyle::Primary => "primary",
            ButtonStyle::Secondary => "secondary",
            ButtonStyle::Success => "success",
            ButtonStyle::Danger => "danger",
            ButtonStyle::Warning => "warning",
        }
    }
}

/// A button whose presses are reported to sketch code as one-shot events.
///
/// Every `"1"` received from the browser flips the latched `pressed` state
/// and arms the one-shot flag read by [`Button::was_pressed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    base: WidgetBase,
    pressed: bool,
    pressed_flag: bool,
    last_press: Option<Instant>,
    style: ButtonStyle,
}

impl Button {
    pub const DEFAULT_WIDTH: i32 = 100;
    pub const DEFAULT_HEIGHT: i32 = 40;

    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(
                id,
                label,
                Geometry::new(0, 0, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT),
            ),
            pressed: false,
            pressed_flag: false,
            last_press: None,
            style: ButtonStyle::default(),
        }
    }

    /// Returns `true` once per press, then `false` until the next press.
    pub fn was_pressed(&mut self) -> bool {
        std::mem::take(&mut self.pressed_flag)
    }

    /// Latched state, flipped on every press.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn set_state(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Clear both the latched state and any unread press.
    pub fn reset(&mut self) {
        self.pressed = false;
        self.pressed_flag = false;
    }

    pub fn last_press(&self) -> Option<Instant> {
        self.last_press
    }

    pub fn style(&self) -> ButtonStyle {
        self.style
    }

    pub fn set_style(&mut self, style: ButtonStyle) {
        self.style = style;
    }
}

impl Control for Button {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn render_markup(&self) -> String {
        template::fill(
            BUTTON_TEMPLATE,
            &[
                ("ID", self.base.id()),
                ("LABEL", self.base.label()),
                ("STYLE", self.style.as_str()),
            ],
        )
    }

    fn apply_update(&mut self, raw: &str) {
        if raw == "1" {
            self.pressed = !self.pressed;
            self.pressed_flag = true;
            self.last_press = Some(Instant::now());
        }
    }

    fn value_string(&self) -> String {
        if self.pressed { "1" } else { "0" }.to_string()
    }
}
