//! Widget model.
//!
//! Every element on the generated page is one variant of [`Element`]. The
//! variant set is closed: buttons, toggles, sliders, read-only sensor
//! readouts and text boxes. Each variant implements [`Control`], the
//! capability set the render engine and the request dispatcher rely on:
//!
//! - `render_markup` - the HTML fragment placed inside the page container
//! - `render_script` - optional per-widget JavaScript appended to the page
//! - `apply_update` - consume a raw value received from the browser
//! - `value_string` - the value reported in the `/get` snapshot
//!
//! Widgets are created through the [`Registry`](crate::registry::Registry),
//! which assigns identifiers and hands back typed [`Handle`]s.

pub mod button;
pub mod sensor;
pub mod slider;
pub mod text_box;
pub mod toggle;

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

pub use button::{Button, ButtonStyle};
pub use sensor::SensorStatus;
pub use slider::Slider;
pub use text_box::TextBox;
pub use toggle::Toggle;

/// Advisory layout hints.
///
/// Stored and exposed to sketch code; the renderer does not use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// State shared by every widget: identity, label and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetBase {
    id: String,
    label: String,
    geometry: Geometry,
}

impl WidgetBase {
    pub(crate) fn new(id: impl Into<String>, label: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            geometry,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
}

/// Operations every widget supports.
pub trait Control {
    fn base(&self) -> &WidgetBase;

    fn base_mut(&mut self) -> &mut WidgetBase;

    /// HTML fragment for this widget.
    fn render_markup(&self) -> String;

    /// JavaScript appended after the shared client script. Empty by default.
    fn render_script(&self) -> String {
        String::new()
    }

    /// Apply a raw value received in a set-value request.
    fn apply_update(&mut self, raw: &str);

    /// Value reported in the values snapshot.
    fn value_string(&self) -> String;

    fn id(&self) -> &str {
        self.base().id()
    }

    fn label(&self) -> &str {
        self.base().label()
    }

    fn set_label(&mut self, label: &str) {
        self.base_mut().label = label.to_string();
    }

    fn geometry(&self) -> Geometry {
        self.base().geometry()
    }

    fn set_position(&mut self, x: i32, y: i32) {
        let geometry = &mut self.base_mut().geometry;
        geometry.x = x;
        geometry.y = y;
    }

    fn set_size(&mut self, width: i32, height: i32) {
        let geometry = &mut self.base_mut().geometry;
        geometry.width = width;
        geometry.height = height;
    }
}

/// One registered page element.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Button(Button),
    Toggle(Toggle),
    Slider(Slider),
    SensorStatus(SensorStatus),
    TextBox(TextBox),
}

impl Element {
    pub fn as_control(&self) -> &dyn Control {
        match self {
            Element::Button(w) => w,
            Element::Toggle(w) => w,
            Element::Slider(w) => w,
            Element::SensorStatus(w) => w,
            Element::TextBox(w) => w,
        }
    }

    pub fn as_control_mut(&mut self) -> &mut dyn Control {
        match self {
            Element::Button(w) => w,
            Element::Toggle(w) => w,
            Element::Slider(w) => w,
            Element::SensorStatus(w) => w,
            Element::TextBox(w) => w,
        }
    }

    /// Short lowercase name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Button(_) => "button",
            Element::Toggle(_) => "toggle",
            Element::Slider(_) => "slider",
            Element::SensorStatus(_) => "sensor",
            Element::TextBox(_) => "textbox",
        }
    }

    pub fn id(&self) -> &str {
        self.as_control().id()
    }
}

/// Conversion between a concrete widget type and [`Element`].
///
/// Implemented by every variant so that [`Handle`] lookups stay typed.
pub trait Widget: Control + Sized {
    fn into_element(self) -> Element;

    fn from_element(element: &Element) -> Option<&Self>;

    fn from_element_mut(element: &mut Element) -> Option<&mut Self>;
}

macro_rules! impl_widget {
    ($ty:ident) => {
        impl Widget for $ty {
            fn into_element(self) -> Element {
                Element::$ty(self)
            }

            fn from_element(element: &Element) -> Option<&Self> {
                match element {
                    Element::$ty(w) => Some(w),
                    _ => None,
                }
            }

            fn from_element_mut(element: &mut Element) -> Option<&mut Self> {
                match element {
                    Element::$ty(w) => Some(w),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Element {
            fn from(widget: $ty) -> Self {
                Element::$ty(widget)
            }
        }
    };
}

impl_widget!(Button);
impl_widget!(Toggle);
impl_widget!(Slider);
impl_widget!(SensorStatus);
impl_widget!(TextBox);

/// Typed reference to a widget owned by a registry.
///
/// Handles are plain indices; the registry never removes elements, so a
/// handle stays valid for the registry's lifetime.
pub struct Handle<W> {
    index: usize,
    _marker: PhantomData<fn() -> W>,
}

impl<W> Handle<W> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl<W> Clone for Handle<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for Handle<W> {}

impl<W> PartialEq for Handle<W> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<W> Eq for Handle<W> {}

impl<W> fmt::Debug for Handle<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

/// Parse an integer the way Arduino's `String::toInt` does.
///
/// Leading whitespace and an optional sign are accepted, digits are read
/// until the first non-digit, and anything unparsable yields 0. Values
/// outside `i32` saturate.
pub(crate) fn lenient_parse_int(raw: &str) -> i32 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        value = value * 10 + i64::from(b - b'0');
        if value > i64::from(i32::MAX) + 1 {
            break;
        }
    }

    let signed = if negative { -value } else { value };
    signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_parse_int() {
        assert_eq!(lenient_parse_int("42"), 42);
        assert_eq!(lenient_parse_int("  -17"), -17);
        assert_eq!(lenient_parse_int("+8"), 8);
        assert_eq!(lenient_parse_int("12abc"), 12);
        assert_eq!(lenient_parse_int("abc"), 0);
        assert_eq!(lenient_parse_int(""), 0);
        assert_eq!(lenient_parse_int("-"), 0);
        assert_eq!(lenient_parse_int("99999999999"), i32::MAX);
        assert_eq!(lenient_parse_int("-99999999999"), i32::MIN);
    }

    #[test]
    fn test_element_downcast() {
        let element: Element = Toggle::new("element0", "Pump").into();
        assert_eq!(element.kind(), "toggle");
        assert!(Toggle::from_element(&element).is_some());
        assert!(Button::from_element(&element).is_none());
    }

    #[test]
    fn test_geometry_setters() {
        let mut slider = Slider::new("element3", "Level", 0, 10, 5);
        slider.set_position(12, 34);
        slider.set_size(250, 70);
        assert_eq!(slider.geometry(), Geometry::new(12, 34, 250, 70));

        slider.set_label("Volume");
        assert_eq!(slider.label(), "Volume");
    }
}
