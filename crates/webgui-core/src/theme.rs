//! Page stylesheet.
//!
//! The built-in stylesheet is deliberately small: it leans on browser
//! defaults so that the whole page fits comfortably on boards with a few
//! kilobytes of free RAM.

use serde::{Deserialize, Serialize};

/// Built-in stylesheet.
pub const DEFAULT_CSS: &str = r#"
body { margin: 20px; font-family: Arial, sans-serif; }
h1 { margin-bottom: 20px; }
input[type="range"] { width: 300px; margin: 10px; }
input[type="text"] { width: 300px; padding: 8px; margin: 5px 0; border: 1px solid #ccc; border-radius: 4px; font-size: 14px; }
input[type="text"]:focus { border-color: #007bff; outline: none; box-shadow: 0 0 5px rgba(0,123,255,0.5); }
button { padding: 10px; margin: 5px; border: 1px solid #ccc; background: #f8f9fa; cursor: pointer; }
button:hover { background: #e9ecef; }
.webgui-button-active { background: #007bff; color: white; }
.webgui-button-inactive { background: #f8f9fa; color: #333; }
label { display: block; margin: 10px 0 5px 0; font-weight: bold; }
.webgui-slider-value { color: #007bff; font-weight: normal; }
.webgui-textbox-container { margin: 15px 0; }
.webgui-textbox-label { display: block; margin: 10px 0 5px 0; font-weight: bold; }
.webgui-textbox { width: 100%; padding: 8px; border: 1px solid #ccc; border-radius: 4px; font-size: 14px; }
.webgui-textbox:focus { border-color: #007bff; outline: none; box-shadow: 0 0 5px rgba(0,123,255,0.5); }
.webgui-sensor-container { margin: 15px 0; }
.webgui-sensor-label { display: block; margin: 10px 0 5px 0; font-weight: bold; }
.webgui-sensor-value { color: #007bff; font-weight: bold; font-size: 1.1em; }
.webgui-toggle-container { margin: 15px 0; }
.webgui-toggle-switch { position: relative; display: inline-block; width: 60px; height: 34px; }
.webgui-toggle-input { opacity: 0; width: 0; height: 0; }
.webgui-toggle-slider { position: absolute; cursor: pointer; top: 0; left: 0; right: 0; bottom: 0; background: #ccc; transition: 0.4s; border-radius: 34px; }
.webgui-toggle-slider:before { position: absolute; content: ""; height: 26px; width: 26px; left: 4px; bottom: 4px; background: white; transition: 0.4s; border-radius: 50%; }
.webgui-toggle-input:checked + .webgui-toggle-slider { background: #2196F3; }
.webgui-toggle-input:checked + .webgui-toggle-slider:before { transform: translateX(26px); }
"#;

/// Accent color used by [`DEFAULT_CSS`], rewritten by themes.
const DEFAULT_ACCENT: &str = "#007bff";

/// Color and font choices for a themed stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_ACCENT.to_string(),
            secondary_color: "#6c757d".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#333333".to_string(),
            font_family: "Arial, sans-serif".to_string(),
        }
    }
}

impl Theme {
    /// The default stylesheet with this theme's colors applied.
    pub fn css(&self) -> String {
        let mut css = DEFAULT_CSS.replace(DEFAULT_ACCENT, &self.primary_color);
        css.push_str(&format!(
            "body {{ background: {}; color: {}; font-family: {}; }}\n.webgui-button-secondary {{ border-color: {}; }}\n",
            self.background_color, self.text_color, self.font_family, self.secondary_color
        ));
        css
    }
}

/// Which stylesheet the page carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Stylesheet {
    #[default]
    Default,
    /// Caller CSS replaces the built-in stylesheet.
    Custom(String),
    /// Caller CSS appended to the built-in stylesheet.
    Extended(String),
    Themed(Theme),
}

impl Stylesheet {
    pub fn css(&self) -> std::borrow::Cow<'_, str> {
        use std::borrow::Cow;

        match self {
            Stylesheet::Default => Cow::Borrowed(DEFAULT_CSS),
            Stylesheet::Custom(css) => Cow::Borrowed(css),
            Stylesheet::Extended(extra) => Cow::Owned(format!("{DEFAULT_CSS}{extra}")),
            Stylesheet::Themed(theme) => Cow::Owned(theme.css()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_keeps_accent() {
        let css = Theme::default().css();
        assert!(css.starts_with(DEFAULT_CSS));
        assert!(css.contains("background: #ffffff"));
    }

    #[test]
    fn test_theme_rewrites_accent() {
        let theme = Theme {
            primary_color: "#ff5722".to_string(),
            ..Default::default()
        };
        let css = theme.css();
        assert!(!css.contains(DEFAULT_ACCENT));
        assert!(css.contains(".webgui-sensor-value { color: #ff5722;"));
    }

    #[test]
    fn test_stylesheet_variants() {
        assert_eq!(Stylesheet::Default.css(), DEFAULT_CSS);
        assert_eq!(Stylesheet::Custom("p{}".into()).css(), "p{}");
        assert!(Stylesheet::Extended("p{}".into()).css().ends_with("\np{}"));
    }
}
