//! The control panel: widgets plus page metadata.
//!
//! A [`ControlPanel`] is created by the application and passed to whichever
//! front end serves it. It is the only owner of the widget registry.

use std::io::{self, Write};

use crate::page::PageConfig;
use crate::registry::Registry;
use crate::render;
use crate::theme::{Stylesheet, Theme};
use crate::widget::{Button, Handle, SensorStatus, Slider, TextBox, Toggle, Widget};

#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    registry: Registry,
    page: PageConfig,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(page: PageConfig) -> Self {
        Self {
            registry: Registry::new(),
            page,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut PageConfig {
        &mut self.page
    }

    pub fn set_title(&mut self, title: &str) {
        self.page.set_title(title);
    }

    pub fn set_heading(&mut self, heading: &str) {
        self.page.set_heading(heading);
    }

    pub fn set_custom_css(&mut self, css: &str) {
        self.page.set_custom_css(css);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.page.stylesheet = Stylesheet::Themed(theme);
    }

    pub fn use_default_styles(&mut self) {
        self.page.use_default_styles();
    }

    pub fn add_button(&mut self, label: &str) -> Handle<Button> {
        self.registry.add_button(label)
    }

    pub fn add_toggle(&mut self, label: &str) -> Handle<Toggle> {
        self.registry.add_toggle(label)
    }

    pub fn add_slider(&mut self, label: &str, min: i32, max: i32, value: i32) -> Handle<Slider> {
        self.registry.add_slider(label, min, max, value)
    }

    pub fn add_sensor_status(&mut self, label: &str) -> Handle<SensorStatus> {
        self.registry.add_sensor_status(label)
    }

    pub fn add_text_box(&mut self, label: &str, placeholder: &str) -> Handle<TextBox> {
        self.registry.add_text_box(label, placeholder)
    }

    pub fn get<W: Widget>(&self, handle: Handle<W>) -> Option<&W> {
        self.registry.get(handle)
    }

    pub fn get_mut<W: Widget>(&mut self, handle: Handle<W>) -> Option<&mut W> {
        self.registry.get_mut(handle)
    }

    pub fn render_page(&self) -> String {
        render::render_page(&self.page, &self.registry)
    }

    pub fn stream_page<W: Write>(&self, out: &mut W) -> io::Result<()> {
        render::stream_page(&self.page, &self.registry, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_delegates() {
        let mut panel = ControlPanel::new();
        panel.set_title("Boat");
        let pump = panel.add_toggle("Bilge pump");
        let level = panel.add_sensor_status("Water level");

        panel.get_mut(level).unwrap().set_int(12);
        assert!(panel.registry_mut().apply_update("element0", "1"));
        assert!(panel.get_mut(pump).unwrap().was_toggled());

        let html = panel.render_page();
        assert!(html.contains("<title>Boat</title>"));
        assert!(html.contains(">12</span>"));

        let mut streamed = Vec::new();
        panel.stream_page(&mut streamed).unwrap();
        assert_eq!(streamed, html.into_bytes());
    }

    #[test]
    fn test_theme_selection() {
        let mut panel = ControlPanel::new();
        panel.set_theme(Theme {
            primary_color: "#123456".into(),
            ..Default::default()
        });
        assert!(panel.render_page().contains("#123456"));

        panel.use_default_styles();
        assert!(!panel.render_page().contains("#123456"));
    }
}
