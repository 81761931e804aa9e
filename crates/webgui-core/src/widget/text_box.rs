//! Single-line text input, with helpers for network settings forms.

use super::{Control, Geometry, WidgetBase};
use crate::{net, template};

const TEXTBOX_TEMPLATE: &str = r#"
        <div class="webgui-textbox-container">
            <label for="%ID%" class="webgui-textbox-label">%LABEL%</label>
            <input type="text" id="%ID%" class="webgui-textbox" value="%VALUE%" placeholder="%PLACEHOLDER%" onchange="textboxChange('%ID%', this.value)">
        </div>
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    base: WidgetBase,
    value: String,
    placeholder: String,
    last_value: String,
    changed: bool,
}

impl TextBox {
    pub const DEFAULT_WIDTH: i32 = 300;
    pub const DEFAULT_HEIGHT: i32 = 30;

    pub fn new(id: impl Into<String>, label: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(
                id,
                label,
                Geometry::new(0, 0, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT),
            ),
            value: String::new(),
            placeholder: placeholder.into(),
            last_value: String::new(),
            changed: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Value held before the most recent browser update.
    pub fn last_value(&self) -> &str {
        &self.last_value
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    /// Set the text from sketch code and clear any pending change.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.changed = false;
    }

    /// Returns `true` once after the browser submitted different text.
    pub fn was_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// The current text if it is a valid IPv4 address.
    pub fn ip_address(&self) -> Option<&str> {
        self.has_valid_ip_address().then_some(self.value.as_str())
    }

    pub fn has_valid_ip_address(&self) -> bool {
        net::is_valid_ip_address(&self.value)
    }

    /// Store `ip` only if it is a valid IPv4 address; the current value is
    /// kept otherwise.
    pub fn set_ip_address(&mut self, ip: &str) -> bool {
        if net::is_valid_ip_address(ip) {
            self.set_value(ip);
            true
        } else {
            tracing::warn!("Invalid IP address format: {}", ip);
            false
        }
    }

    pub fn is_valid_ip_address(text: &str) -> bool {
        net::is_valid_ip_address(text)
    }

    pub fn is_valid_subnet_mask(text: &str) -> bool {
        net::is_valid_subnet_mask(text)
    }

    pub fn validate_network_config(ip: &str, subnet: &str, gateway: &str) -> bool {
        net::validate_network_config(ip, subnet, gateway)
    }

    pub fn format_ip_display(ip: &str, subnet: &str, gateway: &str) -> String {
        net::format_ip_display(ip, subnet, gateway)
    }
}

impl Control for TextBox {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn render_markup(&self) -> String {
        template::fill(
            TEXTBOX_TEMPLATE,
            &[
                ("ID", self.base.id()),
                ("LABEL", self.base.label()),
                ("VALUE", &self.value),
                ("PLACEHOLDER", &self.placeholder),
            ],
        )
    }

    fn apply_update(&mut self, raw: &str) {
        if raw != self.value {
            self.last_value = std::mem::replace(&mut self.value, raw.to_string());
            self.changed = true;
        }
    }

    fn value_string(&self) -> String {
        self.value.clone()
    }
}
