//! Page shell and page metadata.
//!
//! The shell template carries five placeholders, each exactly once:
//! `%TITLE%`, `%HEADING%`, `%CSS%`, `%ELEMENTS%` and `%JAVASCRIPT%`. Values
//! are inserted wholesale with no escaping and no rescanning.

use serde::{Deserialize, Serialize};

use crate::template;
use crate::theme::Stylesheet;

/// HTML shell every page is built from.
pub const SHELL_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>%TITLE%</title>
    <style>
        %CSS%
    </style>
</head>
<body>
    <div class="container">
        <h1>%HEADING%</h1>
        %ELEMENTS%
    </div>
    <script>
        %JAVASCRIPT%
    </script>
</body>
</html>
"#;

/// Interval of the client-side `/get` poll.
pub const POLL_INTERVAL_MS: u32 = 500;

/// Client script shared by every page, one statement group per entry.
///
/// Kept as separate fragments so the streaming renderer can send them
/// one at a time.
pub const CLIENT_SCRIPT: &[&str] = &[
    "\nvar buttonStates = {};\n",
    "function updateValue(id, val) { fetch('/set?' + id + '=' + val).catch(e => console.log('Error:', e)); }\n",
    "function buttonClick(id) { fetch('/set?' + id + '=1').catch(e => console.log('Error:', e)); }\n",
    "function toggleChange(id, checked) { fetch('/set?' + id + '=' + (checked ? 'true' : 'false')).catch(e => console.log('Error:', e)); }\n",
    "function textboxChange(id, value) { fetch('/set?' + id + '=' + encodeURIComponent(value)).catch(e => console.log('Error:', e)); }\n",
    "function sliderChange(id, value) { document.getElementById(id + '_value').textContent = value; updateValue(id, value); }\n",
    "function debouncedSliderChange(id, value, debounceMs) {\n",
    "  document.getElementById(id + '_value').textContent = value;\n",
    "  if (window['timeout_' + id]) { clearTimeout(window['timeout_' + id]); }\n",
    "  window['timeout_' + id] = setTimeout(() => { updateValue(id, value); }, debounceMs);\n",
    "}\n",
    "function initializeButtonStates() {\n",
    "  document.querySelectorAll('.webgui-button').forEach(function(button) { buttonStates[button.id] = false; button.classList.add('webgui-button-inactive'); });\n",
    "}\n",
    "document.addEventListener('DOMContentLoaded', initializeButtonStates);\n",
    "function updateSensorDisplays() {\n",
    "  fetch('/get').then(response => response.json()).then(data => {\n",
    "    for (let elementId in data) {\n",
    "      let displayElement = document.getElementById(elementId + '_display');\n",
    "      if (displayElement) { displayElement.textContent = data[elementId]; }\n",
    "      let toggleElement = document.getElementById(elementId);\n",
    "      if (toggleElement && toggleElement.type === 'checkbox') {\n",
    "        let shouldBeChecked = (data[elementId] === 'true' || data[elementId] === '1');\n",
    "        if (toggleElement.checked !== shouldBeChecked) { toggleElement.checked = shouldBeChecked; }\n",
    "      }\n",
    "    }\n",
    "  }).catch(error => { console.error('Update failed:', error); });\n",
    "}\n",
    "setInterval(updateSensorDisplays, 500);\n",
    "updateSensorDisplays();\n",
];

/// A placeholder of the shell template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Title,
    Heading,
    Css,
    Elements,
    Javascript,
}

impl Slot {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "TITLE" => Some(Slot::Title),
            "HEADING" => Some(Slot::Heading),
            "CSS" => Some(Slot::Css),
            "ELEMENTS" => Some(Slot::Elements),
            "JAVASCRIPT" => Some(Slot::Javascript),
            _ => None,
        }
    }
}

/// Title, heading and stylesheet of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub title: String,
    pub heading: String,
    #[serde(default)]
    pub stylesheet: Stylesheet,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Arduino WebGUI".to_string(),
            heading: "Control Panel".to_string(),
            stylesheet: Stylesheet::Default,
        }
    }
}

impl PageConfig {
    /// Set both the document title and the visible heading.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.heading = title.to_string();
    }

    pub fn set_heading(&mut self, heading: &str) {
        self.heading = heading.to_string();
    }

    pub fn set_custom_css(&mut self, css: &str) {
        self.stylesheet = Stylesheet::Custom(css.to_string());
    }

    pub fn use_default_styles(&mut self) {
        self.stylesheet = Stylesheet::Default;
    }
}

/// Fully rendered values for the shell placeholders.
#[derive(Debug, Clone, Default)]
pub struct PageParts {
    pub title: String,
    pub heading: String,
    pub css: String,
    pub elements: String,
    pub javascript: String,
}

impl PageParts {
    fn slot(&self, slot: Slot) -> &str {
        match slot {
            Slot::Title => &self.title,
            Slot::Heading => &self.heading,
            Slot::Css => &self.css,
            Slot::Elements => &self.elements,
            Slot::Javascript => &self.javascript,
        }
    }
}

/// Substitute `parts` into `shell`.
pub fn assemble(shell: &str, parts: &PageParts) -> String {
    template::substitute(shell, |name| Slot::from_name(name).map(|slot| parts.slot(slot)))
}
