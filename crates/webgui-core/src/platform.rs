//! Per-board strategy selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::render::RenderMode;
use crate::settings::SettingsStrategy;

/// Supported boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Esp32,
    #[serde(rename = "nano-33-iot")]
    Nano33Iot,
    UnoR4Wifi,
}

impl Platform {
    pub fn profile(self) -> PlatformProfile {
        match self {
            Platform::Esp32 => PlatformProfile {
                platform: self,
                render_mode: RenderMode::Buffered,
                settings: SettingsStrategy::Preferences,
                gateway_quirk: false,
            },
            Platform::Nano33Iot => PlatformProfile {
                platform: self,
                render_mode: RenderMode::Streaming,
                settings: SettingsStrategy::FlashEmulation,
                gateway_quirk: false,
            },
            Platform::UnoR4Wifi => PlatformProfile {
                platform: self,
                render_mode: RenderMode::Streaming,
                settings: SettingsStrategy::Eeprom,
                gateway_quirk: true,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Esp32 => "esp32",
            Platform::Nano33Iot => "nano-33-iot",
            Platform::UnoR4Wifi => "uno-r4-wifi",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}', expected esp32, nano-33-iot or uno-r4-wifi")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "esp32" => Ok(Platform::Esp32),
            "nano-33-iot" | "nano33iot" => Ok(Platform::Nano33Iot),
            "uno-r4-wifi" | "unor4wifi" => Ok(Platform::UnoR4Wifi),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// What a board needs from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformProfile {
    pub platform: Platform,
    pub render_mode: RenderMode,
    pub settings: SettingsStrategy,
    /// The WiFi stack reports the subnet mask as the gateway.
    pub gateway_quirk: bool,
}
