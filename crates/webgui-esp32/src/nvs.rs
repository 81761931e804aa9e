//! [`SettingsStore`] over ESP-IDF NVS, the board's preferences store.
//!
//! Ints are stored as `i32`, floats as their `u32` bit pattern, bools as
//! `u8` and text as NVS strings. Keys follow the NVS limit of 15 bytes.

use esp_idf_svc::nvs::{EspNvs, EspNvsPartition, NvsDefault};
use esp_idf_svc::sys::{esp, nvs_commit, nvs_erase_all, EspError};
use log::debug;

use webgui_core::settings::preferences::{DEFAULT_NAMESPACE, MAX_KEY_LEN};
use webgui_core::settings::{SettingKind, SettingValue, SettingsError, SettingsStore};

/// Longest string value read back.
const MAX_TEXT_LEN: usize = 256;

pub struct NvsSettings {
    nvs: EspNvs<NvsDefault>,
}

fn nvs_error(e: EspError) -> SettingsError {
    SettingsError::Io(std::io::Error::other(e))
}

fn check_key(key: &str) -> Result<(), SettingsError> {
    if key.is_empty() {
        return Err(SettingsError::InvalidKey(key.to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(SettingsError::KeyTooLong(key.to_string()));
    }
    Ok(())
}

impl NvsSettings {
    /// Open `namespace` read-write.
    pub fn open(partition: EspNvsPartition<NvsDefault>, namespace: &str) -> Result<Self, SettingsError> {
        let nvs = EspNvs::new(partition, namespace, true).map_err(nvs_error)?;
        debug!("NVS namespace '{}' opened", namespace);
        Ok(Self { nvs })
    }

    pub fn open_default(partition: EspNvsPartition<NvsDefault>) -> Result<Self, SettingsError> {
        Self::open(partition, DEFAULT_NAMESPACE)
    }
}

impl SettingsStore for NvsSettings {
    fn put(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        check_key(key)?;
        match value {
            SettingValue::Int(v) => self.nvs.set_i32(key, v),
            SettingValue::Float(v) => self.nvs.set_u32(key, v.to_bits()),
            SettingValue::Bool(v) => self.nvs.set_u8(key, u8::from(v)),
            SettingValue::Text(v) => self.nvs.set_str(key, &v),
        }
        .map_err(nvs_error)
    }

    fn get(&self, key: &str, kind: SettingKind) -> Result<Option<SettingValue>, SettingsError> {
        if check_key(key).is_err() {
            return Ok(None);
        }
        // A key written with another type reads back as absent.
        let value = match kind {
            SettingKind::Int => self.nvs.get_i32(key).ok().flatten().map(SettingValue::Int),
            SettingKind::Float => self
                .nvs
                .get_u32(key)
                .ok()
                .flatten()
                .map(|bits| SettingValue::Float(f32::from_bits(bits))),
            SettingKind::Bool => self
                .nvs
                .get_u8(key)
                .ok()
                .flatten()
                .map(|v| SettingValue::Bool(v != 0)),
            SettingKind::Text => {
                let mut buf = [0u8; MAX_TEXT_LEN];
                self.nvs
                    .get_str(key, &mut buf)
                    .ok()
                    .flatten()
                    .map(|s| SettingValue::Text(s.to_string()))
            }
        };
        Ok(value)
    }

    fn clear_all(&mut self) -> Result<(), SettingsError> {
        let handle = self.nvs.handle();
        esp!(unsafe { nvs_erase_all(handle) }).map_err(nvs_error)?;
        esp!(unsafe { nvs_commit(handle) }).map_err(nvs_error)?;
        debug!("NVS namespace cleared");
        Ok(())
    }
}
