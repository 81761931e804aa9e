//! Persistent settings.
//!
//! Sketch code saves and loads small named values (int, float, bool,
//! string). Each platform backs this with a different strategy:
//!
//! - [`Preferences`] - namespaced key/value store (ESP32 NVS)
//! - [`EepromSettings`] over a [`FileEeprom`] - flash-emulated EEPROM
//!   with explicit commit (SAMD21 boards)
//! - [`EepromSettings`] over a [`MemoryEeprom`] or any other [`ByteStore`] -
//!   raw byte array (UNO R4 WiFi)
//!
//! Loading a key that was never saved yields the type's zero value.

pub mod eeprom;
pub mod preferences;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use eeprom::{ByteStore, EepromSettings, FileEeprom, MemoryEeprom};
pub use preferences::Preferences;

/// Errors raised by settings backends.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("address range {addr}..{end} outside {capacity}-byte store", end = .addr + .len)]
    OutOfRange {
        addr: usize,
        len: usize,
        capacity: usize,
    },

    #[error("invalid key '{0}'")]
    InvalidKey(String),

    #[error("key '{0}' longer than {max} bytes", max = preferences::MAX_KEY_LEN)]
    KeyTooLong(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The four storable value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    Int,
    Float,
    Bool,
    Text,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettingKind::Int => "int",
            SettingKind::Float => "float",
            SettingKind::Bool => "bool",
            SettingKind::Text => "string",
        };
        f.write_str(name)
    }
}

/// A stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum SettingValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Text(String),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Int(_) => SettingKind::Int,
            SettingValue::Float(_) => SettingKind::Float,
            SettingValue::Bool(_) => SettingKind::Bool,
            SettingValue::Text(_) => SettingKind::Text,
        }
    }
}

/// Rust types that map onto a [`SettingKind`].
pub trait Setting: Sized {
    const KIND: SettingKind;

    fn into_value(self) -> SettingValue;

    fn from_value(value: SettingValue) -> Option<Self>;

    /// Value returned for a key that was never saved.
    fn zero() -> Self;
}

macro_rules! impl_setting {
    ($ty:ty, $variant:ident, $zero:expr) => {
        impl Setting for $ty {
            const KIND: SettingKind = SettingKind::$variant;

            fn into_value(self) -> SettingValue {
                SettingValue::$variant(self)
            }

            fn from_value(value: SettingValue) -> Option<Self> {
                match value {
                    SettingValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn zero() -> Self {
                $zero
            }
        }
    };
}

impl_setting!(i32, Int, 0);
impl_setting!(f32, Float, 0.0);
impl_setting!(bool, Bool, false);
impl_setting!(String, Text, String::new());

/// A settings backend.
pub trait SettingsStore {
    /// Store `value` under `key`, committing before returning.
    fn put(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError>;

    /// Read the value of `kind` stored under `key`, if any.
    fn get(&self, key: &str, kind: SettingKind) -> Result<Option<SettingValue>, SettingsError>;

    /// Erase every stored setting.
    fn clear_all(&mut self) -> Result<(), SettingsError>;

    fn save<T: Setting>(&mut self, key: &str, value: T) -> Result<(), SettingsError>
    where
        Self: Sized,
    {
        self.put(key, value.into_value())
    }

    /// Load `key`, or the zero value of `T` when it was never saved.
    fn load<T: Setting>(&self, key: &str) -> Result<T, SettingsError>
    where
        Self: Sized,
    {
        Ok(self
            .get(key, T::KIND)?
            .and_then(T::from_value)
            .unwrap_or_else(T::zero))
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn put(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str, kind: SettingKind) -> Result<Option<SettingValue>, SettingsError> {
        (**self).get(key, kind)
    }

    fn clear_all(&mut self) -> Result<(), SettingsError> {
        (**self).clear_all()
    }
}

/// Which backend a platform persists settings with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsStrategy {
    Preferences,
    FlashEmulation,
    Eeprom,
}

/// Open the backend for `strategy`.
///
/// With a `path` the settings survive restarts: a JSON file for
/// preferences, a raw image file for the byte-array strategies. Without one
/// they live in memory.
pub fn open_store(
    strategy: SettingsStrategy,
    path: Option<&Path>,
) -> Result<Box<dyn SettingsStore + Send>, SettingsError> {
    let store: Box<dyn SettingsStore + Send> = match (strategy, path) {
        (SettingsStrategy::Preferences, Some(path)) => {
            Box::new(Preferences::open(preferences::DEFAULT_NAMESPACE, path)?)
        }
        (SettingsStrategy::Preferences, None) => {
            Box::new(Preferences::in_memory(preferences::DEFAULT_NAMESPACE))
        }
        (SettingsStrategy::FlashEmulation | SettingsStrategy::Eeprom, Some(path)) => {
            Box::new(EepromSettings::new(FileEeprom::open(path, eeprom::EEPROM_SIZE)?))
        }
        (SettingsStrategy::FlashEmulation | SettingsStrategy::Eeprom, None) => {
            Box::new(EepromSettings::new(MemoryEeprom::new(eeprom::EEPROM_SIZE)))
        }
    };
    tracing::debug!("Opened {:?} settings store", strategy);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<S: SettingsStore>(store: &mut S) {
        store.save("count", 42).unwrap();
        store.save("ratio", 0.75f32).unwrap();
        store.save("enabled", true).unwrap();
        store.save("ssid", "home".to_string()).unwrap();

        assert_eq!(store.load::<i32>("count").unwrap(), 42);
        assert_eq!(store.load::<f32>("ratio").unwrap(), 0.75);
        assert!(store.load::<bool>("enabled").unwrap());
        assert_eq!(store.load::<String>("ssid").unwrap(), "home");
    }

    fn absent_keys_are_zero<S: SettingsStore>(store: &S) {
        assert_eq!(store.load::<i32>("missing").unwrap(), 0);
        assert_eq!(store.load::<f32>("missing").unwrap(), 0.0);
        assert!(!store.load::<bool>("missing").unwrap());
        assert_eq!(store.load::<String>("missing").unwrap(), "");
    }

    #[test]
    fn test_every_strategy_round_trips() {
        for strategy in [
            SettingsStrategy::Preferences,
            SettingsStrategy::FlashEmulation,
            SettingsStrategy::Eeprom,
        ] {
            let mut store = open_store(strategy, None).unwrap();
            absent_keys_are_zero(&store);
            round_trip(&mut store);

            store.clear_all().unwrap();
            absent_keys_are_zero(&store);
        }
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(SettingValue::Float(1.0).kind(), SettingKind::Float);
        assert_eq!(SettingKind::Text.to_string(), "string");
        assert_eq!(i32::from_value(SettingValue::Bool(true)), None);
    }
}
