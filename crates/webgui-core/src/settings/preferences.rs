//! Namespaced key/value preference store.
//!
//! Mirrors the ESP32 NVS preferences API: keys are at most
//! [`MAX_KEY_LEN`] bytes, values are typed, and reading a key with the
//! wrong type behaves like reading an absent key. On hosts the namespace
//! can be persisted to a JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{SettingKind, SettingValue, SettingsError, SettingsStore};

/// NVS key length limit.
pub const MAX_KEY_LEN: usize = 15;

pub const DEFAULT_NAMESPACE: &str = "webgui";

/// On-disk value. Floats keep their bit pattern so NaN and infinities
/// survive a reopen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum StoredValue {
    Int(i32),
    FloatBits(u32),
    Bool(bool),
    Text(String),
}

impl From<&SettingValue> for StoredValue {
    fn from(value: &SettingValue) -> Self {
        match value {
            SettingValue::Int(v) => StoredValue::Int(*v),
            SettingValue::Float(v) => StoredValue::FloatBits(v.to_bits()),
            SettingValue::Bool(v) => StoredValue::Bool(*v),
            SettingValue::Text(v) => StoredValue::Text(v.clone()),
        }
    }
}

impl From<StoredValue> for SettingValue {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Int(v) => SettingValue::Int(v),
            StoredValue::FloatBits(bits) => SettingValue::Float(f32::from_bits(bits)),
            StoredValue::Bool(v) => SettingValue::Bool(v),
            StoredValue::Text(v) => SettingValue::Text(v),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NamespaceFile {
    namespace: String,
    entries: BTreeMap<String, StoredValue>,
}

/// Typed values under one namespace.
#[derive(Debug, Clone)]
pub struct Preferences {
    namespace: String,
    entries: BTreeMap<String, SettingValue>,
    path: Option<PathBuf>,
}

impl Preferences {
    pub fn in_memory(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            entries: BTreeMap::new(),
            path: None,
        }
    }

    /// Open the namespace stored at `path`, starting empty when the file is
    /// missing. Entries saved under a different namespace are ignored.
    pub fn open(namespace: &str, path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => {
                let file: NamespaceFile = serde_json::from_str(&text)?;
                if file.namespace == namespace {
                    file.entries
                        .into_iter()
                        .map(|(key, value)| (key, SettingValue::from(value)))
                        .collect()
                } else {
                    tracing::warn!(
                        "Preferences file {} belongs to namespace '{}', ignoring",
                        path.display(),
                        file.namespace
                    );
                    BTreeMap::new()
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Opened preferences '{}' with {} entries",
            namespace,
            entries.len()
        );

        Ok(Self {
            namespace: namespace.to_string(),
            entries,
            path: Some(path),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
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

    fn persist(&self) -> Result<(), SettingsError> {
        if let Some(path) = &self.path {
            let file = NamespaceFile {
                namespace: self.namespace.clone(),
                entries: self
                    .entries
                    .iter()
                    .map(|(key, value)| (key.clone(), StoredValue::from(value)))
                    .collect(),
            };
            fs::write(path, serde_json::to_string_pretty(&file)?)?;
        }
        Ok(())
    }
}

impl SettingsStore for Preferences {
    fn put(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        Self::check_key(key)?;
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    /// Keys that could never have been stored read as absent.
    fn get(&self, key: &str, kind: SettingKind) -> Result<Option<SettingValue>, SettingsError> {
        Ok(self
            .entries
            .get(key)
            .filter(|value| value.kind() == kind)
            .cloned())
    }

    fn clear_all(&mut self) -> Result<(), SettingsError> {
        self.entries.clear();
        self.persist()?;
        tracing::info!("Cleared preferences '{}'", self.namespace);
        Ok(())
    }
}
