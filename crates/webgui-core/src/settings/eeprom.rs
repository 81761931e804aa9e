//! Hashed fixed-slot settings over a raw byte array.
//!
//! Layout: every value type owns a region of [`SLOT_COUNT`] slots of
//! [`SLOT_SIZE`] bytes. A key's slot index is `hash(key) % SLOT_COUNT`
//! where `hash` is the 16-bit wrapping `h * 31 + byte` over the key bytes.
//!
//! | Type   | Base   | Slot encoding                               |
//! |--------|--------|---------------------------------------------|
//! | string | 16     | length byte, then up to 15 bytes            |
//! | int    | 1616   | marker byte, then `i32` little-endian       |
//! | float  | 3216   | marker byte, then `f32` little-endian       |
//! | bool   | 4816   | marker byte, then one byte (0 or 1)         |
//!
//! Colliding keys share a slot and the last write wins. Erased storage
//! reads as `0xFF`, which decodes as "absent" for every type.

use std::fs;
use std::path::{Path, PathBuf};

use super::{SettingKind, SettingValue, SettingsError, SettingsStore};

pub const SLOT_COUNT: u16 = 100;
pub const SLOT_SIZE: usize = 16;

/// Longest string payload a slot holds, in bytes.
pub const MAX_STRING_LEN: usize = SLOT_SIZE - 1;

const STRING_BASE: usize = 16;
const INT_BASE: usize = 1616;
const FLOAT_BASE: usize = 3216;
const BOOL_BASE: usize = 4816;

/// Bytes needed to hold every region.
pub const EEPROM_SIZE: usize = BOOL_BASE + SLOT_COUNT as usize * SLOT_SIZE;

const ERASED: u8 = 0xFF;
const WRITTEN: u8 = 0xA5;

/// Raw non-volatile byte storage.
pub trait ByteStore {
    fn capacity(&self) -> usize;

    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), SettingsError>;

    fn write(&mut self, addr: usize, data: &[u8]) -> Result<(), SettingsError>;

    /// Make preceding writes durable.
    fn commit(&mut self) -> Result<(), SettingsError>;
}

fn check_range(addr: usize, len: usize, capacity: usize) -> Result<(), SettingsError> {
    match addr.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(SettingsError::OutOfRange {
            addr,
            len,
            capacity,
        }),
    }
}

/// Volatile EEPROM image. Starts erased.
#[derive(Debug, Clone)]
pub struct MemoryEeprom {
    bytes: Vec<u8>,
}

impl MemoryEeprom {
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![ERASED; capacity],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ByteStore for MemoryEeprom {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), SettingsError> {
        check_range(addr, buf.len(), self.bytes.len())?;
        buf.copy_from_slice(&self.bytes[addr..addr + buf.len()]);
        Ok(())
    }

    fn write(&mut self, addr: usize, data: &[u8]) -> Result<(), SettingsError> {
        check_range(addr, data.len(), self.bytes.len())?;
        self.bytes[addr..addr + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// Flash-emulated EEPROM backed by an image file.
///
/// Writes land in a RAM copy; [`ByteStore::commit`] writes the whole image
/// back when anything changed.
#[derive(Debug)]
pub struct FileEeprom {
    path: PathBuf,
    image: MemoryEeprom,
    dirty: bool,
}

impl FileEeprom {
    /// Load the image at `path`, or start erased when the file does not
    /// exist. A short image is padded with erased bytes.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let mut image = MemoryEeprom::new(capacity);

        match fs::read(&path) {
            Ok(bytes) => {
                let len = bytes.len().min(capacity);
                image.bytes[..len].copy_from_slice(&bytes[..len]);
                tracing::debug!("Loaded {} byte EEPROM image from {}", len, path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No EEPROM image at {}, starting erased", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            image,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl ByteStore for FileEeprom {
    fn capacity(&self) -> usize {
        self.image.capacity()
    }

    fn read(&self, addr: usize, buf: &mut [u8]) -> Result<(), SettingsError> {
        self.image.read(addr, buf)
    }

    fn write(&mut self, addr: usize, data: &[u8]) -> Result<(), SettingsError> {
        self.image.write(addr, data)?;
        self.dirty = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        if self.dirty {
            fs::write(&self.path, self.image.as_bytes())?;
            self.dirty = false;
        }
        Ok(())
    }
}

/// 16-bit wrapping `h * 31 + byte` over the key.
pub fn key_hash(key: &str) -> u16 {
    key.bytes()
        .fold(0u16, |h, b| h.wrapping_mul(31).wrapping_add(u16::from(b)))
}

fn slot_address(kind: SettingKind, key: &str) -> usize {
    let base = match kind {
        SettingKind::Text => STRING_BASE,
        SettingKind::Int => INT_BASE,
        SettingKind::Float => FLOAT_BASE,
        SettingKind::Bool => BOOL_BASE,
    };
    base + usize::from(key_hash(key) % SLOT_COUNT) * SLOT_SIZE
}

/// Longest prefix of `text` that fits in a string slot without splitting a
/// character.
fn truncate_to_slot(text: &str) -> &str {
    if text.len() <= MAX_STRING_LEN {
        return text;
    }
    let mut end = MAX_STRING_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Settings stored in hashed fixed-size slots of a [`ByteStore`].
#[derive(Debug)]
pub struct EepromSettings<B> {
    bytes: B,
}

impl<B: ByteStore> EepromSettings<B> {
    pub fn new(bytes: B) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &B {
        &self.bytes
    }

    pub fn into_inner(self) -> B {
        self.bytes
    }
}

impl<B: ByteStore> SettingsStore for EepromSettings<B> {
    fn put(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        let addr = slot_address(value.kind(), key);
        let mut slot = [ERASED; SLOT_SIZE];

        let used = match &value {
            SettingValue::Text(text) => {
                let stored = truncate_to_slot(text);
                if stored.len() < text.len() {
                    tracing::debug!("Truncated setting '{}' to {} bytes", key, stored.len());
                }
                slot[0] = stored.len() as u8;
                slot[1..=stored.len()].copy_from_slice(stored.as_bytes());
                1 + stored.len()
            }
            SettingValue::Int(v) => {
                slot[0] = WRITTEN;
                slot[1..5].copy_from_slice(&v.to_le_bytes());
                5
            }
            SettingValue::Float(v) => {
                slot[0] = WRITTEN;
                slot[1..5].copy_from_slice(&v.to_le_bytes());
                5
            }
            SettingValue::Bool(v) => {
                slot[0] = WRITTEN;
                slot[1] = u8::from(*v);
                2
            }
        };

        self.bytes.write(addr, &slot[..used])?;
        self.bytes.commit()
    }

    fn get(&self, key: &str, kind: SettingKind) -> Result<Option<SettingValue>, SettingsError> {
        let addr = slot_address(kind, key);
        let mut slot = [0u8; SLOT_SIZE];
        self.bytes.read(addr, &mut slot)?;

        let value = match kind {
            SettingKind::Text => {
                let len = usize::from(slot[0]);
                if slot[0] == ERASED {
                    None
                } else if len > MAX_STRING_LEN {
                    Some(SettingValue::Text(String::new()))
                } else {
                    let text = String::from_utf8_lossy(&slot[1..=len]).into_owned();
                    Some(SettingValue::Text(text))
                }
            }
            _ if slot[0] != WRITTEN => None,
            SettingKind::Int => {
                let raw = [slot[1], slot[2], slot[3], slot[4]];
                Some(SettingValue::Int(i32::from_le_bytes(raw)))
            }
            SettingKind::Float => {
                let raw = [slot[1], slot[2], slot[3], slot[4]];
                Some(SettingValue::Float(f32::from_le_bytes(raw)))
            }
            SettingKind::Bool => Some(SettingValue::Bool(slot[1] != 0)),
        };
        Ok(value)
    }

    fn clear_all(&mut self) -> Result<(), SettingsError> {
        let erased = vec![ERASED; self.bytes.capacity()];
        self.bytes.write(0, &erased)?;
        self.bytes.commit()?;
        tracing::info!("Cleared {} bytes of settings storage", erased.len());
        Ok(())
    }
}
