//! Shared in-memory byte buffer
//!
//! One buffer per process, created lazily from a seed string the first time
//! either surface asks for it. Every caller gets a handle to the same bytes,
//! so a change made from the console is visible over HTTP and vice versa.
//!
//! Reads and writes take a mutex, which makes each operation atomic with
//! respect to the other surface.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

/// Buffer mutation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("Index {index} is out of range (length {len})")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Invalid byte value: {0:?} (expected hex 00-FF)")]
    InvalidByte(String),
}

/// Process-wide owner of the loaded buffer
pub struct BufferStore {
    seed: Vec<u8>,
    slot: OnceLock<LoadedBuffer>,
}

impl BufferStore {
    pub fn new(seed: impl Into<Vec<u8>>) -> Self {
        Self {
            seed: seed.into(),
            slot: OnceLock::new(),
        }
    }

    /// Return the shared buffer, creating it from the seed on first use.
    pub fn ensure_loaded(&self) -> LoadedBuffer {
        self.slot
            .get_or_init(|| {
                tracing::debug!(len = self.seed.len(), "Loading buffer from seed");
                LoadedBuffer {
                    bytes: Arc::new(Mutex::new(self.seed.clone())),
                }
            })
            .clone()
    }

    /// Whether the buffer has been created yet
    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }
}

/// Handle to the shared buffer. Cloning the handle never copies the bytes.
#[derive(Clone)]
pub struct LoadedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LoadedBuffer {
    pub fn len(&self) -> usize {
        self.bytes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Current contents as text, with invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Two-digit uppercase hex of each byte, taken from a snapshot.
    ///
    /// The iterator is lazy and can be cloned to walk it again.
    pub fn hex(&self) -> HexBytes {
        HexBytes {
            bytes: self.snapshot(),
            pos: 0,
        }
    }

    /// Overwrite the byte at `index`.
    ///
    /// Out-of-range indices (negative included) leave the buffer untouched.
    pub fn set_byte(&self, index: i64, value: u8) -> Result<(), BufferError> {
        let mut bytes = self.bytes.lock();
        let len = bytes.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| bytes.get_mut(i))
            .ok_or(BufferError::IndexOutOfRange { index, len })?;
        *slot = value;
        tracing::debug!(index, value = format!("{:02X}", value), "Buffer byte updated");
        Ok(())
    }

    /// Whether two handles refer to the same underlying buffer
    pub fn same_buffer(&self, other: &LoadedBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

/// Lazy hex rendering of a byte snapshot
#[derive(Clone)]
pub struct HexBytes {
    bytes: Vec<u8>,
    pos: usize,
}

impl Iterator for HexBytes {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(format!("{:02X}", byte))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HexBytes {}

/// Parse a single byte written in hex (`5A`, `5a`, `0x5A`).
pub fn parse_hex_byte(input: &str) -> Result<u8, BufferError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 2 {
        return Err(BufferError::InvalidByte(input.trim().to_string()));
    }

    u8::from_str_radix(digits, 16).map_err(|_| BufferError::InvalidByte(input.trim().to_string()))
}
