use std::fmt;
use std::sync::Arc;

use super::lru::Weighted;

/// An immutable view over cached bytes.
///
/// The payload is shared behind an `Arc`, so cloning a view is cheap and no
/// holder can ever mutate the bytes another holder sees. Callers that need an
/// owned buffer get a copy via [`ByteView::to_vec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    /// Copies `bytes` into a new view.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns an owned copy of the payload.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Read-only view of the payload.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy UTF-8 rendering of the payload.
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::copy_from(s.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str_lossy())
    }
}

impl Weighted for ByteView {
    fn weight(&self) -> usize {
        self.len()
    }
}
