//! Frame and log payloads as stored in a queue.

use std::fmt;

/// Immutable, opaque payload stored in a queue.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Message(Box<[u8]>);

impl Message {
    /// Copies `bytes`, keeping at most `max_len` of them.
    pub fn truncated(bytes: &[u8], max_len: usize) -> Self {
        let len = bytes.len().min(max_len);
        Self(Box::from(&bytes[..len]))
    }

    /// Length of the payload in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrowed payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the message, returning its payload.
    pub fn into_vec(self) -> Vec<u8> {
        self.0.into_vec()
    }

    /// Copies as much of the payload as fits into `buf`, returning the count.
    pub fn copy_to(&self, buf: &mut [u8]) -> usize {
        let len = self.len().min(buf.len());
        buf[..len].copy_from_slice(&self.0[..len]);
        len
    }
}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl From<&[u8]> for Message {
    fn from(bytes: &[u8]) -> Self {
        Self(Box::from(bytes))
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").field("len", &self.len()).finish()
    }
}
