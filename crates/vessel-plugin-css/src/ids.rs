//! Short identifier generation for scoped class names and workspace names.
//!
//! Production code uses [`RandomIds`]. Tests inject [`SequentialIds`] so the
//! generated names are known in advance.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of short lowercase base-36 identifiers.
pub trait IdSource: Send + Sync + fmt::Debug {
    /// Return an identifier of exactly `len` characters.
    fn next_id(&self, len: usize) -> String;
}

/// Random identifiers backed by UUID v4 entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self, len: usize) -> String {
        let mut out = String::with_capacity(len);
        while out.len() < len {
            // 128 bits yield 24 base-36 digits
            let chunk = encode_base36(uuid::Uuid::new_v4().as_u128(), 24);
            out.push_str(&chunk[..(len - out.len()).min(chunk.len())]);
        }
        out
    }
}

/// Deterministic counter: `000000`, `000001`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(value: u64) -> Self {
        Self {
            next: AtomicU64::new(value),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self, len: usize) -> String {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        encode_base36(u128::from(value), len)
    }
}

/// Lowercase base-36, left-padded with zeros and keeping the `len` least
/// significant digits.
fn encode_base36(mut value: u128, len: usize) -> String {
    let mut digits = vec![b'0'; len];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8(digits).unwrap_or_default()
}
