// Licensed under the Apache-2.0 license

//! Fixed-width little-endian byte buffer.
//!
//! A [`BitBuffer`] is the serialization boundary between [`Value`](crate::Value)
//! and raw binding I/O. Its size in bytes is always `ceil(bits / 8)`; bits past
//! the declared width start out zero but may be written by the caller.

use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: usize,
    bytes: Vec<u8>,
}

fn bytes_for(bits: usize) -> usize {
    (bits + 7) / 8
}

impl BitBuffer {
    /// Create a zero-filled buffer of `bits` bits.
    pub fn new(bits: usize) -> Self {
        Self::with_fill(bits, 0)
    }

    /// Create a buffer of `bits` bits with every byte set to `byte`.
    pub fn with_fill(bits: usize, byte: u8) -> Self {
        Self {
            bits,
            bytes: vec![byte; bytes_for(bits)],
        }
    }

    /// Create a buffer of `bits` bits from little-endian `data`.
    ///
    /// Extra input bytes are dropped; missing ones are zero.
    pub fn from_bytes(bits: usize, data: &[u8]) -> Self {
        let mut buf = Self::new(bits);
        let n = data.len().min(buf.bytes.len());
        buf.bytes[..n].copy_from_slice(&data[..n]);
        buf
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn byte(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Set the byte at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size_bytes()`.
    pub fn set_byte(&mut self, index: usize, byte: u8) {
        self.bytes[index] = byte;
    }

    pub fn fill(&mut self, byte: u8) {
        self.bytes.fill(byte);
    }

    /// Change the width, keeping the low-order bytes and zero-filling growth.
    pub fn resize(&mut self, bits: usize) {
        self.bits = bits;
        self.bytes.resize(bytes_for(bits), 0);
    }
}

impl Index<usize> for BitBuffer {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.bytes[index]
    }
}

impl IndexMut<usize> for BitBuffer {
    fn index_mut(&mut self, index: usize) -> &mut u8 {
        &mut self.bytes[index]
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.bytes))
    }
}
