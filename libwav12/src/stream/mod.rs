//! pull-based byte sources feeding the bit reader
//!
//! [`MemStream`] borrows a flat buffer. [`ChunkStream`] keeps a small fixed
//! working buffer and refills it from a [`ChunkSource`] on demand, so a long
//! payload never has to be resident in memory.
mod chunk;
mod mem;

pub use chunk::{ChunkSource, ChunkStream, ReadSource, SliceSource, DEFAULT_CHUNK_SIZE};
pub use mem::MemStream;

use crate::core::{Wav12Error, Wav12Result};

/// a sequential byte source with a known total size
pub trait ByteSource {
    /// next byte
    fn get(&mut self) -> Wav12Result<u8>;

    /// next little-endian 16-bit sample
    ///
    /// Consumes nothing when fewer than two bytes remain.
    fn get16(&mut self) -> Wav12Result<i16> {
        if self.remaining() < 2 {
            return Err(Wav12Error::StreamExhausted { limit: self.size() });
        }
        let lo = self.get()?;
        let hi = self.get()?;
        Ok(i16::from_le_bytes([lo, hi]))
    }

    /// total bytes this source will ever yield
    fn size(&self) -> usize;

    /// bytes consumed so far
    fn pos(&self) -> usize;

    fn remaining(&self) -> usize {
        self.size().saturating_sub(self.pos())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn get(&mut self) -> Wav12Result<u8> {
        (**self).get()
    }

    fn get16(&mut self) -> Wav12Result<i16> {
        (**self).get16()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn pos(&self) -> usize {
        (**self).pos()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn get(&mut self) -> Wav12Result<u8> {
        (**self).get()
    }

    fn get16(&mut self) -> Wav12Result<i16> {
        (**self).get16()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn pos(&self) -> usize {
        (**self).pos()
    }
}
