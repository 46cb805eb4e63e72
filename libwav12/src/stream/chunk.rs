use std::io::{self, Read};

use log::trace;

use super::ByteSource;
use crate::core::{Wav12Error, Wav12Result};

/// working buffer size used when none is given
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// refill hook for [`ChunkStream`]
///
/// `fill` copies up to `buf.len()` bytes from the backing medium and returns
/// how many were written. Returning 0 means the medium is exhausted.
pub trait ChunkSource {
    fn fill(&mut self, buf: &mut [u8]) -> Wav12Result<usize>;
}

impl<C: ChunkSource + ?Sized> ChunkSource for &mut C {
    fn fill(&mut self, buf: &mut [u8]) -> Wav12Result<usize> {
        (**self).fill(buf)
    }
}

/// medium backed by an in-memory slice
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceSource { data, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ChunkSource for SliceSource<'_> {
    fn fill(&mut self, buf: &mut [u8]) -> Wav12Result<usize> {
        let rest = &self.data[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// medium backed by any reader (a file, a socket, a cursor)
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        ReadSource { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ChunkSource for ReadSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> Wav12Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.inner.read(&mut buf[n..]) {
                Ok(0) => break,
                Ok(read) => n += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(n)
    }
}

/// byte source with a fixed `N` byte working buffer, refilled on demand
///
/// Never asks its source for bytes past the declared `size`.
pub struct ChunkStream<C, const N: usize = DEFAULT_CHUNK_SIZE> {
    source: C,
    buf: [u8; N],
    /// valid bytes in `buf`
    filled: usize,
    /// next unread byte in `buf`
    cursor: usize,
    /// total bytes pulled from the source
    fetched: usize,
    size: usize,
    refills: usize,
}

impl<C: ChunkSource, const N: usize> ChunkStream<C, N> {
    /// stream of `size` bytes drawn from `source`
    pub fn new(source: C, size: usize) -> Self {
        ChunkStream {
            source,
            buf: [0u8; N],
            filled: 0,
            cursor: 0,
            fetched: 0,
            size,
            refills: 0,
        }
    }

    pub fn chunk_size(&self) -> usize {
        N
    }

    /// how many times the working buffer was refilled
    pub fn refills(&self) -> usize {
        self.refills
    }

    pub fn into_source(self) -> C {
        self.source
    }

    fn refill(&mut self) -> Wav12Result<()> {
        let want = N.min(self.size - self.fetched);
        let n = self.source.fill(&mut self.buf[..want])?.min(want);
        if n == 0 {
            return Err(Wav12Error::StreamExhausted {
                limit: self.fetched,
            });
        }
        trace!(
            "chunk refill: {} bytes at offset {} (asked {})",
            n,
            self.fetched,
            want
        );
        self.filled = n;
        self.cursor = 0;
        self.fetched += n;
        self.refills += 1;
        Ok(())
    }
}

impl<C: ChunkSource, const N: usize> ByteSource for ChunkStream<C, N> {
    fn get(&mut self) -> Wav12Result<u8> {
        if self.pos() >= self.size {
            return Err(Wav12Error::StreamExhausted { limit: self.size });
        }
        if self.cursor == self.filled {
            self.refill()?;
        }
        let byte = self.buf[self.cursor];
        self.cursor += 1;
        Ok(byte)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn pos(&self) -> usize {
        self.fetched - (self.filled - self.cursor)
    }
}
