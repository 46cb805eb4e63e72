use super::ByteSource;
use crate::core::{Wav12Error, Wav12Result};

/// byte source over a borrowed buffer
#[derive(Debug, Clone)]
pub struct MemStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MemStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        MemStream { data, pos: 0 }
    }

    /// bytes not yet consumed
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn exhausted(&self) -> Wav12Error {
        Wav12Error::StreamExhausted {
            limit: self.data.len(),
        }
    }
}

impl ByteSource for MemStream<'_> {
    fn get(&mut self) -> Wav12Result<u8> {
        let byte = *self.data.get(self.pos).ok_or_else(|| self.exhausted())?;
        self.pos += 1;
        Ok(byte)
    }

    fn get16(&mut self) -> Wav12Result<i16> {
        match self.data.get(self.pos..self.pos + 2) {
            Some(pair) => {
                self.pos += 2;
                Ok(i16::from_le_bytes([pair[0], pair[1]]))
            }
            None => Err(self.exhausted()),
        }
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn pos(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_stream_reads_in_order() {
        let data = [1u8, 2, 0x34, 0x12];
        let mut stream = MemStream::new(&data);
        assert_eq!(stream.size(), 4);
        assert_eq!(stream.get().unwrap(), 1);
        assert_eq!(stream.get().unwrap(), 2);
        assert_eq!(stream.remaining(), 2);
        assert_eq!(stream.get16().unwrap(), 0x1234);
        assert_eq!(stream.pos(), 4);
        assert!(stream.rest().is_empty());
        assert!(matches!(
            stream.get(),
            Err(Wav12Error::StreamExhausted { limit: 4 })
        ));
    }

    #[test]
    fn test_mem_stream_half_sample_is_exhausted() {
        let data = [0xffu8];
        let mut stream = MemStream::new(&data);
        assert!(stream.get16().is_err());
        // failed read consumes nothing
        assert_eq!(stream.pos(), 0);
    }
}
