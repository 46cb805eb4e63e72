use log::debug;

use crate::core::{AssetHeader, Wav12Error, Wav12Result, HEADER_SIZE};
use crate::stream::MemStream;
use crate::streaming::Expander;

/// a parsed asset borrowing its payload
#[derive(Debug, Clone, Copy)]
pub struct Asset<'a> {
    pub header: AssetHeader,
    pub payload: &'a [u8],
}

impl<'a> Asset<'a> {
    /// expander over the in-memory payload
    pub fn expander(&self) -> Wav12Result<Expander<MemStream<'a>>> {
        Expander::from_header(MemStream::new(self.payload), &self.header)
    }
}

/// binary reader for wav12 assets
pub struct Reader;

impl Reader {
    /// new reader
    pub fn new() -> Self {
        Reader
    }

    /// read and validate an asset
    pub fn read<'a>(&self, data: &'a [u8]) -> Wav12Result<Asset<'a>> {
        let header = AssetHeader::parse(data)?;

        let mut cursor = Cursor::new(data);
        cursor.skip(HEADER_SIZE)?;
        let payload = cursor.read_bytes(header.len_in_bytes as usize)?;

        debug!(
            "read asset: {} samples, {} format, shift {}, {} payload bytes",
            header.n_samples,
            header.format.name(),
            header.shift_bits,
            payload.len()
        );
        Ok(Asset { header, payload })
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

// cursor helper

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> Wav12Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Wav12Error::InvalidAsset(format!(
                    "unexpected end of data: wanted {} bytes at offset {}, have {}",
                    count,
                    self.pos,
                    self.data.len()
                ))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn skip(&mut self, count: usize) -> Wav12Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    pub(crate) fn read_u32_le(&mut self) -> Wav12Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
