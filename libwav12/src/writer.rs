use crate::core::{AssetHeader, Format, Wav12Error, Wav12Result, HEADER_SIZE};

/// binary writer for wav12 assets (header followed by payload)
pub struct Writer;

impl Writer {
    /// new writer
    pub fn new() -> Self {
        Writer
    }

    /// write a complete asset
    pub fn write(
        &self,
        n_samples: u32,
        format: Format,
        shift_bits: u8,
        payload: &[u8],
    ) -> Wav12Result<Vec<u8>> {
        let len_in_bytes = u32::try_from(payload.len()).map_err(|_| {
            Wav12Error::out_of_bounds("payload bytes", payload.len(), u32::MAX as usize)
        })?;
        let header = AssetHeader::new(n_samples, len_in_bytes, format, shift_bits);

        let mut buffer = Vec::with_capacity(HEADER_SIZE + payload.len());
        buffer.extend_from_slice(&header.to_bytes());
        buffer.extend_from_slice(payload);
        Ok(buffer)
    }

    /// little-endian PCM payload for a raw asset
    pub fn raw_payload(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
