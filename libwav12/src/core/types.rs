//! common types for the wav12 codec

use serde::Serialize;

use super::audio_constants::{raw_size, MAX_SHIFT_BITS, MIN_BITS_PER_SAMPLE};
use super::error::{Wav12Error, Wav12Result};

// constants

/// Magic tag "wv12"
pub const MAGIC: [u8; 4] = *b"wv12";

/// asset header size (includes magic)
pub const HEADER_SIZE: usize = 16;

/// format version
pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;

// types

/// payload format
///
/// | Value | Type   | Description                         |
/// |-------|--------|-------------------------------------|
/// | 0     | Raw    | little-endian i16 PCM passthrough   |
/// | 1     | Linear | predictive delta bitstream          |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum Format {
    Raw = 0,
    Linear = 1,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Raw => "raw",
            Format::Linear => "linear",
        }
    }
}

impl TryFrom<u8> for Format {
    type Error = Wav12Error;

    fn try_from(v: u8) -> Wav12Result<Self> {
        match v {
            0 => Ok(Format::Raw),
            1 => Ok(Format::Linear),
            other => Err(Wav12Error::InvalidAsset(format!(
                "unknown format flag {}",
                other
            ))),
        }
    }
}

/// asset header
///
/// Layout (little-endian, 16 bytes):
/// `magic[4] len_in_bytes:u32 n_samples:u32 format:u8 shift_bits:u8 reserved[2]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetHeader {
    /// payload size, header excluded
    pub len_in_bytes: u32,
    pub n_samples: u32,
    pub format: Format,
    /// always 0 for raw payloads
    pub shift_bits: u8,
}

impl AssetHeader {
    pub fn new(n_samples: u32, len_in_bytes: u32, format: Format, shift_bits: u8) -> Self {
        AssetHeader {
            len_in_bytes,
            n_samples,
            format,
            shift_bits,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.len_in_bytes.to_le_bytes());
        out[8..12].copy_from_slice(&self.n_samples.to_le_bytes());
        out[12] = self.format as u8;
        out[13] = self.shift_bits;
        // 14..16 reserved
        out
    }

    /// parse and validate the fixed header at the start of `data`
    pub fn parse(data: &[u8]) -> Wav12Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Wav12Error::InvalidAsset(format!(
                "header needs {} bytes, got {}",
                HEADER_SIZE,
                data.len()
            )));
        }
        if data[..4] != MAGIC {
            return Err(Wav12Error::InvalidAsset("bad magic".to_string()));
        }

        let len_in_bytes = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        let n_samples = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);
        let header = AssetHeader {
            len_in_bytes,
            n_samples,
            format: Format::try_from(data[12])?,
            shift_bits: data[13],
        };
        header.check_shift()?;
        header.check_payload_len()?;
        Ok(header)
    }

    /// payload size if stored uncompressed
    pub fn raw_len(&self) -> usize {
        raw_size(self.n_samples as usize)
    }

    /// raw size over payload size
    pub fn compression_ratio(&self) -> f64 {
        if self.len_in_bytes == 0 {
            return 0.0;
        }
        self.raw_len() as f64 / self.len_in_bytes as f64
    }

    /// a linear sample costs at least 6 bits, a raw one exactly 2 bytes
    pub(crate) fn check_payload_len(&self) -> Wav12Result<()> {
        let ok = match self.format {
            Format::Raw => self.len_in_bytes as usize == self.raw_len(),
            Format::Linear => {
                self.n_samples as u64 * MIN_BITS_PER_SAMPLE <= self.len_in_bytes as u64 * 8
            }
        };
        if !ok {
            return Err(Wav12Error::InvalidAsset(format!(
                "{} payload of {} bytes cannot hold {} samples",
                self.format.name(),
                self.len_in_bytes,
                self.n_samples
            )));
        }
        Ok(())
    }

    pub(crate) fn check_shift(&self) -> Wav12Result<()> {
        if self.shift_bits >= MAX_SHIFT_BITS {
            return Err(Wav12Error::InvalidAsset(format!(
                "shift of {} bits is out of range",
                self.shift_bits
            )));
        }
        if self.format == Format::Raw && self.shift_bits != 0 {
            return Err(Wav12Error::InvalidAsset(
                "raw payload with nonzero shift".to_string(),
            ));
        }
        Ok(())
    }
}
