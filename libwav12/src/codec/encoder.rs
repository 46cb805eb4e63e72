use log::debug;

use super::linear::{check_shift, linear_compress};
use super::stats::CompressStat;
use crate::core::{raw_size, Format, Wav12Error, Wav12Result};
use crate::Writer;

/// packs mono samples into a complete asset
///
/// By default the linear payload is kept only when it is smaller than raw
/// PCM; `with_format` forces either choice.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    shift_bits: u8,
    format: Option<Format>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// low bits to discard before coding (lossy when non-zero)
    pub fn with_shift(mut self, shift_bits: u8) -> Self {
        self.shift_bits = shift_bits;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn shift_bits(&self) -> u8 {
        self.shift_bits
    }

    /// encode samples to a wav12 asset
    pub fn encode(&self, samples: &[i16]) -> Wav12Result<Vec<u8>> {
        self.encode_with_stats(samples).map(|(asset, _)| asset)
    }

    /// encode and also return the delta width histogram
    pub fn encode_with_stats(&self, samples: &[i16]) -> Wav12Result<(Vec<u8>, CompressStat)> {
        check_shift(self.shift_bits)?;
        let n_samples = u32::try_from(samples.len()).map_err(|_| {
            Wav12Error::out_of_bounds("sample count", samples.len(), u32::MAX as usize)
        })?;

        let mut stats = CompressStat::new(self.shift_bits);
        let compressed = linear_compress(samples, self.shift_bits, Some(&mut stats))?;
        let raw_len = raw_size(samples.len());

        let format = self.format.unwrap_or(if compressed.len() < raw_len {
            Format::Linear
        } else {
            Format::Raw
        });

        let writer = Writer::new();
        let asset = match format {
            Format::Linear => writer.write(n_samples, format, self.shift_bits, &compressed)?,
            Format::Raw => writer.write(n_samples, format, 0, &Writer::raw_payload(samples))?,
        };

        debug!(
            "encoded {} samples as {}: {} -> {} payload bytes",
            samples.len(),
            format.name(),
            raw_len,
            asset.len() - crate::HEADER_SIZE
        );
        Ok((asset, stats))
    }
}
