//! Per-sample code unit and the one-shot compress/expand passes.
//!
//! Each sample is coded against the prediction from [`Context`]:
//!
//! | Field     | Bits   | Meaning                                   |
//! |-----------|--------|-------------------------------------------|
//! | code      | 4      | delta width minus one, or 15 for escape   |
//! | sign      | 1      | 1 when the delta is non-negative          |
//! | magnitude | code+1 | absolute delta                            |
//!
//! An escaped sample is the code 15 followed by the raw 16-bit sample.
//! Deltas of 16 bits or more always escape.

use log::debug;

use super::predictor::Context;
use super::stats::CompressStat;
use crate::core::{
    BitAccum, BitReader, BitWriter, Wav12Error, Wav12Result, CODE_BITS, ESCAPE_CODE,
    MAX_BYTES_PER_SAMPLE, MAX_DELTA_BITS, MAX_SHIFT_BITS,
};
use crate::stream::ByteSource;

pub(crate) fn check_shift(shift_bits: u8) -> Wav12Result<()> {
    if shift_bits >= MAX_SHIFT_BITS {
        return Err(Wav12Error::out_of_bounds(
            "shift bits",
            shift_bits as usize,
            MAX_SHIFT_BITS as usize - 1,
        ));
    }
    Ok(())
}

/// code one raw sample and advance the context
pub(crate) fn encode_sample(
    writer: &mut BitWriter<'_>,
    ctx: &mut Context,
    raw: i16,
    shift_bits: u8,
    stats: Option<&mut CompressStat>,
) -> Wav12Result<()> {
    let sample = raw >> shift_bits;
    let delta = sample as i32 - ctx.predict();
    let magnitude = delta.unsigned_abs();
    let width = BitAccum::bits_needed(magnitude);

    if width <= MAX_DELTA_BITS {
        writer.write(width - 1, CODE_BITS)?;
        writer.write(u32::from(delta >= 0), 1)?;
        writer.write(magnitude, width)?;
    } else {
        writer.write(ESCAPE_CODE, CODE_BITS)?;
        writer.write(sample as u16 as u32, 16)?;
    }

    if let Some(stats) = stats {
        stats.record(width);
    }
    ctx.advance(sample);
    Ok(())
}

/// decode one sample, advance the context and return it rescaled
pub(crate) fn decode_sample<S: ByteSource>(
    reader: &mut BitReader<S>,
    ctx: &mut Context,
    shift_bits: u8,
) -> Wav12Result<i16> {
    let code = reader.read(CODE_BITS)?;

    let sample = if code == ESCAPE_CODE {
        reader.read(16)? as u16 as i16
    } else {
        let non_negative = reader.read(1)? == 1;
        let magnitude = reader.read(code + 1)? as i32;
        let delta = if non_negative { magnitude } else { -magnitude };
        let value = ctx.predict() + delta;
        i16::try_from(value).map_err(|_| Wav12Error::CorruptStream { value })?
    };

    ctx.advance(sample);
    Ok(((sample as i32) << shift_bits) as i16)
}

/// compress a whole buffer in one pass
///
/// `shift_bits` low bits of every sample are discarded first. Returns the
/// packed bitstream, zero padded to a byte boundary.
pub fn linear_compress(
    data: &[i16],
    shift_bits: u8,
    mut stats: Option<&mut CompressStat>,
) -> Wav12Result<Vec<u8>> {
    check_shift(shift_bits)?;

    let mut out = vec![0u8; data.len() * MAX_BYTES_PER_SAMPLE];
    let len = {
        let mut writer = BitWriter::new(&mut out);
        let mut ctx = Context::new();
        for &raw in data {
            encode_sample(&mut writer, &mut ctx, raw, shift_bits, stats.as_deref_mut())?;
        }
        writer.close()?;
        writer.length()
    };
    out.truncate(len);

    debug!(
        "linear_compress: {} samples -> {} bytes (shift {})",
        data.len(),
        len,
        shift_bits
    );
    Ok(out)
}

/// expand exactly `target.len()` samples from a packed bitstream
pub fn linear_expand(compressed: &[u8], target: &mut [i16], shift_bits: u8) -> Wav12Result<()> {
    check_shift(shift_bits)?;

    let mut reader = BitReader::from_slice(compressed);
    let mut ctx = Context::new();
    for slot in target.iter_mut() {
        *slot = decode_sample(&mut reader, &mut ctx, shift_bits)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(samples: &[i16], shift: u8) -> Vec<i16> {
        let packed = linear_compress(samples, shift, None).unwrap();
        let mut out = vec![0i16; samples.len()];
        linear_expand(&packed, &mut out, shift).unwrap();
        out
    }

    #[test]
    fn test_silence_costs_six_bits() {
        let samples = vec![0i16; 8];
        let packed = linear_compress(&samples, 0, None).unwrap();
        // code 0, sign 1, magnitude 0 -> 0b000010 per sample
        assert_eq!(packed.len(), 6);
        assert_eq!(packed[0], 0b0000_1000);
        assert_eq!(round_trip(&samples, 0), samples);
    }

    #[test]
    fn test_first_sample_extremes() {
        // delta 32767 still fits in 15 bits
        let mut stat = CompressStat::default();
        linear_compress(&[i16::MAX], 0, Some(&mut stat)).unwrap();
        assert_eq!(stat.escapes, 0);
        assert_eq!(stat.buckets[14], 1);

        // delta -32768 needs 16 bits and escapes
        let mut stat = CompressStat::default();
        let packed = linear_compress(&[i16::MIN], 0, Some(&mut stat)).unwrap();
        assert_eq!(stat.escapes, 1);
        assert_eq!(packed, vec![0xf8, 0x00, 0x00]);
        assert_eq!(round_trip(&[i16::MIN], 0), vec![i16::MIN]);
    }

    #[test]
    fn test_alternating_extremes_escape_and_restore() {
        let samples: Vec<i16> = (0..64)
            .map(|i| if i % 2 == 0 { 16000 } else { -16000 })
            .collect();
        let mut stat = CompressStat::default();
        let packed = linear_compress(&samples, 0, Some(&mut stat)).unwrap();
        assert!(stat.escapes > 0);
        assert!(packed.len() <= samples.len() * 20 / 8 + 1);
        assert_eq!(round_trip(&samples, 0), samples);
    }

    #[test]
    fn test_shift_quantizes() {
        let samples: Vec<i16> = (0..500).map(|i| ((i * 37) % 2001 - 1000) as i16).collect();
        for shift in 0..=4u8 {
            let expected: Vec<i16> = samples.iter().map(|&s| (s >> shift) << shift).collect();
            assert_eq!(round_trip(&samples, shift), expected, "shift {}", shift);
        }
    }

    #[test]
    fn test_shift_out_of_range() {
        assert!(matches!(
            linear_compress(&[1, 2, 3], 16, None),
            Err(Wav12Error::OutOfBounds { .. })
        ));
        let mut out = [0i16; 1];
        assert!(linear_expand(&[0], &mut out, 20).is_err());
    }

    #[test]
    fn test_truncated_stream_is_exhausted() {
        let samples: Vec<i16> = (0..100).map(|i| (i * 300) as i16).collect();
        let packed = linear_compress(&samples, 0, None).unwrap();
        let mut out = vec![0i16; samples.len()];
        let err = linear_expand(&packed[..packed.len() / 2], &mut out, 0).unwrap_err();
        assert!(matches!(err, Wav12Error::StreamExhausted { .. }));
    }

    #[test]
    fn test_prediction_overflow_is_corrupt() {
        // two maximal positive deltas push the second guess past i16
        let mut packed = [0u8; 5];
        let mut writer = BitWriter::new(&mut packed);
        for _ in 0..2 {
            writer.write(14, CODE_BITS).unwrap();
            writer.write(1, 1).unwrap();
            writer.write(0x7fff, 15).unwrap();
        }
        writer.close().unwrap();

        let mut out = [0i16; 2];
        let err = linear_expand(&packed, &mut out, 0).unwrap_err();
        assert!(matches!(err, Wav12Error::CorruptStream { value } if value > i16::MAX as i32));
        assert_eq!(out[0], i16::MAX);
    }

    #[test]
    fn test_empty_input() {
        let packed = linear_compress(&[], 3, None).unwrap();
        assert!(packed.is_empty());
        linear_expand(&packed, &mut [], 3).unwrap();
    }
}
