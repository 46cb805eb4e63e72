/// The only sample rate the codec targets (mono, 16 bit)
pub const SAMPLE_RATE: u32 = 22050;

/// Volume passed to `expand2` that leaves samples at their decoded level
pub const UNITY_VOLUME: i32 = 65536;

/// Width of the per-sample code field
pub const CODE_BITS: u32 = 4;

/// Code value announcing a raw 16-bit sample instead of a delta
pub const ESCAPE_CODE: u32 = 15;

/// Widest delta magnitude that can be coded without escaping
pub const MAX_DELTA_BITS: u32 = 15;

/// Upper bound on the lossy shift (exclusive)
pub const MAX_SHIFT_BITS: u8 = 16;

/// Worst case encoded size of one sample, in bytes (20 bits rounded up generously)
pub const MAX_BYTES_PER_SAMPLE: usize = 4;

/// Cheapest linear sample: code, sign and a one-bit magnitude
pub const MIN_BITS_PER_SAMPLE: u64 = 6;

/// Size in bytes of a raw PCM sample
pub const BYTES_PER_SAMPLE: usize = 2;

/// Seconds of audio for a sample count at the codec rate
#[inline]
pub fn duration_secs(n_samples: u32) -> f64 {
    n_samples as f64 / SAMPLE_RATE as f64
}

/// Size of an uncompressed PCM payload
#[inline]
pub fn raw_size(n_samples: usize) -> usize {
    n_samples * BYTES_PER_SAMPLE
}
