use std::fmt;

use serde::Serialize;

use crate::core::MAX_DELTA_BITS;

/// Histogram of delta widths seen while compressing.
///
/// Bucket `i` counts deltas needing `i + 1` bits; the last bucket also
/// collects every escaped sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompressStat {
    pub buckets: [u32; 16],
    pub escapes: u32,
    pub shift_bits: u8,
}

impl CompressStat {
    pub fn new(shift_bits: u8) -> Self {
        CompressStat {
            shift_bits,
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, width: u32) {
        let bucket = width.clamp(1, 16) as usize - 1;
        self.buckets[bucket] += 1;
        if width > MAX_DELTA_BITS {
            self.escapes += 1;
        }
    }

    /// samples recorded
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|&b| b as u64).sum()
    }

    /// mean encoded bits per sample, code field included
    pub fn mean_bits(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let coded: u64 = self.buckets[..15]
            .iter()
            .enumerate()
            .map(|(i, &n)| n as u64 * (4 + 1 + i as u64 + 1))
            .sum();
        let bits = coded + self.escapes as u64 * 20;
        bits as f64 / total as f64
    }
}

impl fmt::Display for CompressStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total().max(1);
        writeln!(
            f,
            "shift={} samples={} escapes={} mean={:.2} bits",
            self.shift_bits,
            self.total(),
            self.escapes,
            self.mean_bits()
        )?;
        for (i, &n) in self.buckets.iter().enumerate() {
            if n == 0 {
                continue;
            }
            let bar = "#".repeat((n as u64 * 50 / total) as usize);
            let label = if i == 15 { "esc".to_string() } else { format!("{:>2}b", i + 1) };
            writeln!(f, "  {} {:>8} {}", label, n, bar)?;
        }
        Ok(())
    }
}
