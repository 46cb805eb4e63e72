// Bit packing primitives for the predictive codec

use super::error::{Wav12Error, Wav12Result};
use crate::stream::{ByteSource, MemStream};

/// mask covering the low `n` bits
#[inline]
fn low_mask(n: u32) -> u32 {
    if n >= 32 {
        u32::MAX
    } else {
        (1u32 << n) - 1
    }
}

/// 32-bit shift register with a count of occupied bits.
///
/// New bits enter at the bottom and existing content moves up, so `pop`
/// always returns the oldest bits first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitAccum {
    value: u32,
    n_used: u32,
}

impl BitAccum {
    pub fn new() -> Self {
        BitAccum { value: 0, n_used: 0 }
    }

    pub fn empty(&self) -> bool {
        self.n_used == 0
    }

    pub fn full(&self) -> bool {
        self.n_used == 32
    }

    pub fn bits_used(&self) -> u32 {
        self.n_used
    }

    pub fn clear(&mut self) {
        self.value = 0;
        self.n_used = 0;
    }

    pub fn get(&self) -> u32 {
        self.value
    }

    /// overwrite the whole register
    pub fn set(&mut self, value: u32, n_bits: u32) -> Wav12Result<()> {
        check_fits(value, n_bits)?;
        self.value = value;
        self.n_used = n_bits;
        Ok(())
    }

    /// append the low `n_bits` of `v` below the current content
    pub fn push(&mut self, v: u32, n_bits: u32) -> Wav12Result<()> {
        if self.n_used + n_bits > 32 {
            return Err(Wav12Error::out_of_bounds(
                "accumulator bits",
                (self.n_used + n_bits) as usize,
                32,
            ));
        }
        check_fits(v, n_bits)?;

        self.value = if n_bits == 32 {
            v
        } else {
            (self.value << n_bits) | v
        };
        self.n_used += n_bits;
        Ok(())
    }

    /// remove and return the top `n_bits`
    pub fn pop(&mut self, n_bits: u32) -> Wav12Result<u32> {
        if n_bits > self.n_used {
            return Err(Wav12Error::out_of_bounds(
                "accumulator bits",
                n_bits as usize,
                self.n_used as usize,
            ));
        }
        if n_bits == 0 {
            return Ok(0);
        }

        let rest = self.n_used - n_bits;
        let result = self.value >> rest;
        self.value &= low_mask(rest);
        self.n_used = rest;
        Ok(result)
    }

    /// smallest width in 1..=32 that holds `v`
    pub fn bits_needed(v: u32) -> u32 {
        (32 - v.leading_zeros()).max(1)
    }
}

fn check_fits(v: u32, n_bits: u32) -> Wav12Result<()> {
    if n_bits > 32 {
        return Err(Wav12Error::out_of_bounds("bit width", n_bits as usize, 32));
    }
    if n_bits < 32 && v > low_mask(n_bits) {
        return Err(Wav12Error::out_of_bounds(
            "value width",
            BitAccum::bits_needed(v) as usize,
            n_bits as usize,
        ));
    }
    Ok(())
}

/// MSB-first bit writer over a caller-owned byte buffer
pub struct BitWriter<'a> {
    target: &'a mut [u8],
    pos: usize,
    accum: BitAccum,
}

impl<'a> BitWriter<'a> {
    pub fn new(target: &'a mut [u8]) -> Self {
        BitWriter {
            target,
            pos: 0,
            accum: BitAccum::new(),
        }
    }

    /// write the low `n_bits` of `value`
    pub fn write(&mut self, mut value: u32, mut n_bits: u32) -> Wav12Result<()> {
        check_fits(value, n_bits)?;

        while n_bits > 0 {
            if self.accum.bits_used() == 8 {
                self.emit()?;
            }
            let avail = 8 - self.accum.bits_used();
            if avail >= n_bits {
                self.accum.push(value, n_bits)?;
                n_bits = 0;
            } else {
                let rest = n_bits - avail;
                self.accum.push(value >> rest, avail)?;
                n_bits = rest;
                value &= low_mask(rest);
            }
        }
        Ok(())
    }

    /// flush a partial final byte, zero padded
    pub fn close(&mut self) -> Wav12Result<()> {
        if !self.accum.empty() {
            let pad = 8 - self.accum.bits_used();
            self.accum.push(0, pad)?;
            self.emit()?;
        }
        Ok(())
    }

    /// bytes written so far, counting a pending partial byte
    pub fn length(&self) -> usize {
        self.pos + usize::from(!self.accum.empty())
    }

    pub fn capacity(&self) -> usize {
        self.target.len()
    }

    fn emit(&mut self) -> Wav12Result<()> {
        let capacity = self.target.len();
        let slot = self
            .target
            .get_mut(self.pos)
            .ok_or(Wav12Error::BufferOverflow { capacity })?;
        *slot = self.accum.get() as u8;
        self.pos += 1;
        self.accum.clear();
        Ok(())
    }
}

/// MSB-first bit reader pulling bytes from any [`ByteSource`]
pub struct BitReader<S> {
    source: S,
    accum: BitAccum,
}

impl<'a> BitReader<MemStream<'a>> {
    /// reader over a flat buffer
    pub fn from_slice(data: &'a [u8]) -> Self {
        BitReader::new(MemStream::new(data))
    }
}

impl<S: ByteSource> BitReader<S> {
    pub fn new(source: S) -> Self {
        BitReader {
            source,
            accum: BitAccum::new(),
        }
    }

    /// read an `n_bits` wide unsigned value (at most 32 bits)
    pub fn read(&mut self, mut n_bits: u32) -> Wav12Result<u32> {
        if n_bits > 32 {
            return Err(Wav12Error::out_of_bounds("bit width", n_bits as usize, 32));
        }

        let mut result = 0u32;
        while n_bits > 0 {
            if self.accum.empty() {
                let byte = self.source.get()?;
                self.accum.set(byte as u32, 8)?;
            }
            let take = n_bits.min(self.accum.bits_used());
            result = (result << take) | self.accum.pop(take)?;
            n_bits -= take;
        }
        Ok(result)
    }

    /// bits already pulled from the source but not yet consumed
    pub fn buffered_bits(&self) -> u32 {
        self.accum.bits_used()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}
