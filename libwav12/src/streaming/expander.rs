use log::warn;

use crate::codec::linear::{check_shift, decode_sample};
use crate::codec::Context;
use crate::core::{AssetHeader, BitReader, Format, Wav12Error, Wav12Result};
use crate::stream::ByteSource;

use super::types::ExpanderState;

/// resumable decoder bound to one stream
///
/// Successive `expand` calls continue where the previous one stopped, so
/// the output is the same whatever the chunk sizes.
pub struct Expander<S> {
    reader: BitReader<S>,
    ctx: Context,
    /// total samples in the stream
    n_samples: usize,
    /// samples already expanded
    pos: usize,
    format: Format,
    shift_bits: u8,
    state: ExpanderState,
}

impl<S: ByteSource> Expander<S> {
    /// bind to `stream` holding `n_samples` samples
    pub fn new(stream: S, n_samples: usize, format: Format, shift_bits: u8) -> Wav12Result<Self> {
        check_shift(shift_bits)?;
        Ok(Self {
            reader: BitReader::new(stream),
            ctx: Context::new(),
            n_samples,
            pos: 0,
            format,
            shift_bits,
            state: Self::initial_state(n_samples),
        })
    }

    /// bind using the fields of an asset header
    pub fn from_header(stream: S, header: &AssetHeader) -> Wav12Result<Self> {
        Self::new(
            stream,
            header.n_samples as usize,
            header.format,
            header.shift_bits,
        )
    }

    /// rebind to a new stream, dropping all previous state
    pub fn init(
        &mut self,
        stream: S,
        n_samples: usize,
        format: Format,
        shift_bits: u8,
    ) -> Wav12Result<()> {
        *self = Self::new(stream, n_samples, format, shift_bits)?;
        Ok(())
    }

    fn initial_state(n_samples: usize) -> ExpanderState {
        if n_samples == 0 {
            ExpanderState::Done
        } else {
            ExpanderState::Idle
        }
    }

    /// expand the next `target.len()` samples
    pub fn expand(&mut self, target: &mut [i16]) -> Wav12Result<()> {
        self.run(target.len(), |i, sample| target[i] = sample)
    }

    /// expand the next `target.len() / 2` samples as interleaved stereo
    ///
    /// Both channels get `sample * volume` (65536 is unity), saturating.
    pub fn expand2(&mut self, target: &mut [i32], volume: i32) -> Wav12Result<()> {
        if target.len() % 2 != 0 {
            return Err(Wav12Error::out_of_bounds(
                "stereo buffer length",
                target.len(),
                target.len() - 1,
            ));
        }
        self.run(target.len() / 2, |i, sample| {
            let scaled = (sample as i32).saturating_mul(volume);
            target[2 * i] = scaled;
            target[2 * i + 1] = scaled;
        })
    }

    fn run<F: FnMut(usize, i16)>(&mut self, n: usize, mut put: F) -> Wav12Result<()> {
        if self.state == ExpanderState::Halted {
            return Err(Wav12Error::Halted);
        }
        if n > self.remaining() {
            return Err(Wav12Error::out_of_bounds("samples", n, self.remaining()));
        }

        for i in 0..n {
            match self.next_sample() {
                Ok(sample) => put(i, sample),
                Err(e) => {
                    warn!(
                        "expander halted at sample {} of {}: {}",
                        self.pos, self.n_samples, e
                    );
                    self.state = ExpanderState::Halted;
                    return Err(e);
                }
            }
            self.pos += 1;
        }

        if n > 0 {
            self.state = if self.done() {
                ExpanderState::Done
            } else {
                ExpanderState::Active
            };
        }
        Ok(())
    }

    fn next_sample(&mut self) -> Wav12Result<i16> {
        match self.format {
            Format::Raw => self.reader.source_mut().get16(),
            Format::Linear => decode_sample(&mut self.reader, &mut self.ctx, self.shift_bits),
        }
    }

    pub fn done(&self) -> bool {
        self.pos == self.n_samples
    }

    pub fn state(&self) -> ExpanderState {
        self.state
    }

    /// samples expanded so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.n_samples - self.pos
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn shift_bits(&self) -> u8 {
        self.shift_bits
    }

    pub fn stream(&self) -> &S {
        self.reader.source()
    }
}
