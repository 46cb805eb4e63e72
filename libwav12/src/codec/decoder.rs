use crate::core::Wav12Result;
use crate::Reader;

/// decodes a whole asset in memory
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Decoder
    }

    /// decode asset bytes to mono samples
    pub fn decode(&self, data: &[u8]) -> Wav12Result<Vec<i16>> {
        let asset = Reader::new().read(data)?;
        let mut samples = vec![0i16; asset.header.n_samples as usize];
        asset.expander()?.expand(&mut samples)?;
        Ok(samples)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
