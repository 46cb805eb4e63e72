use std::io::Cursor as IoCursor;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod codec;
pub mod core;
pub mod image;
pub mod stream;
pub mod streaming;

mod reader;
mod writer;

pub use codec::{linear_compress, linear_expand, CompressStat, Context, Decoder, Encoder};
pub use crate::core::{
    AssetHeader, BitAccum, BitReader, BitWriter, Format, Wav12Error, Wav12Result, HEADER_SIZE,
    MAGIC, SAMPLE_RATE, UNITY_VOLUME, VERSION_MAJOR, VERSION_MINOR,
};
pub use image::{MemImage, MemImageBuilder, MemUnit};
pub use reader::{Asset, Reader};
pub use stream::{
    ByteSource, ChunkSource, ChunkStream, MemStream, ReadSource, SliceSource, DEFAULT_CHUNK_SIZE,
};
pub use streaming::{Expander, ExpanderState};
pub use writer::Writer;

// asset info for the info() function

/// info about a wav12 asset
#[wasm_bindgen]
#[derive(Debug, Clone, Serialize)]
pub struct AssetInfo {
    /// "raw" or "linear"
    #[wasm_bindgen(skip)]
    pub format: String,
    /// Number of mono samples
    pub n_samples: u32,
    /// Bits discarded before coding
    pub shift_bits: u8,
    /// Duration in seconds at 22050 Hz
    pub duration_secs: f64,
    /// Payload size in bytes, header excluded
    pub payload_size: usize,
    /// Whole asset size in bytes
    pub file_size: usize,
    /// Compression ratio (raw PCM / payload)
    pub compression_ratio: f64,
}

#[wasm_bindgen]
impl AssetInfo {
    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String {
        self.format.clone()
    }
}

/// describe an asset without decoding it (native)
pub fn asset_info(data: &[u8]) -> Wav12Result<AssetInfo> {
    let asset = Reader::new().read(data)?;
    let header = asset.header;
    Ok(AssetInfo {
        format: header.format.name().to_string(),
        n_samples: header.n_samples,
        shift_bits: header.shift_bits,
        duration_secs: crate::core::duration_secs(header.n_samples),
        payload_size: asset.payload.len(),
        file_size: data.len(),
        compression_ratio: header.compression_ratio(),
    })
}

// result helpers

/// turn an error into js
fn to_js_err(e: Wav12Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// api functions

/// encode mono 22050 Hz samples to a wav12 asset
///
/// # Arguments
/// * `samples` - Mono 16-bit samples
/// * `shift_bits` - Low bits to discard (0 is lossless, 1-4 typical)
///
/// # Returns
/// wav12 asset as byte array (linear when smaller, raw otherwise)
///
/// # Note
/// To force a format use the `Encoder` builder directly.
#[wasm_bindgen]
pub fn encode(samples: &[i16], shift_bits: u8) -> Result<Vec<u8>, JsValue> {
    Encoder::new()
        .with_shift(shift_bits)
        .encode(samples)
        .map_err(to_js_err)
}

/// decode a wav12 asset to mono samples
#[wasm_bindgen]
pub fn decode(data: &[u8]) -> Result<Vec<i16>, JsValue> {
    Decoder::new().decode(data).map_err(to_js_err)
}

/// Check that an asset parses and its payload decodes completely
#[wasm_bindgen]
pub fn validate(data: &[u8]) -> bool {
    Decoder::new().decode(data).is_ok()
}

/// Get information about a wav12 asset
#[wasm_bindgen]
pub fn info(data: &[u8]) -> Result<AssetInfo, JsValue> {
    asset_info(data).map_err(to_js_err)
}

/// Delta width histogram for a buffer, as a JS object
#[wasm_bindgen]
pub fn compress_stats(samples: &[i16], shift_bits: u8) -> Result<JsValue, JsValue> {
    let (_, stats) = Encoder::new()
        .with_shift(shift_bits)
        .encode_with_stats(samples)
        .map_err(to_js_err)?;
    serde_wasm_bindgen::to_value(&stats)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// get lib version
#[wasm_bindgen]
pub fn version() -> String {
    format!("{}.{}", VERSION_MAJOR, VERSION_MINOR)
}

/// route panics to the browser console
#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

// streaming expander wasm api

type OwnedChunkStream = ChunkStream<ReadSource<IoCursor<Vec<u8>>>>;

#[wasm_bindgen]
pub struct WasmExpander {
    inner: Expander<OwnedChunkStream>,
}

#[wasm_bindgen]
impl WasmExpander {
    /// expander over a complete asset, decoded through a small chunk buffer
    #[wasm_bindgen(constructor)]
    pub fn new(data: &[u8]) -> Result<WasmExpander, JsValue> {
        Self::open(data).map_err(to_js_err)
    }

    /// Decode the next `n` samples
    ///
    /// ```js
    /// while (!expander.is_done()) {
    ///     const n = Math.min(512, expander.remaining());
    ///     play(expander.next_chunk(n));
    /// }
    /// ```
    #[wasm_bindgen]
    pub fn next_chunk(&mut self, n: usize) -> Result<js_sys::Int16Array, JsValue> {
        let samples = self.expand_mono(n).map_err(to_js_err)?;
        let array = js_sys::Int16Array::new_with_length(n as u32);
        array.copy_from(&samples);
        Ok(array)
    }

    /// Decode the next `n` samples as interleaved stereo scaled by `volume`
    #[wasm_bindgen]
    pub fn next_chunk_stereo(&mut self, n: usize, volume: i32) -> Result<js_sys::Int32Array, JsValue> {
        let frames = self.expand_stereo(n, volume).map_err(to_js_err)?;
        let array = js_sys::Int32Array::new_with_length(frames.len() as u32);
        array.copy_from(&frames);
        Ok(array)
    }

    #[wasm_bindgen]
    pub fn is_done(&self) -> bool {
        self.inner.done()
    }

    #[wasm_bindgen]
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    #[wasm_bindgen]
    pub fn position(&self) -> usize {
        self.inner.position()
    }

    /// Get the current state as a string
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.inner.state().as_str().into()
    }
}

impl WasmExpander {
    fn open(data: &[u8]) -> Wav12Result<Self> {
        let asset = Reader::new().read(data)?;
        // JS hands over the whole asset, so the copy is unbounded; the chunk
        // stream only keeps decoding on the same path as a flash reader
        let cursor = IoCursor::new(asset.payload.to_vec());
        let stream = ChunkStream::new(ReadSource::new(cursor), asset.payload.len());
        Ok(WasmExpander {
            inner: Expander::from_header(stream, &asset.header)?,
        })
    }

    /// requests past the end fail before anything is allocated
    fn check_request(&self, n: usize) -> Wav12Result<()> {
        let available = self.inner.remaining();
        if n > available {
            return Err(Wav12Error::out_of_bounds("samples", n, available));
        }
        Ok(())
    }

    fn expand_mono(&mut self, n: usize) -> Wav12Result<Vec<i16>> {
        self.check_request(n)?;
        let mut samples = vec![0i16; n];
        self.inner.expand(&mut samples)?;
        Ok(samples)
    }

    fn expand_stereo(&mut self, n: usize, volume: i32) -> Wav12Result<Vec<i32>> {
        self.check_request(n)?;
        let mut frames = vec![0i32; n * 2];
        self.inner.expand2(&mut frames, volume)?;
        Ok(frames)
    }
}

// tests
#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<i16> {
        (0..len).map(|i| ((i * 13) % 4000) as i16 - 2000).collect()
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), "1.0");
    }

    #[test]
    fn test_encode_decode_api() {
        let samples = ramp(3000);
        let asset = encode(&samples, 0).unwrap();
        assert_eq!(&asset[..4], b"wv12");
        assert_eq!(decode(&asset).unwrap(), samples);
        assert!(validate(&asset));
        assert!(!validate(&asset[..asset.len() - 1]));
    }

    #[test]
    fn test_info() {
        let samples = ramp(22050);
        let asset = encode(&samples, 1).unwrap();
        let info = info(&asset).unwrap();
        assert_eq!(info.format(), "linear");
        assert_eq!(info.n_samples, 22050);
        assert_eq!(info.shift_bits, 1);
        assert!((info.duration_secs - 1.0).abs() < 1e-9);
        assert_eq!(info.file_size, asset.len());
        assert_eq!(info.payload_size, asset.len() - HEADER_SIZE);
        assert!(info.compression_ratio > 1.0);
    }

    #[test]
    fn test_wasm_expander_native_path() {
        let samples = ramp(1000);
        let asset = encode(&samples, 0).unwrap();
        let mut expander = WasmExpander::open(&asset).unwrap();
        assert_eq!(expander.state(), "idle");

        let mut out = vec![0i16; samples.len()];
        for chunk in out.chunks_mut(64) {
            expander.inner.expand(chunk).unwrap();
        }
        assert!(expander.is_done());
        assert_eq!(expander.remaining(), 0);
        assert_eq!(out, samples);
    }

    #[test]
    fn test_wasm_expander_rejects_oversized_request() {
        let samples = ramp(100);
        let asset = encode(&samples, 0).unwrap();
        let mut expander = WasmExpander::open(&asset).unwrap();

        assert!(matches!(
            expander.expand_mono(usize::MAX),
            Err(Wav12Error::OutOfBounds { requested: usize::MAX, available: 100, .. })
        ));
        assert!(matches!(
            expander.expand_stereo(usize::MAX / 2, UNITY_VOLUME),
            Err(Wav12Error::OutOfBounds { .. })
        ));
        // nothing consumed, still usable
        assert_eq!(expander.state(), "idle");
        assert_eq!(expander.expand_mono(60).unwrap(), samples[..60]);

        let frames = expander.expand_stereo(40, UNITY_VOLUME).unwrap();
        assert_eq!(frames.len(), 80);
        assert_eq!(frames[0], samples[60] as i32 * UNITY_VOLUME);
        assert_eq!(frames[1], frames[0]);
        assert!(expander.is_done());
        assert!(expander.expand_mono(1).is_err());
    }
}
