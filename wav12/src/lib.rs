//! wav12 - asset tool for the wav12 codec
//!
//! Converts 22050 Hz mono WAV files into wav12 assets, decodes them back,
//! and bundles many assets into a flat memory image for flash.
//!

pub mod audio;
pub mod manifest;

use anyhow::{anyhow, bail, Context, Result};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};

use libwav12::{
    linear_compress, linear_expand, AssetHeader, AssetInfo, ChunkStream, CompressStat, Encoder,
    Expander, Format, MemImage, MemImageBuilder, MemStream, ReadSource, HEADER_SIZE, SAMPLE_RATE,
};

use crate::manifest::Manifest;

/// Largest shift the tool accepts
pub const MAX_SHIFT: u8 = 4;

/// Samples per Expander call in the self test
pub const TEST_CHUNK: usize = 17;

/// Encoding options for converting WAV input to a wav12 asset
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Low bits discarded before coding (0-4)
    pub shift_bits: u8,
    /// Forced layout; chosen by size when None
    pub format: Option<Format>,
}

impl EncodeOptions {
    /// Lossless, layout chosen by size
    pub fn lossless() -> Self {
        Self::default()
    }

    pub fn with_shift(mut self, shift_bits: u8) -> Self {
        self.shift_bits = shift_bits;
        self
    }

    /// Always store raw PCM
    pub fn raw(mut self) -> Self {
        self.format = Some(Format::Raw);
        self
    }

    /// Always store the linear payload, even when larger than raw
    pub fn force_linear(mut self) -> Self {
        self.format = Some(Format::Linear);
        self
    }

    pub fn with_format(mut self, format: Option<Format>) -> Self {
        self.format = format;
        self
    }

    fn encoder(&self) -> Result<Encoder> {
        if self.shift_bits > MAX_SHIFT {
            bail!("Shift must be 0-{}, got {}", MAX_SHIFT, self.shift_bits);
        }
        let encoder = Encoder::new().with_shift(self.shift_bits);
        Ok(match self.format {
            Some(format) => encoder.with_format(format),
            None => encoder,
        })
    }
}

/// Encode mono samples to a wav12 asset
pub fn encode_samples(samples: &[i16], options: &EncodeOptions) -> Result<(Vec<u8>, CompressStat)> {
    options
        .encoder()?
        .encode_with_stats(samples)
        .map_err(|e| anyhow!("Encoding failed: {}", e))
}

/// Read a WAV file and encode it
pub fn encode_file(path: &Path, options: &EncodeOptions) -> Result<(Vec<u8>, CompressStat)> {
    let samples = load_codec_wav(path)?;
    encode_samples(&samples, options)
}

/// Read a WAV file and insist on 22050 Hz mono 16-bit
pub fn load_codec_wav(path: &Path) -> Result<Vec<i16>> {
    let audio = audio::read_wav_file(path)?;
    audio
        .ensure_codec_layout()
        .with_context(|| format!("Unusable input {}", path.display()))?;
    Ok(audio.samples)
}

/// Header details for an asset on disk or in memory
pub fn get_asset_info(data: &[u8]) -> Result<AssetInfo> {
    libwav12::asset_info(data).map_err(|e| anyhow!("Invalid wav12 asset: {}", e))
}

/// Decode an asset file without loading it whole
///
/// The header is read first, then the payload is pulled through a
/// `ChunkStream` while the Expander produces `chunk` samples per call.
pub fn decode_asset_streaming(path: &Path, chunk: usize) -> Result<Vec<i16>> {
    if chunk == 0 {
        bail!("Chunk size must be at least 1");
    }
    let mut file =
        File::open(path).with_context(|| format!("Failed to open asset {}", path.display()))?;

    let mut header_bytes = [0u8; HEADER_SIZE];
    file.read_exact(&mut header_bytes)
        .context("Failed to read asset header")?;
    let header =
        AssetHeader::parse(&header_bytes).map_err(|e| anyhow!("Invalid wav12 asset: {}", e))?;

    // the header bounds the sample count by the payload, the file bounds the payload
    let on_disk = file
        .metadata()
        .context("Failed to stat asset")?
        .len()
        .saturating_sub(HEADER_SIZE as u64);
    if header.len_in_bytes as u64 > on_disk {
        bail!(
            "Invalid wav12 asset: header claims {} payload bytes, file has {}",
            header.len_in_bytes,
            on_disk
        );
    }

    let stream: ChunkStream<_> =
        ChunkStream::new(ReadSource::new(file), header.len_in_bytes as usize);
    let mut expander =
        Expander::from_header(stream, &header).map_err(|e| anyhow!("Invalid wav12 asset: {}", e))?;

    let mut samples = Vec::with_capacity(header.n_samples as usize);
    let mut buffer = vec![0i16; chunk.min(header.n_samples as usize)];
    while !expander.done() {
        let n = chunk.min(expander.remaining());
        expander
            .expand(&mut buffer[..n])
            .with_context(|| format!("Decoding stopped at sample {}", expander.position()))?;
        samples.extend_from_slice(&buffer[..n]);
    }
    Ok(samples)
}

/// Decode an asset file to 16-bit PCM WAV bytes
pub fn decode_to_wav(path: &Path, chunk: usize) -> Result<Vec<u8>> {
    let samples = decode_asset_streaming(path, chunk)?;
    audio::write_wav_to_bytes(&samples, SAMPLE_RATE).context("Failed to write WAV data")
}

// ============================================================================
// Self test
// ============================================================================

/// Results of compressing and expanding one buffer both ways
#[derive(Debug, Clone)]
pub struct SelfTestReport {
    pub n_samples: usize,
    pub compressed_bytes: usize,
    pub stats: CompressStat,
    pub full_ok: bool,
    pub chunked_ok: bool,
    pub compress_time: Duration,
    pub expand_time: Duration,
    pub chunked_time: Duration,
}

impl SelfTestReport {
    pub fn original_bytes(&self) -> usize {
        self.n_samples * 2
    }

    pub fn ratio(&self) -> f64 {
        if self.original_bytes() == 0 {
            0.0
        } else {
            self.compressed_bytes as f64 / self.original_bytes() as f64
        }
    }

    pub fn passed(&self) -> bool {
        self.full_ok && self.chunked_ok
    }
}

fn pass_fail(ok: bool) -> &'static str {
    if ok {
        "PASS"
    } else {
        "FAIL"
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "bytes orig={} bytes comp={} ratio={:.2}",
            self.original_bytes(),
            self.compressed_bytes,
            self.ratio()
        )?;
        if self.compressed_bytes >= self.original_bytes() {
            writeln!(f, "Didn't compress.")?;
        }
        write!(f, "{}", self.stats)?;
        writeln!(f, "Test full stream:  {}", pass_fail(self.full_ok))?;
        writeln!(f, "Test chunk stream: {}", pass_fail(self.chunked_ok))?;
        writeln!(f, "compress:       {} us", self.compress_time.as_micros())?;
        writeln!(f, "expand:         {} us", self.expand_time.as_micros())?;
        write!(f, "chunk + verify: {} us", self.chunked_time.as_micros())
    }
}

/// Compress `samples`, then check a full expand and a chunked Expander pass
/// both return the quantized input
pub fn run_self_test(samples: &[i16], shift_bits: u8) -> Result<SelfTestReport> {
    if shift_bits > MAX_SHIFT {
        bail!("Shift must be 0-{}, got {}", MAX_SHIFT, shift_bits);
    }
    let expected: Vec<i16> = samples
        .iter()
        .map(|&s| (s >> shift_bits) << shift_bits)
        .collect();

    let start = Instant::now();
    let mut stats = CompressStat::new(shift_bits);
    let compressed = linear_compress(samples, shift_bits, Some(&mut stats))
        .map_err(|e| anyhow!("Compression failed: {}", e))?;
    let compress_time = start.elapsed();

    let start = Instant::now();
    let mut expanded = vec![0i16; samples.len()];
    let full_ok = linear_expand(&compressed, &mut expanded, shift_bits).is_ok()
        && expanded == expected;
    let expand_time = start.elapsed();

    let start = Instant::now();
    let chunked_ok = chunked_pass(&compressed, &expected, shift_bits);
    let chunked_time = start.elapsed();

    Ok(SelfTestReport {
        n_samples: samples.len(),
        compressed_bytes: compressed.len(),
        stats,
        full_ok,
        chunked_ok,
        compress_time,
        expand_time,
        chunked_time,
    })
}

fn chunked_pass(compressed: &[u8], expected: &[i16], shift_bits: u8) -> bool {
    let Ok(mut expander) = Expander::new(
        MemStream::new(compressed),
        expected.len(),
        Format::Linear,
        shift_bits,
    ) else {
        return false;
    };

    let mut buffer = [0i16; TEST_CHUNK];
    for want in expected.chunks(TEST_CHUNK) {
        let out = &mut buffer[..want.len()];
        if expander.expand(out).is_err() || out != want {
            return false;
        }
    }
    expander.done()
}

// ============================================================================
// Memory image
// ============================================================================

/// A built image and its listing
#[derive(Debug, Clone)]
pub struct BuiltImage {
    pub bytes: Vec<u8>,
    pub listing: String,
}

/// Build a memory image from a JSON manifest; WAV paths resolve against the
/// manifest's directory
pub fn build_image(manifest_path: &Path) -> Result<BuiltImage> {
    let manifest = Manifest::load(manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    build_image_from(&manifest, base)
}

pub fn build_image_from(manifest: &Manifest, base: &Path) -> Result<BuiltImage> {
    let mut builder = MemImageBuilder::new();
    for dir in &manifest.dirs {
        builder
            .add_dir(&dir.path)
            .map_err(|e| anyhow!("Directory '{}': {}", dir.path, e))?;

        for file in &dir.files {
            let path = dir.file_path(base, file);
            let options = EncodeOptions::lossless()
                .with_shift(file.shift.unwrap_or(0))
                .with_format(file.forced_format());
            let (asset, _) = encode_file(&path, &options)?;
            log::debug!("{} -> {}/{}", path.display(), dir.path, file.image_name());
            builder
                .add_file(&file.image_name(), &asset)
                .map_err(|e| anyhow!("File '{}': {}", file.path, e))?;
        }
    }

    let bytes = builder.build();
    let listing = MemImage::parse(&bytes)
        .map_err(|e| anyhow!("Built image does not parse: {}", e))?
        .to_string();
    Ok(BuiltImage { bytes, listing })
}

/// Text dump of an image as comma separated hex bytes, 16 per line
pub fn image_text_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 6);
    for line in bytes.chunks(16) {
        let row: Vec<String> = line.iter().map(|b| format!("0x{:02x}", b)).collect();
        out.push_str(&row.join(", "));
        out.push_str(",\n");
    }
    out
}
