use anyhow::{bail, Context, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use libwav12::SAMPLE_RATE;

/// PCM read from a WAV file
#[derive(Debug, Clone)]
pub struct PcmAudio {
    /// Interleaved 16-bit samples
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: usize,
    pub bits_per_sample: Option<u32>,
}

impl PcmAudio {
    /// Number of sample frames
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    /// Check the layout the codec accepts: 22050 Hz, mono, 16-bit
    pub fn ensure_codec_layout(&self) -> Result<()> {
        let bits = self.bits_per_sample.unwrap_or(16);
        if self.sample_rate != SAMPLE_RATE || self.channels != 1 || bits != 16 {
            bail!(
                "Input must be 22050 Hz mono 16-bit PCM (got {} Hz, {} channels, {} bits)",
                self.sample_rate,
                self.channels,
                bits
            );
        }
        Ok(())
    }
}

/// Read a WAV file from disk
pub fn read_wav_file(path: &Path) -> Result<PcmAudio> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    read_from_source(mss, path.extension().and_then(|e| e.to_str()))
}

/// Read a WAV file held in memory
pub fn read_wav_from_bytes(bytes: &[u8]) -> Result<PcmAudio> {
    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());
    read_from_source(mss, Some("wav"))
}

fn read_from_source(mss: MediaSourceStream, extension: Option<&str>) -> Result<PcmAudio> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Unsupported audio format")?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Unknown sample rate")?;
    let channels = track
        .codec_params
        .channels
        .context("Unknown channel count")?
        .count();
    let bits_per_sample = track.codec_params.bits_per_sample;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(e).context("Error reading packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e).context("Error decoding packet"),
        };

        append_samples(&decoded, &mut samples, channels)?;
    }

    Ok(PcmAudio {
        samples,
        sample_rate,
        channels,
        bits_per_sample,
    })
}

fn append_samples(buffer: &AudioBufferRef, samples: &mut Vec<i16>, channels: usize) -> Result<()> {
    match buffer {
        AudioBufferRef::S16(buf) => {
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    samples.push(buf.chan(ch)[frame]);
                }
            }
        }
        AudioBufferRef::U8(buf) => {
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    samples.push((buf.chan(ch)[frame] as i16 - 128) << 8);
                }
            }
        }
        AudioBufferRef::S32(buf) => {
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    samples.push((buf.chan(ch)[frame] >> 16) as i16);
                }
            }
        }
        AudioBufferRef::F32(buf) => {
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    let v = buf.chan(ch)[frame].clamp(-1.0, 1.0);
                    samples.push((v * 32767.0) as i16);
                }
            }
        }
        _ => bail!("Unsupported PCM sample format"),
    }
    Ok(())
}

/// Write mono samples to a 16-bit PCM WAV file
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let bytes = write_wav_to_bytes(samples, sample_rate)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write WAV file {}", path.display()))
}

/// Write mono samples to 16-bit PCM WAV format in memory
pub fn write_wav_to_bytes(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(44 + samples.len() * 2);

    let channels = 1u16;
    let bytes_per_sample = 2u16;
    let data_size = samples.len() * bytes_per_sample as usize;
    let file_size = 36 + data_size;

    // RIFF header
    buffer.write_all(b"RIFF")?;
    buffer.write_all(&(file_size as u32).to_le_bytes())?;
    buffer.write_all(b"WAVE")?;

    // fmt chunk
    buffer.write_all(b"fmt ")?;
    buffer.write_all(&16u32.to_le_bytes())?;
    buffer.write_all(&1u16.to_le_bytes())?; // integer PCM
    buffer.write_all(&channels.to_le_bytes())?;
    buffer.write_all(&sample_rate.to_le_bytes())?;
    let byte_rate = sample_rate * (channels * bytes_per_sample) as u32;
    buffer.write_all(&byte_rate.to_le_bytes())?;
    buffer.write_all(&(channels * bytes_per_sample).to_le_bytes())?;
    buffer.write_all(&16u16.to_le_bytes())?;

    // data chunk
    buffer.write_all(b"data")?;
    buffer.write_all(&(data_size as u32).to_le_bytes())?;
    for &sample in samples {
        buffer.write_all(&sample.to_le_bytes())?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_header_layout() {
        let bytes = write_wav_to_bytes(&[1, -1, 256], 22050).unwrap();
        assert_eq!(bytes.len(), 44 + 6);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 1);
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
            22050
        );
        assert_eq!(u16::from_le_bytes([bytes[34], bytes[35]]), 16);
        assert_eq!(&bytes[44..], &[1, 0, 0xff, 0xff, 0, 1]);
    }

    #[test]
    fn test_read_back_written_wav() {
        let samples: Vec<i16> = (0..5000).map(|i| ((i * 37) % 20000 - 10000) as i16).collect();
        let bytes = write_wav_to_bytes(&samples, 22050).unwrap();
        let audio = read_wav_from_bytes(&bytes).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.frames(), 5000);
        assert_eq!(audio.samples, samples);
        audio.ensure_codec_layout().unwrap();
    }

    #[test]
    fn test_layout_check_rejects_other_rates() {
        let bytes = write_wav_to_bytes(&[0; 100], 44100).unwrap();
        let audio = read_wav_from_bytes(&bytes).unwrap();
        let err = audio.ensure_codec_layout().unwrap_err();
        assert!(err.to_string().contains("22050 Hz mono"));
    }
}
