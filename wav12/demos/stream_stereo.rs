//! Example: Compress a WAV file and play it back the way firmware does,
//! a few hundred stereo frames at a time at reduced volume.
//!
//! Run with: cargo run --example stream_stereo input.wav [shift]

use libwav12::{Reader, UNITY_VOLUME};
use std::env;
use std::path::Path;
use wav12::EncodeOptions;

const FRAMES: usize = 256;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <input-wav> [shift]", args[0]);
        std::process::exit(1);
    }

    let shift: u8 = match args.get(2) {
        Some(s) => s.parse()?,
        None => 0,
    };

    let (asset, _) = wav12::encode_file(Path::new(&args[1]), &EncodeOptions::lossless().with_shift(shift))?;
    let parsed = Reader::new()
        .read(&asset)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    println!(
        "{} samples, {} format, {} payload bytes",
        parsed.header.n_samples,
        parsed.header.format.name(),
        parsed.payload.len()
    );

    let mut expander = parsed.expander().map_err(|e| anyhow::anyhow!("{}", e))?;
    let volume = UNITY_VOLUME / 2;
    let mut frames = [0i32; FRAMES * 2];
    let mut peak = 0i32;
    let mut calls = 0;

    while !expander.done() {
        let n = FRAMES.min(expander.remaining());
        expander
            .expand2(&mut frames[..n * 2], volume)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        peak = frames[..n * 2].iter().fold(peak, |p, &v| p.max(v.saturating_abs()));
        calls += 1;
    }

    println!("{} calls, peak {:.3} of full scale", calls, peak as f64 / (i16::MAX as f64 * UNITY_VOLUME as f64));
    Ok(())
}
