use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use wav12::{EncodeOptions, MAX_SHIFT};

#[derive(Parser)]
#[command(name = "wav12")]
#[command(version = "0.1.0")]
#[command(about = "wav12 asset converter and memory image builder", long_about = None)]
struct Cli {
    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a WAV file and verify it expands back exactly
    Test {
        /// Input WAV file (22050 Hz mono 16-bit)
        input: PathBuf,
        /// Low bits to discard (0-4)
        #[arg(short, long, default_value = "0")]
        shift: u8,
    },
    /// Compress a WAV file to a wav12 asset
    Compress {
        /// Input WAV file (22050 Hz mono 16-bit)
        input: PathBuf,
        /// Output asset
        output: PathBuf,
        /// Low bits to discard (0-4)
        #[arg(short, long, default_value = "0")]
        shift: u8,
        /// Store raw PCM regardless of size
        #[arg(long, conflicts_with = "force")]
        raw: bool,
        /// Store the linear payload even when it is larger than raw PCM
        #[arg(long)]
        force: bool,
    },
    /// Decode a wav12 asset to WAV
    Decode {
        /// Input asset
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Samples decoded per call
        #[arg(long, default_value = "512")]
        chunk: usize,
    },
    /// Show information about a wav12 asset
    Info {
        /// Input asset
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a memory image from a JSON manifest
    Image {
        /// Manifest listing directories and WAV files
        manifest: PathBuf,
        /// Output image
        #[arg(short, long, default_value = "memimage.bin")]
        output: PathBuf,
        /// Also write a hex text dump next to the image
        #[arg(short, long)]
        text: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Test { input, shift } => test(&input, shift),
        Commands::Compress {
            input,
            output,
            shift,
            raw,
            force,
        } => {
            let mut options = EncodeOptions::lossless().with_shift(shift);
            if raw {
                options = options.raw();
            } else if force {
                options = options.force_linear();
            }
            compress(&input, &output, &options)
        }
        Commands::Decode {
            input,
            output,
            chunk,
        } => decode(&input, &output, chunk),
        Commands::Info { input, json } => info(&input, json),
        Commands::Image {
            manifest,
            output,
            text,
        } => image(&manifest, &output, text),
    }
}

fn check_shift(shift: u8) -> Result<()> {
    if shift > MAX_SHIFT {
        bail!("Shift must be 0-{}, got {}", MAX_SHIFT, shift);
    }
    Ok(())
}

fn test(input: &Path, shift: u8) -> Result<()> {
    check_shift(shift)?;
    println!("Reading {}...", input.display());

    let audio = wav12::audio::read_wav_file(input)?;
    println!(
        "  Format: {} Hz, {} channel(s), {} frames",
        audio.sample_rate,
        audio.channels,
        audio.frames()
    );
    audio.ensure_codec_layout()?;

    let report = wav12::run_self_test(&audio.samples, shift)?;
    println!("{}", report);

    if !report.passed() {
        bail!("✗ {} did not survive compression", input.display());
    }
    Ok(())
}

fn compress(input: &Path, output: &Path, options: &EncodeOptions) -> Result<()> {
    check_shift(options.shift_bits)?;
    println!("Reading {}...", input.display());

    let (asset, stats) = wav12::encode_file(input, options)?;
    fs::write(output, &asset).context("Failed to write output file")?;

    let info = wav12::get_asset_info(&asset)?;
    println!("Done!");
    println!("  Output: {}", output.display());
    println!("  Format: {} (shift {})", info.format, info.shift_bits);
    println!(
        "  Size:   {} bytes ({:.2}x compression)",
        info.file_size, info.compression_ratio
    );
    if info.format == "raw" && options.format.is_none() {
        println!("  Didn't compress, stored raw.");
    }
    print!("{}", stats);

    Ok(())
}

fn decode(input: &Path, output: &Path, chunk: usize) -> Result<()> {
    println!("Reading {}...", input.display());
    println!("Decoding in chunks of {} samples...", chunk);

    let wav_bytes = wav12::decode_to_wav(input, chunk)?;
    fs::write(output, wav_bytes).context("Failed to write WAV file")?;

    println!("Done!");
    println!("  Output: {}", output.display());
    Ok(())
}

fn info(input: &Path, json: bool) -> Result<()> {
    let data = fs::read(input).context("Failed to read asset")?;
    let info = wav12::get_asset_info(&data)?;

    if json {
        let text = serde_json::to_string_pretty(&info).context("Failed to serialize info")?;
        println!("{}", text);
        return Ok(());
    }

    println!("wav12 Asset");
    println!("───────────────────────────────");
    println!("  Format:      {}", info.format);
    println!("  Samples:     {}", info.n_samples);
    println!("  Shift bits:  {}", info.shift_bits);
    println!("  Duration:    {:.2}s", info.duration_secs);
    println!("  Payload:     {} bytes", info.payload_size);
    println!("  File size:   {} bytes", info.file_size);
    println!("  Compression: {:.2}x", info.compression_ratio);
    Ok(())
}

fn image(manifest: &Path, output: &Path, text: bool) -> Result<()> {
    println!("Reading {}...", manifest.display());

    let built = wav12::build_image(manifest)?;
    print!("{}", built.listing);
    fs::write(output, &built.bytes).context("Failed to write image")?;
    println!("Wrote {} ({} bytes)", output.display(), built.bytes.len());

    if text {
        let text_path = output.with_extension("txt");
        fs::write(&text_path, wav12::image_text_dump(&built.bytes))
            .context("Failed to write text dump")?;
        println!("Wrote {}", text_path.display());
    }
    Ok(())
}
