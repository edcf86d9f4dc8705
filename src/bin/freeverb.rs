//! Offline freeverb driver: reverberate a stereo WAV file.
//!
//! ```text
//! freeverb <input.wav> <output.wav>
//! ```
//!
//! Applies the default freeverb tuning and appends two seconds of
//! reverberant tail. The output inherits the input's sample rate and bit
//! depth.

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{ensure, Result, WrapErr};
use hound::{SampleFormat, WavReader, WavWriter};
use tracing::info;

use patina_dsp::fx::{freeverb_filter, FreeverbParams};

/// Seconds of zero input fed after the file ends to capture the tail.
const TAIL_SECONDS: f64 = 2.0;

#[derive(Parser)]
#[command(about = "Apply the freeverb reverberator to a stereo WAV file")]
struct Args {
    /// Stereo WAV file to read.
    input: PathBuf,
    /// Destination WAV file.
    output: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut reader = WavReader::open(&args.input)
        .wrap_err_with(|| format!("failed to open {}", args.input.display()))?;
    let spec = reader.spec();
    ensure!(
        spec.channels == 2,
        "expected a stereo file, got {} channel(s)",
        spec.channels
    );
    info!(
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "loaded {}",
        args.input.display()
    );

    let (left, right) = read_stereo(&mut reader)?;
    let num_input_samples = left.len();
    let num_transients = (f64::from(spec.sample_rate) * TAIL_SECONDS).ceil() as usize;

    let (left_out, right_out) =
        freeverb_filter(left, right, num_transients, &FreeverbParams::default());
    info!(
        input_samples = num_input_samples,
        output_samples = left_out.len(),
        "reverberated with {TAIL_SECONDS} s of tail"
    );

    write_stereo(&args.output, spec, &left_out, &right_out)
        .wrap_err_with(|| format!("failed to write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());
    Ok(())
}

/// Deinterleave the WAV stream into normalised f64 channels.
fn read_stereo(reader: &mut WavReader<std::io::BufReader<std::fs::File>>) -> Result<(Vec<f64>, Vec<f64>)> {
    let spec = reader.spec();
    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map(f64::from))
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let full_scale = f64::from(1u32 << (spec.bits_per_sample - 1));
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| f64::from(value) / full_scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mut left = Vec::with_capacity(interleaved.len() / 2);
    let mut right = Vec::with_capacity(interleaved.len() / 2);
    for frame in interleaved.chunks_exact(2) {
        left.push(frame[0]);
        right.push(frame[1]);
    }
    Ok((left, right))
}

/// Interleave and write the channels with the input's format.
fn write_stereo(
    path: &Path,
    spec: hound::WavSpec,
    left: &[f64],
    right: &[f64],
) -> Result<()> {
    let mut writer = WavWriter::create(path, spec)?;
    match spec.sample_format {
        SampleFormat::Float => {
            for (&l, &r) in left.iter().zip(right.iter()) {
                writer.write_sample(l as f32)?;
                writer.write_sample(r as f32)?;
            }
        }
        SampleFormat::Int => {
            let full_scale = f64::from(1u32 << (spec.bits_per_sample - 1));
            let limit = full_scale - 1.0;
            for (&l, &r) in left.iter().zip(right.iter()) {
                writer.write_sample((l * full_scale).clamp(-full_scale, limit) as i32)?;
                writer.write_sample((r * full_scale).clamp(-full_scale, limit) as i32)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}
