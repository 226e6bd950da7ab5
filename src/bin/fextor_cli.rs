use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use rayon::prelude::*;

use fextor::config::ExtractorConfig;
use fextor::dsp::FeatureExtractor;
use fextor::feature::FeatureSet;
use fextor::wave::{self, gain, WaveSpec};

#[derive(Parser, Debug)]
#[command(
    name = "fextor_cli",
    about = "Batch spectral feature extraction from WAV files"
)]
struct Cli {
    /// Input WAV files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving one .feat file per input
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Feature to extract
    #[arg(long, value_enum, default_value = "mfcc")]
    target: Target,

    /// Decibel-compress spectrum / mel output (MFCC always compresses)
    #[arg(long)]
    logarize: bool,

    /// Extraction parameters as JSON (defaults to the 16 kHz parameter set)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hop between frames in samples (defaults to 10 ms at the configured rate)
    #[arg(long)]
    hop: Option<usize>,

    /// Normalize input RMS level to this dBFS before extraction
    #[arg(long)]
    normalize_db: Option<f32>,

    /// Input bit depth
    #[arg(long, default_value_t = 16)]
    bits: u16,

    /// Input channel count
    #[arg(long, default_value_t = 1)]
    channels: u16,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Target {
    Spectrum,
    Mel,
    Mfcc,
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExtractorConfig::load_from_file(path),
        None => ExtractorConfig::default(),
    };
    let hop = cli.hop.unwrap_or((config.sample_rate / 100) as usize);
    if hop == 0 {
        bail!("hop must be positive");
    }
    let spec = WaveSpec {
        sample_rate: config.sample_rate,
        bits_per_sample: cli.bits,
        channels: cli.channels,
    };

    let mut extractor = FeatureExtractor::<f32>::new();
    extractor
        .init(&config)
        .context("initializing feature extractor")?;
    let extractor = &extractor;

    cli.inputs.par_iter().try_for_each(|input| {
        // One scratch buffer per task; the extractor itself is shared
        // read-only across the pool.
        let mut scratch = extractor.allocate_scratch()?;
        extract_file(
            extractor,
            input,
            &cli.output_dir,
            cli.target,
            cli.logarize,
            hop,
            cli.normalize_db,
            &spec,
            &mut scratch,
        )
        .with_context(|| format!("processing {}", input.display()))
    })?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn extract_file(
    extractor: &FeatureExtractor<f32>,
    input: &Path,
    output_dir: &Path,
    target: Target,
    logarize: bool,
    hop: usize,
    normalize_db: Option<f32>,
    spec: &WaveSpec,
    scratch: &mut [f32],
) -> Result<()> {
    let mut samples: Vec<f32> = wave::read_samples(input, spec)?;
    if let Some(db) = normalize_db {
        gain::normalize_db(&mut samples, db)?;
    }

    let window_size = extractor.window_size();
    if samples.len() < window_size {
        bail!(
            "input too short: {} samples, window needs {}",
            samples.len(),
            window_size
        );
    }

    let feature_dim = match target {
        Target::Spectrum => extractor.spectrum_len(),
        Target::Mel => extractor.num_mels(),
        Target::Mfcc => extractor.num_mfcc(),
    };
    if feature_dim == 0 {
        bail!("target {:?} is disabled by the configuration", target);
    }

    let num_frames = (samples.len() - window_size) / hop;
    let mut features = FeatureSet::new(num_frames as u32, feature_dim as u32);
    for n in 0..num_frames {
        let frame = &samples[n * hop..n * hop + window_size];
        let dest = features
            .frame_mut(n as u32)
            .context("frame index out of range")?;
        match target {
            Target::Spectrum => extractor.spectrum_with_scratch(frame, dest, logarize, scratch)?,
            Target::Mel => extractor.melspectrum_with_scratch(frame, dest, logarize, scratch)?,
            Target::Mfcc => extractor.mfcc_with_scratch(frame, dest, scratch)?,
        }
    }

    let stem = input
        .file_stem()
        .with_context(|| format!("no file name in {}", input.display()))?;
    let output = output_dir.join(stem).with_extension("feat");
    features.save(&output)?;

    info!(
        "{} -> {}: {} frames x {}",
        input.display(),
        output.display(),
        num_frames,
        feature_dim
    );
    Ok(())
}
