// Wave module - WAV container reading and writing
//
// Thin wrapper over hound constrained to the PCM layouts the feature
// pipeline accepts: 8 or 16-bit integer samples, mono or interleaved
// multi-channel. Reads normalize into [-1, 1] floating point; writes
// quantize back to integer PCM.

pub mod gain;

use std::path::Path;

use log::debug;

use crate::dsp::Sample;
use crate::error::WaveError;

/// Expected stream layout for reads; produced layout for writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveSpec {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl WaveSpec {
    /// 16 kHz 16-bit mono, the layout the default extraction parameters
    /// are tuned for
    pub fn mono_16k() -> Self {
        Self {
            sample_rate: 16000,
            bits_per_sample: 16,
            channels: 1,
        }
    }
}

/// Read a WAV file as normalized samples, channels interleaved
///
/// The container must carry integer PCM matching `expected` exactly.
pub fn read_samples<F, P>(path: P, expected: &WaveSpec) -> Result<Vec<F>, WaveError>
where
    F: Sample,
    P: AsRef<Path>,
{
    let mut reader = hound::WavReader::open(&path)?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int {
        return Err(WaveError::UnsupportedLayout {
            details: "only integer PCM is supported".to_string(),
        });
    }
    check_spec(&spec, expected)?;

    let scale = f64::from(1i32 << (spec.bits_per_sample - 1));
    let samples = match spec.bits_per_sample {
        8 => reader
            .samples::<i8>()
            .map(|sample| {
                sample
                    .map(|value| F::from_f64(f64::from(value) / scale))
                    .map_err(WaveError::from)
            })
            .collect::<Result<Vec<F>, WaveError>>()?,
        16 => reader
            .samples::<i16>()
            .map(|sample| {
                sample
                    .map(|value| F::from_f64(f64::from(value) / scale))
                    .map_err(WaveError::from)
            })
            .collect::<Result<Vec<F>, WaveError>>()?,
        other => {
            return Err(WaveError::UnsupportedLayout {
                details: format!("unsupported bit depth {}", other),
            })
        }
    };

    debug!(
        "read {} samples from {:?} ({} Hz, {} bit, {} ch)",
        samples.len(),
        path.as_ref(),
        spec.sample_rate,
        spec.bits_per_sample,
        spec.channels
    );
    Ok(samples)
}

/// Write normalized samples as integer PCM
///
/// Samples are expected in [-1, 1]; values outside saturate at the integer
/// range bounds.
pub fn write_samples<F, P>(path: P, spec: &WaveSpec, samples: &[F]) -> Result<(), WaveError>
where
    F: Sample,
    P: AsRef<Path>,
{
    let hound_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let scale = F::from_f64(f64::from(1i32 << (spec.bits_per_sample - 1)));
    let mut writer = hound::WavWriter::create(&path, hound_spec)?;
    match spec.bits_per_sample {
        8 => {
            for &sample in samples {
                let value = (sample * scale).to_f64().unwrap_or(0.0) as i8;
                writer.write_sample(value)?;
            }
        }
        16 => {
            for &sample in samples {
                let value = (sample * scale).to_f64().unwrap_or(0.0) as i16;
                writer.write_sample(value)?;
            }
        }
        other => {
            return Err(WaveError::UnsupportedLayout {
                details: format!("unsupported bit depth {}", other),
            })
        }
    }
    writer.finalize()?;

    debug!(
        "wrote {} samples to {:?} ({} Hz, {} bit, {} ch)",
        samples.len(),
        path.as_ref(),
        spec.sample_rate,
        spec.bits_per_sample,
        spec.channels
    );
    Ok(())
}

fn check_spec(actual: &hound::WavSpec, expected: &WaveSpec) -> Result<(), WaveError> {
    if actual.sample_rate != expected.sample_rate {
        return Err(WaveError::SpecMismatch {
            field: "sampling rate",
            expected: expected.sample_rate,
            actual: actual.sample_rate,
        });
    }
    if actual.bits_per_sample != expected.bits_per_sample {
        return Err(WaveError::SpecMismatch {
            field: "bit depth",
            expected: u32::from(expected.bits_per_sample),
            actual: u32::from(actual.bits_per_sample),
        });
    }
    if actual.channels != expected.channels {
        return Err(WaveError::SpecMismatch {
            field: "channel count",
            expected: u32::from(expected.channels),
            actual: u32::from(actual.channels),
        });
    }
    Ok(())
}
