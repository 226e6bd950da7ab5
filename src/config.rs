//! Configuration management for feature-extraction parameters
//!
//! This module provides the extraction parameter set, built-in defaults per
//! sampling rate, and JSON loading so parameter sweeps do not require
//! recompilation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::dsp::window::WindowKind;
use crate::error::DspError;

/// Default energy floor applied before decibel conversion
pub const DEFAULT_EPSILON: f32 = 1e-4;

/// Default reference level subtracted after decibel conversion
pub const DEFAULT_REF_LEVEL_DB: f32 = 20.0;

/// Feature-extraction parameters
///
/// Immutable once handed to `FeatureExtractor::init`. Setting `num_mels` or
/// `num_mfcc` to zero disables the corresponding stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Input sampling rate in Hz
    pub sample_rate: u32,
    /// Analysis window shape
    pub window_kind: WindowKind,
    /// Samples per frame, usually 20 ms worth
    pub window_size: usize,
    /// Transform length, a power of two no smaller than `window_size`
    pub fft_size: usize,
    /// Mel band count (0 disables the mel and MFCC stages)
    pub num_mels: usize,
    /// Cepstral coefficient count (0 disables the MFCC stage)
    pub num_mfcc: usize,
    /// Center the windowed samples in the zero-padded transform buffer
    /// instead of left-aligning them
    pub is_center: bool,
    /// Lower bound of the mel analysis range in Hz
    pub min_hertz: f32,
    /// Upper bound of the mel analysis range in Hz, at most `sample_rate / 2`
    pub max_hertz: f32,
    /// Energy floor for decibel conversion
    pub epsilon: f32,
    /// Reference level subtracted from decibel values
    pub ref_level_db: f32,
}

impl Default for ExtractorConfig {
    /// 16 kHz speech defaults: 20 ms Hanning window, 512-point FFT,
    /// 80 mel bands over the full band, 40 cepstral coefficients.
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            window_kind: WindowKind::Hanning,
            window_size: 320,
            fft_size: 512,
            num_mels: 80,
            num_mfcc: 40,
            is_center: true,
            min_hertz: 0.0,
            max_hertz: 8000.0,
            epsilon: DEFAULT_EPSILON,
            ref_level_db: DEFAULT_REF_LEVEL_DB,
        }
    }
}

impl ExtractorConfig {
    /// Built-in defaults for a sampling rate
    ///
    /// Only 16 kHz has a tuned parameter set; other rates return
    /// `SampleRateUnsupported`.
    pub fn for_sample_rate(sample_rate: u32) -> Result<Self, DspError> {
        match sample_rate {
            16000 => Ok(Self::default()),
            other => Err(DspError::SampleRateUnsupported { sample_rate: other }),
        }
    }

    /// Load configuration from a JSON file
    ///
    /// # Returns
    /// The parsed configuration, or the 16 kHz defaults if the file is
    /// missing or invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.window_size, 320);
        assert_eq!(config.fft_size, 512);
        assert_eq!(config.num_mels, 80);
        assert_eq!(config.num_mfcc, 40);
        assert!(config.is_center);
        assert_eq!(config.max_hertz, 8000.0);
    }

    #[test]
    fn test_for_sample_rate() {
        assert_eq!(
            ExtractorConfig::for_sample_rate(16000),
            Ok(ExtractorConfig::default())
        );
        assert_eq!(
            ExtractorConfig::for_sample_rate(44100),
            Err(DspError::SampleRateUnsupported { sample_rate: 44100 })
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ExtractorConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: ExtractorConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ExtractorConfig::load_from_file("/nonexistent/fextor.json");
        assert_eq!(config, ExtractorConfig::default());
    }
}
