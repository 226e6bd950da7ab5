// Error types for the fextor feature-extraction library
//
// This module defines custom error types for DSP and wave operations,
// providing structured error handling with numeric codes suitable for
// process exit statuses and log correlation.

use std::fmt;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types. Code ranges: 1001+ invalid argument,
/// 2001+ invalid usage, 3001+ allocation failure, 4001+ wave handling.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// DSP pipeline errors
///
/// These errors cover extractor initialization, transform preconditions,
/// and per-frame buffer contracts.
#[derive(Debug, Clone, PartialEq)]
pub enum DspError {
    /// Transform called with a zero point count or a buffer shorter than 2n
    TransformSizeInvalid { n: usize, buffer_len: usize },

    /// Window length is zero, exceeds the FFT size, or is too short for the
    /// requested window shape
    WindowSizeInvalid { window_size: usize, fft_size: usize },

    /// FFT size is zero or not a power of two
    FftSizeInvalid { fft_size: usize },

    /// Mel band count is zero
    MelBandsInvalid { num_mels: usize },

    /// Mel frequency bounds outside `(min_hertz, sample_rate / 2]`
    FrequencyRangeInvalid {
        min_hertz: f32,
        max_hertz: f32,
        nyquist: f32,
    },

    /// Cepstral coefficient count is zero, or no mel stage is configured
    MfccCountInvalid { num_mfcc: usize, num_mels: usize },

    /// No built-in defaults exist for this sampling rate
    SampleRateUnsupported { sample_rate: u32 },

    /// Frame slice length does not match the configured window size
    FrameLengthMismatch { expected: usize, actual: usize },

    /// Destination slice length does not match the stage output dimension
    DestLengthMismatch { expected: usize, actual: usize },

    /// Scratch buffer shorter than `2 * fft_size`
    ScratchTooSmall { required: usize, actual: usize },

    /// Operation invoked before `init` completed
    NotInitialized { operation: &'static str },

    /// Mel-dependent operation invoked with the mel stage disabled
    FilterBankNotBuilt,

    /// MFCC invoked with the cepstral stage disabled
    CepstralBasisNotBuilt,

    /// Could not reserve memory for an initialization-time buffer
    AllocationFailed { elements: usize },
}

impl ErrorCode for DspError {
    fn code(&self) -> i32 {
        match self {
            DspError::TransformSizeInvalid { .. } => 1001,
            DspError::WindowSizeInvalid { .. } => 1002,
            DspError::FftSizeInvalid { .. } => 1003,
            DspError::MelBandsInvalid { .. } => 1004,
            DspError::FrequencyRangeInvalid { .. } => 1005,
            DspError::MfccCountInvalid { .. } => 1006,
            DspError::SampleRateUnsupported { .. } => 1007,
            DspError::FrameLengthMismatch { .. } => 1008,
            DspError::DestLengthMismatch { .. } => 1009,
            DspError::ScratchTooSmall { .. } => 1010,
            DspError::NotInitialized { .. } => 2001,
            DspError::FilterBankNotBuilt => 2002,
            DspError::CepstralBasisNotBuilt => 2003,
            DspError::AllocationFailed { .. } => 3001,
        }
    }

    fn message(&self) -> String {
        match self {
            DspError::TransformSizeInvalid { n, buffer_len } => {
                format!(
                    "transform needs a positive point count and a buffer of 2n \
                     elements (n = {}, buffer length = {})",
                    n, buffer_len
                )
            }
            DspError::WindowSizeInvalid {
                window_size,
                fft_size,
            } => {
                format!(
                    "window size must be positive and no larger than the FFT \
                     size (got {} with FFT size {})",
                    window_size, fft_size
                )
            }
            DspError::FftSizeInvalid { fft_size } => {
                format!("FFT size must be a power of two (got {})", fft_size)
            }
            DspError::MelBandsInvalid { num_mels } => {
                format!("mel band count must be positive (got {})", num_mels)
            }
            DspError::FrequencyRangeInvalid {
                min_hertz,
                max_hertz,
                nyquist,
            } => {
                format!(
                    "frequency bounds must satisfy 0 <= min < max <= {} Hz \
                     (got [{}, {}])",
                    nyquist, min_hertz, max_hertz
                )
            }
            DspError::MfccCountInvalid { num_mfcc, num_mels } => {
                format!(
                    "MFCC needs a positive coefficient count and a configured \
                     mel stage (num_mfcc = {}, num_mels = {})",
                    num_mfcc, num_mels
                )
            }
            DspError::SampleRateUnsupported { sample_rate } => {
                format!("no default parameters for sampling rate {}", sample_rate)
            }
            DspError::FrameLengthMismatch { expected, actual } => {
                format!("frame must hold {} samples (got {})", expected, actual)
            }
            DspError::DestLengthMismatch { expected, actual } => {
                format!(
                    "destination must hold exactly {} elements (got {})",
                    expected, actual
                )
            }
            DspError::ScratchTooSmall { required, actual } => {
                format!(
                    "scratch buffer must hold at least {} elements (got {})",
                    required, actual
                )
            }
            DspError::NotInitialized { operation } => {
                format!("{} called before init()", operation)
            }
            DspError::FilterBankNotBuilt => {
                "mel filter bank not configured. init() with num_mels > 0 first".to_string()
            }
            DspError::CepstralBasisNotBuilt => {
                "cepstral basis not configured. init() with num_mfcc > 0 first".to_string()
            }
            DspError::AllocationFailed { elements } => {
                format!("failed to allocate buffer of {} elements", elements)
            }
        }
    }
}

impl fmt::Display for DspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dsp error (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for DspError {}

/// Wave handling errors
///
/// These errors cover WAV container reading/writing and gain utilities.
#[derive(Debug)]
pub enum WaveError {
    /// Container layout the pipeline does not accept
    UnsupportedLayout { details: String },

    /// Container header disagrees with the expected stream layout
    SpecMismatch {
        field: &'static str,
        expected: u32,
        actual: u32,
    },

    /// Container could not be parsed
    Malformed { details: String },

    /// Underlying file I/O failed
    Io { details: String },

    /// Gain operation on a zero-length signal
    EmptySignal,

    /// Normalization target above 0 dBFS
    GainOutOfRange { db: f64 },
}

impl ErrorCode for WaveError {
    fn code(&self) -> i32 {
        match self {
            WaveError::UnsupportedLayout { .. } => 4001,
            WaveError::SpecMismatch { .. } => 4002,
            WaveError::Malformed { .. } => 4003,
            WaveError::Io { .. } => 4004,
            WaveError::EmptySignal => 4005,
            WaveError::GainOutOfRange { .. } => 4006,
        }
    }

    fn message(&self) -> String {
        match self {
            WaveError::UnsupportedLayout { details } => {
                format!("unsupported wave layout: {}", details)
            }
            WaveError::SpecMismatch {
                field,
                expected,
                actual,
            } => {
                format!(
                    "wave {} mismatch: expected {}, found {}",
                    field, expected, actual
                )
            }
            WaveError::Malformed { details } => {
                format!("malformed wave container: {}", details)
            }
            WaveError::Io { details } => format!("wave I/O failed: {}", details),
            WaveError::EmptySignal => "signal is empty".to_string(),
            WaveError::GainOutOfRange { db } => {
                format!("normalization target must not exceed 0 dBFS (got {})", db)
            }
        }
    }
}

impl fmt::Display for WaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wave error (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for WaveError {}

impl From<std::io::Error> for WaveError {
    fn from(err: std::io::Error) -> Self {
        WaveError::Io {
            details: err.to_string(),
        }
    }
}

impl From<hound::Error> for WaveError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => WaveError::Io {
                details: io.to_string(),
            },
            other => WaveError::Malformed {
                details: other.to_string(),
            },
        }
    }
}
