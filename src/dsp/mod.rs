// DSP module - spectral feature-extraction pipeline
//
// This module turns fixed-length frames of normalized samples into one of
// three representations: magnitude spectrum, mel-filtered spectrum, or
// cepstral coefficients.
//
// Module organization:
// - fft: in-place radix-2 transform kernel
// - window: analysis window generation
// - mel: triangular mel-scale filter bank
// - dct: cosine basis for cepstral projection
// - mod.rs: coordinator (FeatureExtractor)
//
// Data flow per frame: samples -> windowed into a zero-padded scratch buffer
// -> transformed in place -> magnitudes -> (optional) mel band energies ->
// (optional) log compression -> (MFCC) cepstral projection.

pub mod dct;
pub mod fft;
pub mod mel;
pub mod window;


pub use dct::CepstralBasis;
pub use mel::{FilterBank, MelFilter};
pub use window::WindowKind;

use log::debug;
use num_traits::float::FloatConst;
use num_traits::Float;

use crate::config::ExtractorConfig;
use crate::error::DspError;

/// Floating-point sample type driving the pipeline
///
/// Implemented for `f32` and `f64` so single and double precision share one
/// implementation.
pub trait Sample: Float + FloatConst {
    fn from_f64(value: f64) -> Self;
    fn from_usize(value: usize) -> Self;
}

impl Sample for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn from_usize(value: usize) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn from_usize(value: usize) -> Self {
        value as f64
    }
}

/// Allocate a zeroed buffer, reporting exhaustion as `AllocationFailed`.
fn alloc_zeroed<F: Sample>(len: usize) -> Result<Vec<F>, DspError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| DspError::AllocationFailed { elements: len })?;
    buf.resize(len, F::zero());
    Ok(buf)
}

/// FeatureExtractor coordinates the frame-to-feature pipeline
///
/// The extractor owns the window, filter bank, cepstral basis, and one
/// internal scratch buffer. After `init` the built state is read-only; the
/// `*_with_scratch` entry points take `&self` plus a caller-owned scratch
/// buffer so independent threads can extract concurrently from one shared
/// extractor, one scratch buffer each.
pub struct FeatureExtractor<F: Sample = f32> {
    sample_rate: u32,
    window_size: usize,
    fft_size: usize,
    is_center: bool,
    epsilon: F,
    ref_level_db: F,
    window: Vec<F>,
    filter_bank: Option<FilterBank<F>>,
    cepstral_basis: Option<CepstralBasis<F>>,
    scratch: Vec<F>,
}

impl<F: Sample> Default for FeatureExtractor<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Sample> FeatureExtractor<F> {
    /// Create an uninitialized extractor; call `init` before extracting.
    pub fn new() -> Self {
        Self {
            sample_rate: 0,
            window_size: 0,
            fft_size: 0,
            is_center: false,
            epsilon: F::zero(),
            ref_level_db: F::zero(),
            window: Vec::new(),
            filter_bank: None,
            cepstral_basis: None,
            scratch: Vec::new(),
        }
    }

    /// Build (or rebuild) all extraction state from `config`
    ///
    /// Prior state is released first, so a failed call leaves the extractor
    /// uninitialized rather than half-rebuilt. Re-running with an identical
    /// configuration reproduces bit-identical window, filter bank, and
    /// basis content.
    pub fn init(&mut self, config: &ExtractorConfig) -> Result<(), DspError> {
        self.window = Vec::new();
        self.filter_bank = None;
        self.cepstral_basis = None;
        self.scratch = Vec::new();

        if config.fft_size == 0 || !config.fft_size.is_power_of_two() {
            return Err(DspError::FftSizeInvalid {
                fft_size: config.fft_size,
            });
        }

        let scratch = alloc_zeroed(config.fft_size * 2)?;
        let window = window::build_window(config.window_kind, config.window_size, config.fft_size)?;

        let filter_bank = if config.num_mels != 0 {
            Some(FilterBank::build(
                config.num_mels,
                F::from_f64(config.min_hertz as f64),
                F::from_f64(config.max_hertz as f64),
                config.sample_rate,
                config.fft_size,
            )?)
        } else {
            None
        };

        let cepstral_basis = if config.num_mfcc != 0 {
            Some(CepstralBasis::build(config.num_mels, config.num_mfcc)?)
        } else {
            None
        };

        self.sample_rate = config.sample_rate;
        self.window_size = config.window_size;
        self.fft_size = config.fft_size;
        self.is_center = config.is_center;
        self.epsilon = F::from_f64(config.epsilon as f64);
        self.ref_level_db = F::from_f64(config.ref_level_db as f64);
        self.window = window;
        self.filter_bank = filter_bank;
        self.cepstral_basis = cepstral_basis;
        self.scratch = scratch;

        debug!(
            "extractor ready: sample_rate={} window={} fft={} mels={} mfcc={}",
            self.sample_rate,
            self.window_size,
            self.fft_size,
            self.num_mels(),
            self.num_mfcc()
        );
        Ok(())
    }

    /// Whether `init` has completed
    pub fn is_ready(&self) -> bool {
        !self.window.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Output dimension of `spectrum`: the non-redundant half plus DC
    pub fn spectrum_len(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Output dimension of `melspectrum` (0 when the stage is disabled)
    pub fn num_mels(&self) -> usize {
        self.filter_bank.as_ref().map_or(0, FilterBank::len)
    }

    /// Output dimension of `mfcc` (0 when the stage is disabled)
    pub fn num_mfcc(&self) -> usize {
        self.cepstral_basis.as_ref().map_or(0, CepstralBasis::num_mfcc)
    }

    /// The analysis window weights (empty before `init`)
    pub fn window(&self) -> &[F] {
        &self.window
    }

    /// The mel filter bank, if the stage is configured
    pub fn filter_bank(&self) -> Option<&FilterBank<F>> {
        self.filter_bank.as_ref()
    }

    /// The cepstral basis, if the stage is configured
    pub fn cepstral_basis(&self) -> Option<&CepstralBasis<F>> {
        self.cepstral_basis.as_ref()
    }

    /// Minimum scratch length accepted by the `*_with_scratch` entry points
    pub fn scratch_len(&self) -> usize {
        self.fft_size * 2
    }

    /// Allocate a scratch buffer sized for this extractor
    pub fn allocate_scratch(&self) -> Result<Vec<F>, DspError> {
        alloc_zeroed(self.scratch_len())
    }

    /// Magnitude spectrum of one frame, using the internal scratch buffer
    ///
    /// `dest` must hold exactly `spectrum_len()` elements. With
    /// `logarize_output` each bin is compressed to decibels.
    pub fn spectrum(
        &mut self,
        frame: &[F],
        dest: &mut [F],
        logarize_output: bool,
    ) -> Result<(), DspError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.spectrum_with_scratch(frame, dest, logarize_output, &mut scratch);
        self.scratch = scratch;
        result
    }

    /// `spectrum` with a caller-owned scratch buffer of at least
    /// `scratch_len()` elements; safe for concurrent use
    pub fn spectrum_with_scratch(
        &self,
        frame: &[F],
        dest: &mut [F],
        logarize_output: bool,
        scratch: &mut [F],
    ) -> Result<(), DspError> {
        self.ensure_ready("spectrum")?;
        self.check_frame_and_scratch(frame, scratch)?;
        check_dest(dest, self.spectrum_len())?;

        self.magnitude(frame, dest, scratch)?;
        if logarize_output {
            for value in dest.iter_mut() {
                *value = self.logarize(*value);
            }
        }
        Ok(())
    }

    /// Mel band energies of one frame, using the internal scratch buffer
    ///
    /// `dest` must hold exactly `num_mels()` elements.
    pub fn melspectrum(
        &mut self,
        frame: &[F],
        dest: &mut [F],
        logarize_output: bool,
    ) -> Result<(), DspError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.melspectrum_with_scratch(frame, dest, logarize_output, &mut scratch);
        self.scratch = scratch;
        result
    }

    /// `melspectrum` with a caller-owned scratch buffer; safe for
    /// concurrent use
    pub fn melspectrum_with_scratch(
        &self,
        frame: &[F],
        dest: &mut [F],
        logarize_output: bool,
        scratch: &mut [F],
    ) -> Result<(), DspError> {
        self.ensure_ready("melspectrum")?;
        let bank = self.filter_bank.as_ref().ok_or(DspError::FilterBankNotBuilt)?;
        self.check_frame_and_scratch(frame, scratch)?;
        check_dest(dest, bank.len())?;

        self.magnitude_in_scratch(frame, scratch)?;
        bank.apply(&scratch[..self.spectrum_len()], dest);
        if logarize_output {
            for value in dest.iter_mut() {
                *value = self.logarize(*value);
            }
        }
        Ok(())
    }

    /// Cepstral coefficients of one frame, using the internal scratch buffer
    ///
    /// `dest` must hold exactly `num_mfcc()` elements. Band energies are
    /// always log-compressed before projection.
    pub fn mfcc(&mut self, frame: &[F], dest: &mut [F]) -> Result<(), DspError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.mfcc_with_scratch(frame, dest, &mut scratch);
        self.scratch = scratch;
        result
    }

    /// `mfcc` with a caller-owned scratch buffer; safe for concurrent use
    pub fn mfcc_with_scratch(
        &self,
        frame: &[F],
        dest: &mut [F],
        scratch: &mut [F],
    ) -> Result<(), DspError> {
        self.ensure_ready("mfcc")?;
        let bank = self.filter_bank.as_ref().ok_or(DspError::FilterBankNotBuilt)?;
        let basis = self
            .cepstral_basis
            .as_ref()
            .ok_or(DspError::CepstralBasisNotBuilt)?;
        self.check_frame_and_scratch(frame, scratch)?;
        check_dest(dest, basis.num_mfcc())?;

        self.magnitude_in_scratch(frame, scratch)?;
        // Band energies reuse the magnitude region of the scratch buffer:
        // the band count never exceeds the bin count.
        bank.apply_in_place(scratch);
        for value in scratch[..bank.len()].iter_mut() {
            *value = self.logarize(*value);
        }
        basis.project(&scratch[..bank.len()], dest);
        Ok(())
    }

    /// Amplitude to decibel conversion with the configured energy floor.
    fn logarize(&self, x: F) -> F {
        let floored = if x < self.epsilon { self.epsilon } else { x };
        F::from_f64(20.0) * floored.log10() - self.ref_level_db
    }

    /// Window `frame` into the zero-padded scratch buffer and transform.
    fn transform_frame(&self, frame: &[F], scratch: &mut [F]) -> Result<(), DspError> {
        for value in scratch[..self.fft_size * 2].iter_mut() {
            *value = F::zero();
        }
        let offset = if self.is_center {
            (self.fft_size - self.window_size) / 2
        } else {
            0
        };
        for (i, (&sample, &weight)) in frame.iter().zip(&self.window).enumerate() {
            scratch[offset + i] = sample * weight;
        }
        fft::fft(scratch, self.fft_size)
    }

    fn magnitude(&self, frame: &[F], dest: &mut [F], scratch: &mut [F]) -> Result<(), DspError> {
        self.transform_frame(frame, scratch)?;
        for (i, value) in dest.iter_mut().enumerate() {
            let re = scratch[i];
            let im = scratch[i + self.fft_size];
            *value = (re * re + im * im).sqrt();
        }
        Ok(())
    }

    /// Magnitudes written over the real half of the scratch buffer itself.
    fn magnitude_in_scratch(&self, frame: &[F], scratch: &mut [F]) -> Result<(), DspError> {
        self.transform_frame(frame, scratch)?;
        for i in 0..self.spectrum_len() {
            let re = scratch[i];
            let im = scratch[i + self.fft_size];
            scratch[i] = (re * re + im * im).sqrt();
        }
        Ok(())
    }

    fn ensure_ready(&self, operation: &'static str) -> Result<(), DspError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(DspError::NotInitialized { operation })
        }
    }

    fn check_frame_and_scratch(&self, frame: &[F], scratch: &[F]) -> Result<(), DspError> {
        if frame.len() != self.window_size {
            return Err(DspError::FrameLengthMismatch {
                expected: self.window_size,
                actual: frame.len(),
            });
        }
        if scratch.len() < self.scratch_len() {
            return Err(DspError::ScratchTooSmall {
                required: self.scratch_len(),
                actual: scratch.len(),
            });
        }
        Ok(())
    }
}

fn check_dest<F: Sample>(dest: &[F], expected: usize) -> Result<(), DspError> {
    if dest.len() != expected {
        return Err(DspError::DestLengthMismatch {
            expected,
            actual: dest.len(),
        });
    }
    Ok(())
}
