// Mel module - triangular mel-scale filter bank
//
// Filters are triangular in the frequency domain and spaced uniformly on the
// mel scale. The step between filter edges is truncated to a whole number of
// mels, so edges land on integer mel values. Each filter spans two steps and
// therefore overlaps its neighbor by exactly one step.

use crate::dsp::{alloc_zeroed, Sample};
use crate::error::DspError;

/// Convert a frequency in Hz to the mel scale.
pub fn hertz_to_mel<F: Sample>(hertz: F) -> F {
    F::from_f64(1125.0) * (F::one() + hertz / F::from_f64(700.0)).ln()
}

/// Convert a mel value back to Hz.
pub fn mel_to_hertz<F: Sample>(mel: F) -> F {
    F::from_f64(700.0) * ((mel / F::from_f64(1125.0)).exp() - F::one())
}

/// One triangular filter: weights over a contiguous run of frequency bins
#[derive(Debug, Clone, PartialEq)]
pub struct MelFilter<F> {
    /// First FFT bin covered by the filter
    pub start: usize,
    /// Weights for bins `start .. start + weights.len()`
    pub weights: Vec<F>,
}

/// Triangular mel filter bank, built once at initialization
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank<F> {
    filters: Vec<MelFilter<F>>,
}

impl<F: Sample> FilterBank<F> {
    /// Build `num_mels` triangular filters over `[min_hertz, max_hertz]`
    ///
    /// # Errors
    /// `MelBandsInvalid` when `num_mels` is zero; `FrequencyRangeInvalid`
    /// when `min_hertz` is negative or `max_hertz` falls outside
    /// `(min_hertz, sample_rate / 2]`.
    pub fn build(
        num_mels: usize,
        min_hertz: F,
        max_hertz: F,
        sample_rate: u32,
        fft_size: usize,
    ) -> Result<Self, DspError> {
        if num_mels == 0 {
            return Err(DspError::MelBandsInvalid { num_mels });
        }
        let nyquist = F::from_usize(sample_rate as usize / 2);
        if min_hertz < F::zero() || max_hertz <= min_hertz || max_hertz > nyquist {
            return Err(DspError::FrequencyRangeInvalid {
                min_hertz: min_hertz.to_f32().unwrap_or(f32::NAN),
                max_hertz: max_hertz.to_f32().unwrap_or(f32::NAN),
                nyquist: nyquist.to_f32().unwrap_or(f32::NAN),
            });
        }

        let min_mel = hertz_to_mel(min_hertz);
        let max_mel = hertz_to_mel(max_hertz);
        let step = ((max_mel - min_mel) / F::from_usize(num_mels + 1))
            .to_usize()
            .unwrap_or(0);

        let mut filters = Vec::with_capacity(num_mels);
        for n in 0..num_mels {
            let start_hertz = mel_to_hertz(min_mel + F::from_usize(n * step));
            let end_hertz = mel_to_hertz(min_mel + F::from_usize((n + 2) * step));
            let start = bin_for_hertz(start_hertz, fft_size, sample_rate);
            let length = bin_for_hertz(end_hertz, fft_size, sample_rate) - start;

            let mut weights = alloc_zeroed::<F>(length)?;
            if length > 0 {
                // Rising edge: f(x) = slope * x + offset, from 0 at the start
                // bin up to the midpoint.
                let slope = F::from_f64(2.0) / F::from_usize(length);
                let offset = -slope * F::from_usize(start);
                for (i, weight) in weights.iter_mut().enumerate().take(length / 2) {
                    *weight = slope * F::from_usize(start + i) + offset;
                }

                // The midpoint bin is pinned to exactly 1.0.
                weights[length / 2] = F::one();

                // Falling edge mirrors the rise back down to 0 at the end bin.
                let slope = -slope;
                let offset = -slope * F::from_usize(start + length);
                for (i, weight) in weights.iter_mut().enumerate().skip(length / 2 + 1) {
                    *weight = slope * F::from_usize(start + i) + offset;
                }
            }

            filters.push(MelFilter { start, weights });
        }

        Ok(Self { filters })
    }

    /// Number of mel bands
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// The individual filters, ordered by band
    pub fn filters(&self) -> &[MelFilter<F>] {
        &self.filters
    }

    /// Reduce a magnitude spectrum to per-band energies
    ///
    /// `dest[k]` receives the weighted sum of the bins filter `k` covers.
    /// Callers guarantee `magnitude` spans every covered bin and `dest`
    /// holds `len()` elements.
    pub fn apply(&self, magnitude: &[F], dest: &mut [F]) {
        for (band, filter) in dest.iter_mut().zip(&self.filters) {
            let mut sum = F::zero();
            for (i, &weight) in filter.weights.iter().enumerate() {
                sum = sum + magnitude[filter.start + i] * weight;
            }
            *band = sum;
        }
    }

    /// Reduce in place, writing band `k` into `buf[k]`
    ///
    /// Valid because the band count never exceeds the magnitude bin count
    /// and band `k` is stored only after filter `k` has read its bins.
    pub fn apply_in_place(&self, buf: &mut [F]) {
        for k in 0..self.filters.len() {
            let filter = &self.filters[k];
            let mut sum = F::zero();
            for (i, &weight) in filter.weights.iter().enumerate() {
                sum = sum + buf[filter.start + i] * weight;
            }
            buf[k] = sum;
        }
    }
}

/// Map a frequency to its FFT bin index.
fn bin_for_hertz<F: Sample>(hertz: F, fft_size: usize, sample_rate: u32) -> usize {
    (F::from_usize(fft_size + 1) * hertz / F::from_usize(sample_rate as usize))
        .floor()
        .to_usize()
        .unwrap_or(0)
}
