// Window module - analysis window generation
//
// Windows are computed once at initialization and applied to every frame
// before transformation to reduce spectral leakage.

use serde::{Deserialize, Serialize};

use crate::dsp::{alloc_zeroed, Sample};
use crate::error::DspError;

/// Supported analysis window shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Every weight fixed at 1.0
    Rectangle,
    /// Raised-cosine taper, `0.54 - 0.46 * cos(2*pi*i / (len - 1))`
    Hanning,
}

/// Build the weight sequence for one analysis window
///
/// # Errors
/// `WindowSizeInvalid` when `window_size` is zero, exceeds `fft_size`, or
/// (Hanning only) is below 2 - the raised-cosine term divides by
/// `window_size - 1`.
pub fn build_window<F: Sample>(
    kind: WindowKind,
    window_size: usize,
    fft_size: usize,
) -> Result<Vec<F>, DspError> {
    if window_size == 0 || window_size > fft_size {
        return Err(DspError::WindowSizeInvalid {
            window_size,
            fft_size,
        });
    }

    let mut window = alloc_zeroed::<F>(window_size)?;
    match kind {
        WindowKind::Rectangle => {
            for weight in window.iter_mut() {
                *weight = F::one();
            }
        }
        WindowKind::Hanning => {
            if window_size < 2 {
                return Err(DspError::WindowSizeInvalid {
                    window_size,
                    fft_size,
                });
            }
            let denom = F::from_usize(window_size - 1);
            let two_pi = F::from_f64(2.0) * F::PI();
            for (i, weight) in window.iter_mut().enumerate() {
                let phase = two_pi * F::from_usize(i) / denom;
                *weight = F::from_f64(0.54) - F::from_f64(0.46) * phase.cos();
            }
        }
    }

    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_is_all_ones() {
        let window: Vec<f32> = build_window(WindowKind::Rectangle, 320, 512).unwrap();
        assert_eq!(window.len(), 320);
        assert!(window.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_rectangle_allows_length_one() {
        let window: Vec<f32> = build_window(WindowKind::Rectangle, 1, 512).unwrap();
        assert_eq!(window, vec![1.0]);
    }

    #[test]
    fn test_hanning_weights_within_unit_range() {
        let window: Vec<f64> = build_window(WindowKind::Hanning, 320, 512).unwrap();
        assert_eq!(window.len(), 320);
        for &w in &window {
            assert!((0.0..=1.0).contains(&w), "weight {} out of [0, 1]", w);
        }
        // Tapered at the edges, full scale in the middle.
        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[319] - 0.08).abs() < 1e-9);
        assert!(window[160] > 0.99);
    }

    #[test]
    fn test_hanning_rejects_length_one() {
        let result: Result<Vec<f32>, _> = build_window(WindowKind::Hanning, 1, 512);
        assert_eq!(
            result,
            Err(DspError::WindowSizeInvalid {
                window_size: 1,
                fft_size: 512
            })
        );
    }

    #[test]
    fn test_rejects_zero_length() {
        let result: Result<Vec<f32>, _> = build_window(WindowKind::Rectangle, 0, 512);
        assert_eq!(
            result,
            Err(DspError::WindowSizeInvalid {
                window_size: 0,
                fft_size: 512
            })
        );
    }

    #[test]
    fn test_rejects_window_longer_than_fft() {
        let result: Result<Vec<f32>, _> = build_window(WindowKind::Hanning, 600, 512);
        assert_eq!(
            result,
            Err(DspError::WindowSizeInvalid {
                window_size: 600,
                fft_size: 512
            })
        );
    }
}
