// Gain module - level measurement and RMS normalization

use crate::dsp::Sample;
use crate::error::WaveError;

/// Root mean square of the signal (0 for an empty slice).
pub fn rms<F: Sample>(samples: &[F]) -> F {
    if samples.is_empty() {
        return F::zero();
    }
    let len = F::from_usize(samples.len());
    let mut sum = F::zero();
    for &sample in samples {
        sum = sum + sample * sample / len;
    }
    sum.sqrt()
}

/// Signal level in dBFS, from the RMS amplitude.
pub fn decibel<F: Sample>(samples: &[F]) -> F {
    F::from_f64(20.0) * rms(samples).log10()
}

/// Scale the signal so its RMS level sits at `target_db` dBFS
///
/// # Errors
/// `EmptySignal` for a zero-length slice; `GainOutOfRange` when the target
/// is above 0 dBFS.
pub fn normalize_db<F: Sample>(samples: &mut [F], target_db: F) -> Result<(), WaveError> {
    if samples.is_empty() {
        return Err(WaveError::EmptySignal);
    }
    if target_db > F::zero() {
        return Err(WaveError::GainOutOfRange {
            db: target_db.to_f64().unwrap_or(f64::NAN),
        });
    }

    let level = decibel(samples);
    let scale = F::from_f64(10.0).powf((target_db - level) / F::from_f64(20.0));
    for sample in samples.iter_mut() {
        *sample = *sample * scale;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaveError;

    #[test]
    fn test_rms_of_constant_signal() {
        let samples = vec![0.5f32; 1000];
        assert!((rms(&samples) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rms_of_unit_sine() {
        let samples: Vec<f64> = (0..16000)
            .map(|i| (2.0 * std::f64::consts::PI * 100.0 * i as f64 / 16000.0).sin())
            .collect();
        // A full-scale sine sits at 1/sqrt(2).
        assert!((rms(&samples) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn test_rms_of_empty_signal_is_zero() {
        assert_eq!(rms::<f32>(&[]), 0.0);
    }

    #[test]
    fn test_normalize_reaches_target_level() {
        let mut samples: Vec<f64> = (0..16000)
            .map(|i| 0.1 * (2.0 * std::f64::consts::PI * 100.0 * i as f64 / 16000.0).sin())
            .collect();
        normalize_db(&mut samples, -20.0).unwrap();
        assert!((decibel(&samples) + 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_rejects_positive_target() {
        let mut samples = vec![0.5f32; 100];
        assert!(matches!(
            normalize_db(&mut samples, 3.0),
            Err(WaveError::GainOutOfRange { .. })
        ));
    }

    #[test]
    fn test_normalize_rejects_empty_signal() {
        let mut samples: Vec<f32> = Vec::new();
        assert!(matches!(
            normalize_db(&mut samples, -20.0),
            Err(WaveError::EmptySignal)
        ));
    }
}
