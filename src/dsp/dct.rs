// DCT module - discrete cosine basis for cepstral projection
//
// The basis maps log-mel band energies to cepstral coefficients. It is
// intentionally unscaled: no 2/N factor and no halved leading coefficient,
// so coefficient 0 is the plain sum of the inputs. Downstream consumers
// depend on these unscaled values.

use crate::dsp::{alloc_zeroed, Sample};
use crate::error::DspError;

/// Dense cosine basis, built once at initialization
#[derive(Debug, Clone, PartialEq)]
pub struct CepstralBasis<F> {
    num_mels: usize,
    num_mfcc: usize,
    /// Row-major over coefficients: entry `(i, j)` lives at `j * num_mels + i`
    data: Vec<F>,
}

impl<F: Sample> CepstralBasis<F> {
    /// Build the `num_mfcc x num_mels` cosine basis
    ///
    /// Entry `(i, j) = cos(pi * j * (i + 0.5) / num_mels)`.
    ///
    /// # Errors
    /// `MfccCountInvalid` when `num_mfcc` is zero or no mel stage is
    /// configured (`num_mels` is zero).
    pub fn build(num_mels: usize, num_mfcc: usize) -> Result<Self, DspError> {
        if num_mfcc == 0 || num_mels == 0 {
            return Err(DspError::MfccCountInvalid { num_mfcc, num_mels });
        }

        let mut data = alloc_zeroed::<F>(num_mels * num_mfcc)?;
        let bands = F::from_usize(num_mels);
        for j in 0..num_mfcc {
            for i in 0..num_mels {
                let angle =
                    F::PI() * F::from_usize(j) * (F::from_usize(i) + F::from_f64(0.5)) / bands;
                data[j * num_mels + i] = angle.cos();
            }
        }

        Ok(Self {
            num_mels,
            num_mfcc,
            data,
        })
    }

    /// Mel band count the basis was built for
    pub fn num_mels(&self) -> usize {
        self.num_mels
    }

    /// Cepstral coefficient count
    pub fn num_mfcc(&self) -> usize {
        self.num_mfcc
    }

    /// Project band energies onto the basis
    ///
    /// `dest[j]` receives the dot product of basis row `j` with
    /// `mel_energies`. Pure; callers guarantee `mel_energies` holds
    /// `num_mels` elements and `dest` holds `num_mfcc`.
    pub fn project(&self, mel_energies: &[F], dest: &mut [F]) {
        for (j, coefficient) in dest.iter_mut().enumerate() {
            let row = &self.data[j * self.num_mels..(j + 1) * self.num_mels];
            let mut sum = F::zero();
            for (&basis, &energy) in row.iter().zip(mel_energies) {
                sum = sum + basis * energy;
            }
            *coefficient = sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_is_all_ones() {
        let basis: CepstralBasis<f64> = CepstralBasis::build(80, 40).unwrap();
        let energies = vec![1.0; 80];
        let mut coefficients = vec![0.0; 40];
        basis.project(&energies, &mut coefficients);

        // cos(0) = 1 for every band, so coefficient 0 is the plain sum.
        assert!((coefficients[0] - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_coefficient_zero_sums_inputs() {
        let basis: CepstralBasis<f32> = CepstralBasis::build(8, 4).unwrap();
        let energies: Vec<f32> = (0..8).map(|i| i as f32 * 0.25 - 1.0).collect();
        let mut coefficients = vec![0.0f32; 4];
        basis.project(&energies, &mut coefficients);

        let sum: f32 = energies.iter().sum();
        assert!((coefficients[0] - sum).abs() < 1e-5);
    }

    #[test]
    fn test_projection_matches_manual_dot_product() {
        let num_mels = 12;
        let num_mfcc = 5;
        let basis: CepstralBasis<f64> = CepstralBasis::build(num_mels, num_mfcc).unwrap();
        let energies: Vec<f64> = (0..num_mels).map(|i| (i as f64 * 0.7).cos()).collect();
        let mut coefficients = vec![0.0; num_mfcc];
        basis.project(&energies, &mut coefficients);

        for j in 0..num_mfcc {
            let expected: f64 = (0..num_mels)
                .map(|i| {
                    let angle =
                        std::f64::consts::PI * j as f64 * (i as f64 + 0.5) / num_mels as f64;
                    angle.cos() * energies[i]
                })
                .sum();
            assert!(
                (coefficients[j] - expected).abs() < 1e-9,
                "coefficient {}: {} vs {}",
                j,
                coefficients[j],
                expected
            );
        }
    }

    #[test]
    fn test_zero_mfcc_rejected() {
        let result: Result<CepstralBasis<f32>, _> = CepstralBasis::build(80, 0);
        assert_eq!(
            result,
            Err(DspError::MfccCountInvalid {
                num_mfcc: 0,
                num_mels: 80
            })
        );
    }

    #[test]
    fn test_missing_filter_bank_rejected() {
        let result: Result<CepstralBasis<f32>, _> = CepstralBasis::build(0, 40);
        assert_eq!(
            result,
            Err(DspError::MfccCountInvalid {
                num_mfcc: 40,
                num_mels: 0
            })
        );
    }
}
