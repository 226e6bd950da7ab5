// FFT module - in-place radix-2 Fourier transform
//
// The transform operates on a split buffer: `buf[0..n]` holds real parts and
// `buf[n..2n]` holds imaginary parts. This is the layout the rest of the
// pipeline hands around, so no interleaving conversion is ever needed.
//
// Algorithm (iterative Cooley-Tukey):
// 1. Bit-reversal permutation of the input
// 2. Butterfly recombination over block sizes 2, 4, ..., n with twiddle
//    factors e^(-2*pi*i*j / block_len) (conjugated for the inverse)
// 3. For the inverse transform, division of every element by n

use crate::dsp::Sample;
use crate::error::DspError;

/// Reverse the low `num_bits` bits of `value`.
fn bit_reverse(value: usize, num_bits: u32) -> usize {
    let mut reversed = 0;
    for bit in 0..num_bits {
        reversed |= ((value >> bit) & 1) << (num_bits - bit - 1);
    }
    reversed
}

fn transform<F: Sample>(buf: &mut [F], n: usize, inverse: bool) -> Result<(), DspError> {
    if n == 0 || buf.len() < n * 2 {
        return Err(DspError::TransformSizeInvalid {
            n,
            buffer_len: buf.len(),
        });
    }
    // Callers validate the power-of-two requirement once at initialization;
    // a non-power-of-two count would leave part of the buffer untransformed.
    debug_assert!(n.is_power_of_two(), "transform length must be a power of two");

    // Permute into bit-reversed order, swapping each unordered pair once.
    let order = n.trailing_zeros();
    for i in 0..n {
        let reversed = bit_reverse(i, order);
        if i > reversed {
            buf.swap(i, reversed);
            buf.swap(i + n, reversed + n);
        }
    }

    let theta_sign = if inverse { F::one() } else { -F::one() };
    let two_pi = F::from_f64(2.0) * F::PI();
    let mut block_len = 2;
    while block_len <= n {
        let half = block_len / 2;
        let block_count = n / block_len;
        for j in 0..half {
            let theta = theta_sign * two_pi * F::from_usize(j) / F::from_usize(block_len);
            let (w_re, w_im) = (theta.cos(), theta.sin());
            for k in 0..block_count {
                let even = k * block_len + j;
                let odd = even + half;
                let odd_re = buf[odd] * w_re - buf[odd + n] * w_im;
                let odd_im = buf[odd] * w_im + buf[odd + n] * w_re;
                let even_re = buf[even];
                let even_im = buf[even + n];
                buf[odd] = even_re - odd_re;
                buf[odd + n] = even_im - odd_im;
                buf[even] = even_re + odd_re;
                buf[even + n] = even_im + odd_im;
            }
        }
        block_len <<= 1;
    }

    if inverse {
        let scale = F::from_usize(n);
        for value in buf[..n * 2].iter_mut() {
            *value = *value / scale;
        }
    }

    Ok(())
}

/// Forward transform, in place
///
/// `buf[0..n]` real parts, `buf[n..2n]` imaginary parts. `n` must be a
/// power of two; see the module notes.
pub fn fft<F: Sample>(buf: &mut [F], n: usize) -> Result<(), DspError> {
    transform(buf, n, false)
}

/// Inverse transform, in place, including the 1/n scaling
pub fn ifft<F: Sample>(buf: &mut [F], n: usize) -> Result<(), DspError> {
    transform(buf, n, true)
}
