
use std::f64::consts;

use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::DigSigProcErr;

pub mod matched_filter;
pub mod resample;

/// Finite impulse response filter with real taps applied to complex samples
#[derive(Debug, Clone, PartialEq)]
pub struct FIR {
	pub taps: Vec<f64>,
}

impl FIR {

	/// Hann-windowed sinc lowpass.  The cutoff is normalized so that 1.0 is the Nyquist frequency,
	/// and the taps are scaled for unity gain at DC.
	pub fn lowpass(num_taps:usize, cutoff:f64) -> Result<Self, DigSigProcErr> {
		if num_taps == 0 {
			return Err(DigSigProcErr::Config("a lowpass filter needs at least one tap".to_string()));
		}
		if !(cutoff > 0.0 && cutoff < 1.0) {
			return Err(DigSigProcErr::Config(format!("normalized cutoff must be in (0, 1), got {}", cutoff)));
		}

		let alpha:f64 = 0.5 * ((num_taps - 1) as f64);
		let mut taps:Vec<f64> = (0..num_taps).map(|k| {
			let m:f64 = (k as f64) - alpha;
			cutoff * sinc(cutoff * m) * hann(k, num_taps)
		}).collect();

		let dc_gain:f64 = taps.iter().sum();
		if dc_gain.abs() < std::f64::EPSILON {
			return Err(DigSigProcErr::Numeric("lowpass design has zero DC gain".to_string()));
		}
		for t in taps.iter_mut() { *t /= dc_gain; }

		Ok(Self{ taps })
	}

	pub fn len(&self) -> usize { self.taps.len() }

	/// Causal filtering where every sample before the start of x is taken to equal init.  Setting init to
	/// the first sample starts the filter in its steady state for a constant input.
	pub fn filter(&self, x:&[Complex<f64>], init:Complex<f64>) -> Vec<Complex<f64>> {
		(0..x.len()).map(|n| {
			self.taps.iter().enumerate().fold(Complex::zero(), |acc:Complex<f64>, (k, b)| {
				let s:Complex<f64> = if n >= k { x[n-k] } else { init };
				acc + s * *b
			})
		}).collect()
	}

	/// Zero-phase filtering: run forward, then backward over the result.  The ends are padded with an odd
	/// extension of 3x the filter length (or as much as the input allows) to keep transients out of the data.
	pub fn filtfilt(&self, x:&[Complex<f64>]) -> Vec<Complex<f64>> {
		if x.is_empty() { return vec![]; }

		let n:usize = x.len();
		let pad:usize = (3 * self.taps.len()).min(n - 1);

		let first:Complex<f64> = x[0];
		let last:Complex<f64>  = x[n-1];
		let mut ext:Vec<Complex<f64>> = Vec::with_capacity(n + 2*pad);
		ext.extend((1..=pad).rev().map(|k| first * 2.0 - x[k]));
		ext.extend_from_slice(x);
		ext.extend((1..=pad).map(|k| last * 2.0 - x[n-1-k]));

		let init:Complex<f64> = ext[0];
		let mut y:Vec<Complex<f64>> = self.filter(&ext, init);

		y.reverse();
		let init:Complex<f64> = y[0];
		let mut y:Vec<Complex<f64>> = self.filter(&y, init);
		y.reverse();

		y.drain(pad..(pad+n)).collect()
	}

}

fn sinc(x:f64) -> f64 {
	if x == 0.0 { 1.0 } else { (consts::PI * x).sin() / (consts::PI * x) }
}

// Symmetric Hann window, zero at both ends
fn hann(k:usize, n:usize) -> f64 {
	if n == 1 { 1.0 } else { 0.5 - 0.5 * ((2.0 * consts::PI * (k as f64)) / ((n - 1) as f64)).cos() }
}
