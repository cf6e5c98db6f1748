use rustfft::num_complex::Complex;
use num_traits::Zero;

use crate::DigSigProcErr;
use crate::fourier_analysis::{Direction, FFT};

/// Circular cross-correlation against a fixed waveform, done in the frequency domain.  For a window x the
/// response at lag k is sum_n x[n+k] * conj(w[n]), so a copy of the waveform delayed by k samples peaks at k.
pub struct MatchedFilter {
	n: usize,
	fwd:  FFT,
	inv: FFT,
	waveform_freq_domain_conj: Vec<Complex<f64>>,
}

impl MatchedFilter {

	pub fn new(waveform_time_domain:&[Complex<f64>]) -> Self {
		let n = waveform_time_domain.len();
		let mut fwd  = FFT::new(n, Direction::Forward);
		let inv = FFT::new(n, Direction::Inverse);

		let waveform_freq_domain:Vec<Complex<f64>> = fwd.execute(&waveform_time_domain);
		let waveform_freq_domain_conj = waveform_freq_domain.into_iter().map(|x| x.conj()).collect();

		MatchedFilter { n, fwd, inv, waveform_freq_domain_conj }
	}

	/// The waveform followed by zeros out to n_pad samples.  Windows of n_pad samples then give a linear
	/// (not wrapped) correlation for lags 0 through n_pad - waveform length.
	pub fn zero_padded(waveform_time_domain:&[Complex<f64>], n_pad:usize) -> Self {
		let mut waveform:Vec<Complex<f64>> = waveform_time_domain.to_vec();
		while waveform.len() < n_pad {
			waveform.push(Complex::zero());
		}

		Self::new(&waveform)
	}

	pub fn len(&self) -> usize {
		self.n
	}

	pub fn apply(&mut self, signal_time_domain:&[Complex<f64>]) -> Result<MatchedFilterResponse, DigSigProcErr> {
		if signal_time_domain.len() != self.n {
			Err(DigSigProcErr::Config(format!("wrong-sized input for matched filter: {} samples, expected {}",
				signal_time_domain.len(), self.n)))
		} else {
			let signal_freq_domain:Vec<Complex<f64>> = self.fwd.execute(signal_time_domain);

			let correlation_freq_domain:Vec<Complex<f64>> = signal_freq_domain.iter().zip(self.waveform_freq_domain_conj.iter()).map(|(a,b)| a*b).collect();
			let correlation_time_domain:Vec<Complex<f64>> = self.inv.execute(&correlation_freq_domain);

			Ok(MatchedFilterResponse{ correlation_time_domain })
		}
	}

}

pub struct MatchedFilterResponse {
	pub correlation_time_domain: Vec<Complex<f64>>,
}

impl MatchedFilterResponse {

	pub fn magnitudes(&self) -> Vec<f64> {
		self.correlation_time_domain.iter().map(|c| c.norm()).collect()
	}

}
