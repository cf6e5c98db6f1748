
use rustfft::num_complex::Complex;

use crate::DigSigProcErr;
use crate::filters::FIR;
use crate::types::SampleBuffer;

/// Anti-alias lowpass (applied with zero phase) followed by linear interpolation onto a uniform grid at fs_out
#[derive(Debug, Clone)]
pub struct Resampler {
	pub fs_out: f64,
	pub cutoff_hz: f64,
	pub taps: usize,
}

impl Resampler {

	pub fn new(fs_out:f64, cutoff_hz:f64, taps:usize) -> Result<Self, DigSigProcErr> {
		if !(fs_out.is_finite() && fs_out > 0.0) {
			return Err(DigSigProcErr::Config(format!("output sample rate must be positive, got {}", fs_out)));
		}
		if !(cutoff_hz > 0.0 && cutoff_hz < 0.5*fs_out) {
			return Err(DigSigProcErr::Config(format!("anti-alias cutoff {} [Hz] must be positive and below fs_out/2 = {} [Hz]",
				cutoff_hz, 0.5*fs_out)));
		}
		if taps == 0 {
			return Err(DigSigProcErr::Config("anti-alias filter needs at least one tap".to_string()));
		}
		Ok(Self{ fs_out, cutoff_hz, taps })
	}

	/// Number of output samples that covers the same time span as n_in samples at fs_in
	pub fn output_len(&self, n_in:usize, fs_in:f64) -> usize {
		if n_in == 0 { 0 } else { (((n_in - 1) as f64) * (self.fs_out / fs_in)).floor() as usize + 1 }
	}

	pub fn apply(&self, input:&SampleBuffer) -> Result<SampleBuffer, DigSigProcErr> {
		let n_out:usize = self.output_len(input.len(), input.fs());
		self.apply_with_len(input, n_out)
	}

	pub fn apply_with_len(&self, input:&SampleBuffer, n_out:usize) -> Result<SampleBuffer, DigSigProcErr> {
		let fs_in:f64 = input.fs();
		let ratio:f64 = self.fs_out / fs_in;
		if !(ratio.is_finite() && ratio > 0.0) {
			return Err(DigSigProcErr::Config(format!("degenerate sample rate ratio {} / {}", self.fs_out, fs_in)));
		}
		if input.is_empty() {
			return Err(DigSigProcErr::Config("nothing to resample".to_string()));
		}

		let lowpass = FIR::lowpass(self.taps, self.cutoff_hz / (0.5 * fs_in))?;
		let filtered:Vec<Complex<f64>> = lowpass.filtfilt(input.samples());

		// One grid for both rails so I and Q stay aligned
		let step:f64 = fs_in / self.fs_out;
		let re:Vec<f64> = interp(&filtered.iter().map(|c| c.re).collect::<Vec<f64>>(), step, n_out);
		let im:Vec<f64> = interp(&filtered.iter().map(|c| c.im).collect::<Vec<f64>>(), step, n_out);

		let samples:Vec<Complex<f64>> = re.into_iter().zip(im.into_iter()).map(|(re, im)| Complex{ re, im }).collect();
		SampleBuffer::new(samples, self.fs_out)
	}

}

/// Linear interpolation of x (sampled at integer indices) at t_k = k*step for k in 0..n_out.  Points past the
/// last input sample take the last value.
pub fn interp(x:&[f64], step:f64, n_out:usize) -> Vec<f64> {
	if x.is_empty() { return vec![0.0; n_out]; }

	let last:usize = x.len() - 1;
	(0..n_out).map(|k| {
		let t:f64 = (k as f64) * step;
		let i:usize = t.floor() as usize;
		if i >= last { x[last] }
		else {
			let frac:f64 = t - (i as f64);
			x[i] + frac * (x[i+1] - x[i])
		}
	}).collect()
}
