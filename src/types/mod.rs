
use num_complex::Complex;

use crate::DigSigProcErr;

/// A fixed-length run of complex baseband samples at a known rate.  Once conditioning
/// hands one of these to the search stage, it's only ever read.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
	samples: Vec<Complex<f64>>,
	fs: f64,
}

impl SampleBuffer {

	pub fn new(samples:Vec<Complex<f64>>, fs:f64) -> Result<Self, DigSigProcErr> {
		if fs.is_finite() && fs > 0.0 { Ok(Self{ samples, fs }) }
		else { Err(DigSigProcErr::Config(format!("sample rate must be positive, got {}", fs))) }
	}

	pub fn fs(&self) -> f64 { self.fs }

	pub fn len(&self) -> usize { self.samples.len() }

	pub fn is_empty(&self) -> bool { self.samples.is_empty() }

	pub fn samples(&self) -> &[Complex<f64>] { &self.samples }

	pub fn into_samples(self) -> Vec<Complex<f64>> { self.samples }

}
