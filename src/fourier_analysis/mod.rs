
use std::sync::Arc;

use rustfft::FFTplanner;
use rustfft::FFT as PlannedFFT;
use rustfft::num_complex::Complex;
use num_traits::Zero;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
	Forward,
	Inverse,
}

/// A planned transform of one fixed length.  The inverse is scaled by 1/n, so running
/// Forward then Inverse gives back the original sequence.
pub struct FFT {
	n: usize,
	direction: Direction,
	plan: Arc<dyn PlannedFFT<f64>>,
	scratch: Vec<Complex<f64>>,
}

impl FFT {

	pub fn new(n:usize, direction:Direction) -> Self {
		let mut planner = FFTplanner::new(direction == Direction::Inverse);
		let plan = planner.plan_fft(n);
		let scratch = vec![Complex::zero(); n];
		FFT{ n, direction, plan, scratch }
	}

	pub fn len(&self) -> usize { self.n }

	/// Panics if the input isn't exactly the planned length
	pub fn execute(&mut self, x:&[Complex<f64>]) -> Vec<Complex<f64>> {
		assert_eq!(x.len(), self.n, "FFT input length doesn't match the planned length");

		// rustfft uses the input as scratch space, so work on a copy
		self.scratch.copy_from_slice(x);
		let mut out:Vec<Complex<f64>> = vec![Complex::zero(); self.n];
		self.plan.process(&mut self.scratch, &mut out);

		if self.direction == Direction::Inverse {
			let scale:f64 = 1.0 / (self.n as f64);
			for c in out.iter_mut() { *c = *c * scale; }
		}

		out
	}

}

pub fn fft(x:&[Complex<f64>]) -> Vec<Complex<f64>> { FFT::new(x.len(), Direction::Forward).execute(x) }
pub fn ifft(x:&[Complex<f64>]) -> Vec<Complex<f64>> { FFT::new(x.len(), Direction::Inverse).execute(x) }

#[test]
fn test_fft_and_ifft() {
	let x_time_usize:Vec<usize> = (0..12).collect();
	let x_time:Vec<Complex<f64>> = x_time_usize.iter().map(|x| Complex{re: *x as f64, im: 0.0}).collect();
	let x_freq:Vec<Complex<f64>> = fft(&x_time);

	// DC bin is the plain sum
	assert!((x_freq[0].re - 66.0).abs() < 1e-9);

	let x_time_usize_p:Vec<usize> = ifft(&x_freq).iter().map(|c| c.re.round() as usize ).collect();

	for (a,b) in x_time_usize.iter().zip(x_time_usize_p.iter()) {
		assert_eq!(a, b);
	}
}
