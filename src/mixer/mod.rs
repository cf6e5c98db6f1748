
use std::f64::consts;

use rustfft::num_complex::Complex;

/// Unit phasors exp(j*2*pi*(freq*k + phase)) for k in 0..n.  Frequency is in cycles per sample and
/// phase in cycles.  The phase is recomputed from k at every sample, so long oscillators don't drift.
pub fn oscillator(freq:f64, phase:f64, n:usize) -> Vec<Complex<f64>> {
	(0..n).map(|k| phasor(freq, phase, k)).collect()
}

/// Multiply a run of samples in place by the oscillator described above
pub fn mix(x:&mut [Complex<f64>], freq:f64, phase:f64) {
	for (k, s) in x.iter_mut().enumerate() {
		*s = *s * phasor(freq, phase, k);
	}
}

/// Same as mix, but leaves the input alone
pub fn mixed(x:&[Complex<f64>], freq:f64, phase:f64) -> Vec<Complex<f64>> {
	x.iter().enumerate().map(|(k, s)| s * phasor(freq, phase, k)).collect()
}

/// Multiply a window by an oscillator that has already been generated
pub fn apply(x:&[Complex<f64>], osc:&[Complex<f64>]) -> Vec<Complex<f64>> {
	x.iter().zip(osc.iter()).map(|(a, b)| a * b).collect()
}

fn phasor(freq:f64, phase:f64, k:usize) -> Complex<f64> {
	// Keep the argument in [0, 1) cycles before scaling to radians
	let cycles:f64 = (freq * (k as f64) + phase).fract();
	let rad:f64 = 2.0 * consts::PI * cycles;
	Complex{ re: rad.cos(), im: rad.sin() }
}
