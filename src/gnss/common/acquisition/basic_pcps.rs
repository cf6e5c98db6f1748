
use log::{debug, trace};
use rustfft::num_complex::Complex;

use crate::DigSigProcErr;
use crate::filters::matched_filter::MatchedFilter;
use crate::gnss::code::CodeReplicaGenerator;
use crate::mixer;
use crate::types::SampleBuffer;

use super::{AcquisitionResult, Padding, SignalProfile};

/// Peak of the accumulator for one Doppler hypothesis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hypothesis {
	pub doppler_hz: f64,
	pub code_idx: usize,
	pub metric: f64,
	pub peak_to_mean: f64,
}

impl Hypothesis {

	// Starting point of the fold; any hypothesis with a positive metric replaces it
	fn none() -> Self { Self{ doppler_hz: 0.0, code_idx: 0, metric: 0.0, peak_to_mean: 0.0 } }

}

/// Parallel code phase search for one PRN with incoherent integration across blocks.  The replica's transform
/// is computed once here and reused for every Doppler hypothesis.
pub struct Acquisition<'a> {
	pub prn: usize,
	profile: &'a SignalProfile,
	filter: MatchedFilter,
}

impl<'a> Acquisition<'a> {

	pub fn new(profile:&'a SignalProfile, codes:&dyn CodeReplicaGenerator, prn:usize) -> Result<Self, DigSigProcErr> {
		profile.validate()?;
		if codes.code_length() != profile.code_length {
			return Err(DigSigProcErr::Config(format!("{}: code generator has {} chips per period, profile expects {}",
				profile.name, codes.code_length(), profile.code_length)));
		}
		if !codes.prns().contains(&prn) {
			return Err(DigSigProcErr::Config(format!("{}: no code for PRN {}", profile.name, prn)));
		}

		let replica:Vec<Complex<f64>> = codes.generate(prn, 0.0, profile.block_len)?;
		if replica.len() != profile.block_len {
			return Err(DigSigProcErr::Config(format!("{}: replica has {} samples, block has {}",
				profile.name, replica.len(), profile.block_len)));
		}

		let filter = match profile.padding {
			Padding::None       => MatchedFilter::new(&replica),
			Padding::ZeroPadded => MatchedFilter::zero_padded(&replica, profile.window_len()),
		};

		Ok(Self{ prn, profile, filter })
	}

	pub fn test_hypothesis(&mut self, buffer:&SampleBuffer, doppler_hz:f64) -> Result<Hypothesis, DigSigProcErr> {
		let n:usize = self.profile.block_len;
		let len:usize = self.profile.window_len();

		// Windows start one block apart; when padded they're two blocks long and overlap by half
		let osc:Vec<Complex<f64>> = mixer::oscillator(-doppler_hz / self.profile.fs, 0.0, len);
		let windows:Vec<&[Complex<f64>]> = (0..self.profile.coherent_blocks)
			.map(|b| &buffer.samples()[(b*n)..(b*n + len)])
			.collect();

		let acc:Vec<f64> = incoherent_sum(&mut self.filter, &windows, &osc)?;
		if let Some(bad_idx) = acc.iter().position(|x| !x.is_finite()) {
			return Err(DigSigProcErr::Numeric(format!("PRN {}: non-finite correlation at lag {} for {} [Hz]",
				self.prn, bad_idx, doppler_hz)));
		}

		let (code_idx, metric) = peak(&acc);
		let mean:f64 = acc.iter().sum::<f64>() / (acc.len() as f64);
		let peak_to_mean:f64 = if mean > 0.0 { metric / mean } else { 0.0 };

		Ok(Hypothesis{ doppler_hz, code_idx, metric, peak_to_mean })
	}

	pub fn search(&mut self, buffer:&SampleBuffer) -> Result<AcquisitionResult, DigSigProcErr> {
		self.profile.check_buffer(buffer)?;

		let best:Hypothesis = self.profile.doppler_bins().into_iter().try_fold(Hypothesis::none(), |best, doppler_hz| {
			let hyp = self.test_hypothesis(buffer, doppler_hz)?;
			trace!("PRN {} {:8.1} [Hz]: metric {:.1} at lag {}", self.prn, hyp.doppler_hz, hyp.metric, hyp.code_idx);

			// Strictly greater, so the earliest hypothesis wins a tie
			let ans:Result<Hypothesis, DigSigProcErr> = Ok(if hyp.metric > best.metric { hyp } else { best });
			ans
		})?;

		debug!("PRN {}: best {:.1} [Hz], lag {}, metric {:.1}, peak/mean {:.2}",
			self.prn, best.doppler_hz, best.code_idx, best.metric, best.peak_to_mean);

		Ok(AcquisitionResult{
			metric:           best.metric,
			code_phase_chips: self.profile.code_phase_chips(best.code_idx),
			doppler_hz:       best.doppler_hz,
		})
	}

}

pub fn search(buffer:&SampleBuffer, profile:&SignalProfile, codes:&dyn CodeReplicaGenerator, prn:usize) -> Result<AcquisitionResult, DigSigProcErr> {
	Acquisition::new(profile, codes, prn)?.search(buffer)
}

/// Wipe each window with the same oscillator, correlate, and add the correlation magnitudes.  Magnitudes
/// rather than complex values because carrier phase isn't continuous from one window to the next.
pub fn incoherent_sum(filter:&mut MatchedFilter, windows:&[&[Complex<f64>]], osc:&[Complex<f64>]) -> Result<Vec<f64>, DigSigProcErr> {
	let mut acc:Vec<f64> = vec![0.0; filter.len()];

	for window in windows {
		if window.len() != osc.len() {
			return Err(DigSigProcErr::Config(format!("window of {} samples doesn't match oscillator of {}", window.len(), osc.len())));
		}
		let wiped:Vec<Complex<f64>> = mixer::apply(window, osc);
		let response = filter.apply(&wiped)?;
		for (a, c) in acc.iter_mut().zip(response.correlation_time_domain.iter()) {
			*a += c.norm();
		}
	}

	Ok(acc)
}

/// Index and value of the first maximum
pub fn peak(acc:&[f64]) -> (usize, f64) {
	let mut best:(usize, f64) = (0, std::f64::NEG_INFINITY);
	for (idx, val) in acc.iter().enumerate() {
		if *val > best.1 {
			best = (idx, *val);
		}
	}
	best
}
