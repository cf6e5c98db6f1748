use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::DigSigProcErr;
use crate::types::SampleBuffer;

/// How each coherent block is correlated against the replica
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
	/// The block holds exactly one code period; transform length equals the block length
	None,
	/// Replica followed by one block of zeros; windows are two blocks long and advance by one block
	ZeroPadded,
}

/// Everything the search engine needs to know about one signal type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalProfile {
	pub name: String,
	pub code_length: usize,
	pub chip_rate: f64,
	pub carrier_hz: f64,
	/// Processing rate of the conditioned buffer [samples/sec]
	pub fs: f64,
	pub block_len: usize,
	pub doppler_min_hz: f64,
	pub doppler_max_hz: f64,
	pub doppler_step_hz: f64,
	pub coherent_blocks: usize,
	pub padding: Padding,
	pub capture_sec: f64,
	pub skip_sec: f64,
	pub cutoff_hz: f64,
	pub filter_taps: usize,
}

impl SignalProfile {

	pub fn from_json(text:&str) -> Result<Self, DigSigProcErr> {
		let profile:SignalProfile = serde_json::from_str(text).map_err(|e| DigSigProcErr::Config(format!("bad signal profile: {}", e)))?;
		profile.validate()?;
		Ok(profile)
	}

	pub fn load<P: AsRef<Path>>(path:P) -> Result<Self, DigSigProcErr> {
		let text = fs::read_to_string(path.as_ref())
			.map_err(|e| DigSigProcErr::Io(format!("unable to read profile {}: {}", path.as_ref().display(), e)))?;
		Self::from_json(&text)
	}

	pub fn validate(&self) -> Result<(), DigSigProcErr> {
		let positive = |x:f64| x.is_finite() && x > 0.0;
		let err = |msg:String| -> Result<(), DigSigProcErr> { Err(DigSigProcErr::Config(format!("{}: {}", self.name, msg))) };

		if self.code_length == 0 { return err("code length must be positive".to_string()); }
		if !positive(self.fs) { return err(format!("processing rate must be positive, got {}", self.fs)); }
		if !positive(self.chip_rate) || !positive(self.carrier_hz) { return err("chip rate and carrier must be positive".to_string()); }
		if self.block_len == 0 { return err("block length must be positive".to_string()); }
		if self.coherent_blocks == 0 { return err("at least one coherent block is needed".to_string()); }
		if !positive(self.doppler_step_hz) { return err(format!("Doppler step must be positive, got {}", self.doppler_step_hz)); }
		if !(self.doppler_min_hz.is_finite() && self.doppler_max_hz.is_finite()) || self.doppler_max_hz <= self.doppler_min_hz {
			return err(format!("empty Doppler grid [{}, {})", self.doppler_min_hz, self.doppler_max_hz));
		}
		if !positive(self.capture_sec) || !(self.skip_sec.is_finite() && self.skip_sec >= 0.0) {
			return err("capture span must be positive and skip span non-negative".to_string());
		}
		if self.filter_taps == 0 || !(self.cutoff_hz > 0.0 && self.cutoff_hz < 0.5*self.fs) {
			return err(format!("anti-alias filter ({} taps, {} [Hz]) doesn't fit below fs/2", self.filter_taps, self.cutoff_hz));
		}
		if self.conditioned_len() < self.required_len() {
			return err(format!("capture of {} samples is shorter than the {} samples the search reads",
				self.conditioned_len(), self.required_len()));
		}

		Ok(())
	}

	/// Ascending grid min, min+step, ... stopping before max
	pub fn doppler_bins(&self) -> Vec<f64> {
		let mut bins:Vec<f64> = vec![];
		let mut i:usize = 0;
		loop {
			let d:f64 = self.doppler_min_hz + (i as f64)*self.doppler_step_hz;
			if !(d < self.doppler_max_hz) { break; }
			bins.push(d);
			i += 1;
		}
		bins
	}

	/// Length of each correlation window, which is also the transform and accumulator length
	pub fn window_len(&self) -> usize { match self.padding {
		Padding::None       => self.block_len,
		Padding::ZeroPadded => 2*self.block_len,
	}}

	/// Samples of conditioned buffer the search reads; windows start one block apart
	pub fn required_len(&self) -> usize {
		(self.coherent_blocks - 1)*self.block_len + self.window_len()
	}

	/// Length of the buffer the front end produces at the processing rate
	pub fn conditioned_len(&self) -> usize { (self.capture_sec * self.fs).round() as usize }

	/// Raw samples to read at the capture rate
	pub fn capture_len(&self, fs_in:f64) -> usize { (self.capture_sec * fs_in) as usize }

	/// Raw samples to discard at the start of the capture
	pub fn skip_len(&self, fs_in:f64) -> usize { (self.skip_sec * fs_in) as usize }

	/// Correlation lag (in samples) to code phase in chips
	pub fn code_phase_chips(&self, idx:usize) -> f64 {
		// Integer product first so lags that fall on a chip boundary give a whole number of chips
		let chips:f64 = ((self.code_length * idx) as f64) / (self.block_len as f64);
		chips % (self.code_length as f64)
	}

	/// The replica is always generated at the nominal chip rate.  Over the span the search reads, a Doppler of
	/// fd stretches the received code by span * fd / carrier seconds; this is that error in chips at the edge
	/// of the grid.
	pub fn max_code_drift_chips(&self) -> f64 {
		let span_sec:f64 = (self.required_len() as f64) / self.fs;
		let max_doppler_hz:f64 = self.doppler_min_hz.abs().max(self.doppler_max_hz.abs());
		span_sec * (max_doppler_hz / self.carrier_hz) * self.chip_rate
	}

	pub fn check_buffer(&self, buffer:&SampleBuffer) -> Result<(), DigSigProcErr> {
		if (buffer.fs() - self.fs).abs() > 1e-9 * self.fs {
			return Err(DigSigProcErr::Config(format!("{}: buffer is at {} [samples/sec], search expects {}",
				self.name, buffer.fs(), self.fs)));
		}
		if buffer.len() < self.required_len() {
			return Err(DigSigProcErr::Config(format!("{}: buffer holds {} samples, search needs {}",
				self.name, buffer.len(), self.required_len())));
		}
		Ok(())
	}

}
