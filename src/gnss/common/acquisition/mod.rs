
use serde::{Serialize, Deserialize};

pub mod basic_pcps;
pub mod dispatch;
mod profile;

pub use self::profile::{Padding, SignalProfile};

#[cfg(test)]
mod tests;

/// Best hypothesis for one PRN over the whole Doppler/code-phase grid.  The metric is the peak of the
/// incoherently summed correlation magnitude; it is not normalized and no threshold is applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionResult {
	pub metric: f64,
	pub code_phase_chips: f64,
	pub doppler_hz: f64,
}
