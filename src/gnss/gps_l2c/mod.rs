use rustfft::num_complex::Complex;

use crate::DigSigProcErr;
use crate::gnss::code::{self, CodeReplicaGenerator};
use crate::gnss::common::acquisition::{Padding, SignalProfile};

pub const L2_CM_PERIOD_SEC:f64 = 20.0e-3;
pub const L2_CM_CHIP_RATE:f64 = 511.5e3;
pub const L2_CARRIER_HZ:f64 = 1227.6e6;

pub mod signal_modulation;

/// L2 CM replica.  CM and CL are multiplexed chip by chip at 1.023 Mcps, so only the first half of each
/// CM chip period carries CM; the CL half is left at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmCode;

impl CodeReplicaGenerator for CmCode {

	fn code_length(&self) -> usize { signal_modulation::CM_CODE_LENGTH }

	fn prns(&self) -> Vec<usize> { (1..=32).collect() }

	fn generate(&self, prn:usize, phase_chips:f64, len:usize) -> Result<Vec<Complex<f64>>, DigSigProcErr> {
		let chips = signal_modulation::cm_code(prn)?;
		Ok(code::sample_chips(&chips, phase_chips, len, 0.5))
	}

}

/// 75 ms of capture resampled to 4.096 MHz; 20 ms coherent blocks (one full CM period) correlated with a
/// zero-padded replica over 50%-overlapping double-length windows, two incoherent sums
pub fn cm_profile() -> SignalProfile {
	SignalProfile {
		name: "gps-l2cm".to_string(),
		code_length: signal_modulation::CM_CODE_LENGTH,
		chip_rate: L2_CM_CHIP_RATE,
		carrier_hz: L2_CARRIER_HZ,
		fs: 4.096e6,
		block_len: 81920,
		doppler_min_hz: -7000.0,
		doppler_max_hz: 7000.0,
		doppler_step_hz: 20.0,
		coherent_blocks: 2,
		padding: Padding::ZeroPadded,
		capture_sec: 0.075,
		skip_sec: 0.0,
		cutoff_hz: 1.5e6,
		filter_taps: 161,
	}
}
