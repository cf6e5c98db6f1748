use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use rustfft::num_complex::Complex;

use crate::DigSigProcErr;
use crate::gnss::code::{self, CodeReplicaGenerator, MemoryCode};
use crate::gnss::common::acquisition::{Padding, SignalProfile};

pub const E5B_CARRIER_HZ:f64 = 1207.14e6;
pub const E5B_CHIP_RATE:f64 = 10.23e6;
pub const E5BQ_CODE_LENGTH:usize = 10230;

// Feedback polynomials of the two 14-stage base registers, octal; bit b set means stage b-1 feeds back
const E5BQ_REG1_POLY:u32 = 0o43143;
const E5BQ_REG2_POLY:u32 = 0o62671;
const REG_MASK:u32 = 0x3FFF;

/// Output of one base register over `len` chips.  Bit j of `state` is stage j; stage 13 is the output and the
/// feedback enters at stage 0.
fn register_sequence(poly:u32, start:u32, len:usize) -> Vec<bool> {
	let taps:u32 = (poly >> 1) & REG_MASK;
	let mut state:u32 = start & REG_MASK;

	(0..len).map(|_| {
		let out:bool = (state >> 13) & 1 == 1;
		let feedback:u32 = (state & taps).count_ones() & 1;
		state = ((state << 1) | feedback) & REG_MASK;
		out
	}).collect()
}

/// E5b-Q primary code chips (logic levels) for a register 2 start value; register 1 always starts at all ones
pub fn e5bq_chips(reg2_start:u32) -> Vec<bool> {
	let reg1 = register_sequence(E5BQ_REG1_POLY, REG_MASK, E5BQ_CODE_LENGTH);
	let reg2 = register_sequence(E5BQ_REG2_POLY, reg2_start, E5BQ_CODE_LENGTH);
	reg1.iter().zip(reg2.iter()).map(|(a, b)| a ^ b).collect()
}

/// E5b-Q primary codes generated from the two base registers.  Only register 2's start value differs between
/// satellites; the start values are loaded per PRN, most significant bit in the stage that's output first.
#[derive(Debug, Clone)]
pub struct E5bqCode {
	reg2_starts: BTreeMap<usize, u32>,
}

impl E5bqCode {

	pub fn new(reg2_starts:BTreeMap<usize, u32>) -> Result<Self, DigSigProcErr> {
		if reg2_starts.is_empty() {
			return Err(DigSigProcErr::Config("no E5b-Q start values".to_string()));
		}
		for (prn, start) in reg2_starts.iter() {
			if *start == 0 || *start > REG_MASK {
				return Err(DigSigProcErr::Config(format!("PRN {} start value {:o} isn't a nonzero 14-bit value", prn, start)));
			}
		}
		Ok(Self{ reg2_starts })
	}

	/// One `<prn> <octal start value>` pair per line; blank lines and '#' comments are ignored
	pub fn parse_start_values(text:&str) -> Result<Self, DigSigProcErr> {
		let line_re = Regex::new(r"^\s*(\d+)\s+([0-7]{1,5})\s*$").map_err(|e| DigSigProcErr::Config(e.to_string()))?;
		let mut starts:BTreeMap<usize, u32> = BTreeMap::new();

		for (line_idx, line) in text.lines().enumerate() {
			let trimmed = line.trim();
			if trimmed.is_empty() || trimmed.starts_with('#') { continue; }

			let caps = line_re.captures(trimmed).ok_or_else(|| DigSigProcErr::Config(
				format!("line {} isn't a '<prn> <octal>' pair", line_idx + 1)))?;
			let prn:usize = caps[1].parse().map_err(|_| DigSigProcErr::Config(format!("bad PRN on line {}", line_idx + 1)))?;
			let start:u32 = u32::from_str_radix(&caps[2], 8).map_err(|_| DigSigProcErr::Config(format!("bad start value on line {}", line_idx + 1)))?;

			if starts.insert(prn, start).is_some() {
				return Err(DigSigProcErr::Config(format!("PRN {} appears more than once", prn)));
			}
		}

		Self::new(starts)
	}

}

impl CodeReplicaGenerator for E5bqCode {

	fn code_length(&self) -> usize { E5BQ_CODE_LENGTH }

	fn prns(&self) -> Vec<usize> { self.reg2_starts.keys().cloned().collect() }

	fn generate(&self, prn:usize, phase_chips:f64, len:usize) -> Result<Vec<Complex<f64>>, DigSigProcErr> {
		let start:u32 = *self.reg2_starts.get(&prn).ok_or_else(|| DigSigProcErr::Config(format!("no E5b-Q start value for PRN {}", prn)))?;

		// Logic 0 maps to +1 and logic 1 to -1
		let inverted:Vec<bool> = e5bq_chips(start).iter().map(|b| !b).collect();
		Ok(code::sample_chips(&inverted, phase_chips, len, 1.0))
	}

}

/// E5b-Q codes from a table that's either register 2 start values (`<prn> <octal>`) or full primary codes
/// (`<prn> <hex>`, as printed in the ICD annex)
pub fn e5bq_code_table(text:&str) -> Result<Arc<dyn CodeReplicaGenerator>, DigSigProcErr> {
	match E5bqCode::parse_start_values(text) {
		Ok(generated) => Ok(Arc::new(generated)),
		Err(_)        => Ok(Arc::new(MemoryCode::parse_hex(text, E5BQ_CODE_LENGTH)?)),
	}
}

pub fn e5bq_codes<P: AsRef<Path>>(path:P) -> Result<Arc<dyn CodeReplicaGenerator>, DigSigProcErr> {
	let text = fs::read_to_string(path.as_ref())
		.map_err(|e| DigSigProcErr::Io(format!("unable to read code file {}: {}", path.as_ref().display(), e)))?;
	e5bq_code_table(&text)
}

/// 85 ms of capture (after skipping the first 0.75 ms) resampled to 3 samples per chip; 1 ms blocks hold
/// exactly one primary code period, so no padding, and ten incoherent sums
pub fn e5bq_profile() -> SignalProfile {
	SignalProfile {
		name: "galileo-e5bq".to_string(),
		code_length: E5BQ_CODE_LENGTH,
		chip_rate: E5B_CHIP_RATE,
		carrier_hz: E5B_CARRIER_HZ,
		fs: 3.0 * E5B_CHIP_RATE,
		block_len: 3 * E5BQ_CODE_LENGTH,
		doppler_min_hz: -4000.0,
		doppler_max_hz: 4000.0,
		doppler_step_hz: 100.0,
		coherent_blocks: 10,
		padding: Padding::None,
		capture_sec: 0.085,
		skip_sec: 0.00075,
		cutoff_hz: 9.0e6,
		filter_taps: 161,
	}
}
