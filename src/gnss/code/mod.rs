
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use rustfft::num_complex::Complex;

use crate::DigSigProcErr;

/// Source of local code replicas for one signal type
pub trait CodeReplicaGenerator: Send + Sync {

	/// Length of one code period in chips
	fn code_length(&self) -> usize;

	/// PRNs this generator can produce, ascending
	fn prns(&self) -> Vec<usize>;

	/// `len` samples of the code for `prn`, starting at `phase_chips` and stepping code_length/len chips per
	/// sample, so the result always spans exactly one code period
	fn generate(&self, prn:usize, phase_chips:f64, len:usize) -> Result<Vec<Complex<f64>>, DigSigProcErr>;

}

/// Sample a chip sequence onto `len` points covering one period.  Within each chip, only the first `duty`
/// fraction carries the chip value and the remainder is zero (1.0 for an ordinary BPSK code).
pub fn sample_chips(chips:&[bool], phase_chips:f64, len:usize, duty:f64) -> Vec<Complex<f64>> {
	let code_length:f64 = chips.len() as f64;

	(0..len).map(|i| {
		// Integer product first so whole-chip positions land exactly on the chip boundary
		let pos:f64 = phase_chips + ((i * chips.len()) as f64) / (len as f64);
		let pos:f64 = pos.rem_euclid(code_length);
		let chip_idx:usize = (pos.floor() as usize).min(chips.len() - 1);
		let frac:f64 = pos - pos.floor();

		let val:f64 = if frac >= duty { 0.0 } else if chips[chip_idx] { 1.0 } else { -1.0 };
		Complex{ re: val, im: 0.0 }
	}).collect()
}

/// Codes held in memory, one chip table per PRN.  Logic 0 maps to +1 and logic 1 to -1.
#[derive(Debug, Clone)]
pub struct MemoryCode {
	code_length: usize,
	codes: BTreeMap<usize, Vec<bool>>,
}

impl MemoryCode {

	pub fn new(code_length:usize, codes:BTreeMap<usize, Vec<bool>>) -> Result<Self, DigSigProcErr> {
		if code_length == 0 {
			return Err(DigSigProcErr::Config("code length must be positive".to_string()));
		}
		for (prn, code) in codes.iter() {
			if code.len() != code_length {
				return Err(DigSigProcErr::Config(format!("PRN {} has {} chips, expected {}", prn, code.len(), code_length)));
			}
		}
		Ok(Self{ code_length, codes })
	}

	/// Parse primary codes given as hexadecimal strings, one `<prn> <hex>` pair per line, most significant bit
	/// first.  Blank lines and lines starting with '#' are ignored; trailing bits past the code length are dropped.
	pub fn parse_hex(text:&str, code_length:usize) -> Result<Self, DigSigProcErr> {
		let line_re = Regex::new(r"^\s*(\d+)\s+([0-9A-Fa-f]+)\s*$").map_err(|e| DigSigProcErr::Config(e.to_string()))?;
		let mut codes:BTreeMap<usize, Vec<bool>> = BTreeMap::new();

		for (line_idx, line) in text.lines().enumerate() {
			let trimmed = line.trim();
			if trimmed.is_empty() || trimmed.starts_with('#') { continue; }

			let caps = line_re.captures(trimmed).ok_or_else(|| DigSigProcErr::Config(
				format!("line {} of code file isn't a '<prn> <hex>' pair", line_idx + 1)))?;

			let prn:usize = caps[1].parse().map_err(|_| DigSigProcErr::Config(format!("bad PRN on line {}", line_idx + 1)))?;
			let bits:Vec<bool> = hex_to_bits(&caps[2]);
			if bits.len() < code_length {
				return Err(DigSigProcErr::Config(format!("PRN {} code has only {} bits, expected {}", prn, bits.len(), code_length)));
			}
			if codes.insert(prn, bits[..code_length].to_vec()).is_some() {
				return Err(DigSigProcErr::Config(format!("PRN {} appears more than once in code file", prn)));
			}
		}

		if codes.is_empty() {
			return Err(DigSigProcErr::Config("code file doesn't contain any codes".to_string()));
		}

		Self::new(code_length, codes)
	}

	pub fn from_hex_file<P: AsRef<Path>>(path:P, code_length:usize) -> Result<Self, DigSigProcErr> {
		let text = fs::read_to_string(path.as_ref())
			.map_err(|e| DigSigProcErr::Io(format!("unable to read code file {}: {}", path.as_ref().display(), e)))?;
		Self::parse_hex(&text, code_length)
	}

	pub fn chips(&self, prn:usize) -> Option<&[bool]> {
		self.codes.get(&prn).map(|c| c.as_slice())
	}

}

impl CodeReplicaGenerator for MemoryCode {

	fn code_length(&self) -> usize { self.code_length }

	fn prns(&self) -> Vec<usize> { self.codes.keys().cloned().collect() }

	fn generate(&self, prn:usize, phase_chips:f64, len:usize) -> Result<Vec<Complex<f64>>, DigSigProcErr> {
		let chips = self.chips(prn).ok_or_else(|| DigSigProcErr::Config(format!("no code loaded for PRN {}", prn)))?;

		// sample_chips maps true to +1, so invert to get 0 -> +1, 1 -> -1
		let inverted:Vec<bool> = chips.iter().map(|b| !b).collect();
		Ok(sample_chips(&inverted, phase_chips, len, 1.0))
	}

}

fn hex_to_bits(hex:&str) -> Vec<bool> {
	hex.chars().filter_map(|c| c.to_digit(16)).flat_map(|d| (0..4).rev().map(move |b| (d >> b) & 1 == 1)).collect()
}
