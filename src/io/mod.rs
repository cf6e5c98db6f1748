use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use num_complex::Complex;

use crate::DigSigProcErr;
use crate::types::SampleBuffer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleFormat {
	/// Interleaved I/Q, 8-bit signed (two's complement)
	ComplexI8,
	/// Interleaved I/Q, 16-bit signed little endian
	ComplexI16,
}

impl SampleFormat {

	pub fn bytes_per_sample(&self) -> usize { match self {
		SampleFormat::ComplexI8  => 2,
		SampleFormat::ComplexI16 => 4,
	}}

	fn decode(&self, raw:&[u8]) -> Vec<Complex<f64>> { match self {
		SampleFormat::ComplexI8  => raw.chunks_exact(2)
			.map(|b| Complex{ re: (b[0] as i8) as f64, im: (b[1] as i8) as f64 })
			.collect(),
		SampleFormat::ComplexI16 => raw.chunks_exact(4)
			.map(|b| Complex{ re: LittleEndian::read_i16(&b[0..2]) as f64, im: LittleEndian::read_i16(&b[2..4]) as f64 })
			.collect(),
	}}

}

pub trait SampleSource {
	fn fs(&self) -> f64;
	fn skip(&mut self, count:usize) -> Result<(), DigSigProcErr>;
	fn read(&mut self, count:usize) -> Result<SampleBuffer, DigSigProcErr>;
}

/// Reads raw interleaved I/Q from anything that implements Read (a file, stdin, a byte slice in tests)
pub struct InterleavedSource<S: Read> {
	src: S,
	fmt: SampleFormat,
	fs: f64,
	idx: usize,
}

impl<S: Read> InterleavedSource<S> {

	pub fn new(src:S, fmt:SampleFormat, fs:f64) -> Result<Self, DigSigProcErr> {
		if !(fs.is_finite() && fs > 0.0) {
			return Err(DigSigProcErr::Config(format!("sample rate must be positive, got {}", fs)));
		}
		Ok(Self{ src, fmt, fs, idx: 0 })
	}

	/// Index of the next sample that will be read, counted from the start of the capture
	pub fn position(&self) -> usize { self.idx }

	fn read_bytes(&mut self, count:usize) -> Result<Vec<u8>, DigSigProcErr> {
		let n_bytes:usize = count * self.fmt.bytes_per_sample();
		let mut raw:Vec<u8> = Vec::with_capacity(n_bytes);
		(&mut self.src).take(n_bytes as u64).read_to_end(&mut raw)?;

		if raw.len() < n_bytes {
			let available:usize = raw.len() / self.fmt.bytes_per_sample();
			Err(DigSigProcErr::Io(format!("capture ended after {} of {} requested samples (starting at sample {})",
				available, count, self.idx)))
		} else {
			self.idx += count;
			Ok(raw)
		}
	}

}

impl<S: Read> SampleSource for InterleavedSource<S> {

	fn fs(&self) -> f64 { self.fs }

	fn skip(&mut self, count:usize) -> Result<(), DigSigProcErr> {
		self.read_bytes(count).map(|_| ())
	}

	fn read(&mut self, count:usize) -> Result<SampleBuffer, DigSigProcErr> {
		let raw = self.read_bytes(count)?;
		SampleBuffer::new(self.fmt.decode(&raw), self.fs)
	}

}
