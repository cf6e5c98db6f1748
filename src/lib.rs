
use thiserror::Error;

pub mod filters;
pub mod fourier_analysis;
pub mod io;
pub mod gnss;
pub mod mixer;
pub mod types;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DigSigProcErr {
	#[error("I/O error: {0}")]
	Io(String),
	#[error("configuration error: {0}")]
	Config(String),
	#[error("numeric error: {0}")]
	Numeric(String),
	#[error("worker failure: {0}")]
	Worker(String),
	#[error("cancelled after a fatal configuration error")]
	Cancelled,
}

impl DigSigProcErr {

	// IO and configuration problems stop the whole run; everything else is scoped to one PRN
	pub fn is_fatal(&self) -> bool {
		match self {
			Self::Io(_) | Self::Config(_) => true,
			_ => false,
		}
	}

}

impl From<std::io::Error> for DigSigProcErr {
	fn from(e:std::io::Error) -> Self { DigSigProcErr::Io(e.to_string()) }
}
