
use std::str::FromStr;

use crate::DigSigProcErr;

use self::common::acquisition::SignalProfile;

/// Code replica generation shared by every signal
pub mod code;

/// This module contains functionality common to all signals: conditioning, the acquisition search, and dispatch
pub mod common;

pub mod galileo_e5b;
pub mod gps_l2c;

/// Signals the acquisition engine knows how to search for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
	GpsL2cm,
	GalileoE5bq,
}

impl Signal {

	pub fn name(&self) -> &'static str { match self {
		Signal::GpsL2cm     => "gps-l2cm",
		Signal::GalileoE5bq => "galileo-e5bq",
	}}

	/// Built-in profile for this signal
	pub fn profile(&self) -> SignalProfile { match self {
		Signal::GpsL2cm     => gps_l2c::cm_profile(),
		Signal::GalileoE5bq => galileo_e5b::e5bq_profile(),
	}}

}

impl FromStr for Signal {
	type Err = DigSigProcErr;

	fn from_str(s:&str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"gps-l2cm" | "l2cm"         => Ok(Signal::GpsL2cm),
			"galileo-e5bq" | "e5bq"     => Ok(Signal::GalileoE5bq),
			other => Err(DigSigProcErr::Config(format!("unknown signal type '{}' (expected gps-l2cm or galileo-e5bq)", other))),
		}
	}
}
