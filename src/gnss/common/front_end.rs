
use log::debug;

use crate::DigSigProcErr;
use crate::filters::resample::Resampler;
use crate::io::SampleSource;
use crate::mixer;
use crate::types::SampleBuffer;

use super::acquisition::SignalProfile;

/// Read the profile's capture window from the source, move the signal's nominal carrier to zero, and resample to
/// the processing rate.  The result has exactly `profile.conditioned_len()` samples.
pub fn condition<S: SampleSource>(src:&mut S, carrier_offset_hz:f64, profile:&SignalProfile) -> Result<SampleBuffer, DigSigProcErr> {
	profile.validate()?;
	if !carrier_offset_hz.is_finite() {
		return Err(DigSigProcErr::Config(format!("carrier offset must be finite, got {}", carrier_offset_hz)));
	}

	let fs_in:f64 = src.fs();
	let skip_len:usize = profile.skip_len(fs_in);
	let capture_len:usize = profile.capture_len(fs_in);
	debug!("{}: skipping {} and reading {} samples at {} [samples/sec]", profile.name, skip_len, capture_len, fs_in);

	src.skip(skip_len)?;
	let mut samples = src.read(capture_len)?.into_samples();
	mixer::mix(&mut samples, -carrier_offset_hz / fs_in, 0.0);
	let shifted = SampleBuffer::new(samples, fs_in)?;

	let resampler = Resampler::new(profile.fs, profile.cutoff_hz, profile.filter_taps)?;
	let conditioned = resampler.apply_with_len(&shifted, profile.conditioned_len())?;
	debug!("{}: conditioned {} samples at {} [samples/sec]", profile.name, conditioned.len(), conditioned.fs());

	Ok(conditioned)
}
