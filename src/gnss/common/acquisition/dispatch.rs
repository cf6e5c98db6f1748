
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinHandle};

use crate::DigSigProcErr;
use crate::gnss::code::CodeReplicaGenerator;
use crate::types::SampleBuffer;

use super::{basic_pcps, AcquisitionResult, SignalProfile};

/// What happened to one PRN; a failure here doesn't affect the other PRNs
#[derive(Debug, Clone, PartialEq)]
pub struct PrnOutcome {
	pub prn: usize,
	pub result: Result<AcquisitionResult, DigSigProcErr>,
}

pub fn default_workers() -> usize {
	std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Everything about a request that would fail every PRN, checked before any samples are touched.  Returns
/// the PRNs to search, ascending with duplicates removed.
pub fn check_request(profile:&SignalProfile, codes:&dyn CodeReplicaGenerator, prns:&[usize], workers:usize) -> Result<Vec<usize>, DigSigProcErr> {
	if workers == 0 {
		return Err(DigSigProcErr::Config("at least one worker is needed".to_string()));
	}
	if prns.is_empty() {
		return Err(DigSigProcErr::Config("no PRNs to search".to_string()));
	}
	profile.validate()?;
	if codes.code_length() != profile.code_length {
		return Err(DigSigProcErr::Config(format!("{}: code generator has {} chips per period, profile expects {}",
			profile.name, codes.code_length(), profile.code_length)));
	}

	let mut prns:Vec<usize> = prns.to_vec();
	prns.sort_unstable();
	prns.dedup();

	let available:Vec<usize> = codes.prns();
	if let Some(missing) = prns.iter().find(|prn| !available.contains(*prn)) {
		return Err(DigSigProcErr::Config(format!("{}: no code for PRN {}", profile.name, missing)));
	}

	Ok(prns)
}

/// Search every PRN in `prns` against the same buffer, at most `workers` at a time.  Configuration problems
/// that would fail every PRN are reported up front as an error; anything that goes wrong after that is
/// captured in the affected PRN's outcome.  Outcomes come back ordered by PRN with duplicates removed.
pub async fn dispatch(buffer:Arc<SampleBuffer>, profile:Arc<SignalProfile>, codes:Arc<dyn CodeReplicaGenerator>,
	prns:&[usize], workers:usize) -> Result<Vec<PrnOutcome>, DigSigProcErr> {

	let prns:Vec<usize> = check_request(&profile, codes.as_ref(), prns, workers)?;
	profile.check_buffer(&buffer)?;

	debug!("{}: {} PRNs on {} workers, {} Doppler bins, uncompensated code drift up to {:.3} chips",
		profile.name, prns.len(), workers, profile.doppler_bins().len(), profile.max_code_drift_chips());

	let sem = Arc::new(Semaphore::new(workers));
	let cancel = Arc::new(AtomicBool::new(false));

	let handles:Vec<(usize, JoinHandle<Result<AcquisitionResult, DigSigProcErr>>)> = prns.iter().map(|&prn| {
		let buffer  = buffer.clone();
		let profile = profile.clone();
		let codes   = codes.clone();
		let sem     = sem.clone();
		let cancel  = cancel.clone();

		let handle = tokio::spawn(async move {
			let _permit = sem.acquire().await;
			if cancel.load(Ordering::SeqCst) {
				return Err(DigSigProcErr::Cancelled);
			}

			let result = task::spawn_blocking(move || basic_pcps::search(&buffer, &profile, codes.as_ref(), prn)).await
				.unwrap_or_else(|e| Err(DigSigProcErr::Worker(format!("search for PRN {} didn't finish: {}", prn, e))));

			if let Err(e) = &result {
				if e.is_fatal() { cancel.store(true, Ordering::SeqCst); }
			}
			result
		});

		(prn, handle)
	}).collect();

	let mut outcomes:Vec<PrnOutcome> = Vec::with_capacity(handles.len());
	for (prn, handle) in handles {
		let result = handle.await
			.unwrap_or_else(|e| Err(DigSigProcErr::Worker(format!("task for PRN {} didn't finish: {}", prn, e))));

		match &result {
			Ok(r)  => info!("PRN {}: {:.1} [Hz], {:.1} chips, metric {:.1}", prn, r.doppler_hz, r.code_phase_chips, r.metric),
			Err(e) => warn!("PRN {}: {}", prn, e),
		}
		outcomes.push(PrnOutcome{ prn, result });
	}

	Ok(outcomes)
}
