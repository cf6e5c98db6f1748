
use std::collections::BTreeMap;
use std::f64::consts;

use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use rustfft::num_complex::Complex;

use crate::DigSigProcErr;
use crate::filters::matched_filter::MatchedFilter;
use crate::gnss::code::{CodeReplicaGenerator, MemoryCode};
use crate::gnss::gps_l2c::signal_modulation;
use crate::mixer;
use crate::types::SampleBuffer;

use super::basic_pcps::{self, Acquisition};
use super::{Padding, SignalProfile};

pub(super) const FS:f64 = 2.046e6;
const CODE_LENGTH:usize = 1023;
pub(super) const BLOCK_LEN:usize = 2046;

pub(super) fn random_codes(seed:u64) -> MemoryCode {
	let mut rng = StdRng::seed_from_u64(seed);
	let mut codes:BTreeMap<usize, Vec<bool>> = BTreeMap::new();
	for prn in 1..=3 {
		codes.insert(prn, (0..CODE_LENGTH).map(|_| rng.gen::<bool>()).collect());
	}
	MemoryCode::new(CODE_LENGTH, codes).unwrap()
}

pub(super) fn test_profile(padding:Padding, coherent_blocks:usize, doppler_min_hz:f64, doppler_max_hz:f64, doppler_step_hz:f64) -> SignalProfile {
	let mut profile = SignalProfile {
		name: "test".to_string(),
		code_length: CODE_LENGTH,
		chip_rate: 1.023e6,
		carrier_hz: 1575.42e6,
		fs: FS,
		block_len: BLOCK_LEN,
		doppler_min_hz,
		doppler_max_hz,
		doppler_step_hz,
		coherent_blocks,
		padding,
		capture_sec: 0.0,
		skip_sec: 0.0,
		cutoff_hz: 0.4*FS,
		filter_taps: 31,
	};
	profile.capture_sec = (profile.required_len() as f64) / FS;
	profile.validate().unwrap();
	profile
}

/// The code for `prn` delayed by `delay` samples on a carrier at `doppler_hz`.  When `flip_each_period` is set,
/// the sign alternates from one code period to the next the way a data bit or overlay code would.
pub(super) fn synth_signal(codes:&MemoryCode, prn:usize, delay:usize, doppler_hz:f64, amplitude:f64, len:usize, flip_each_period:bool) -> Vec<Complex<f64>> {
	let replica = codes.generate(prn, 0.0, BLOCK_LEN).unwrap();
	let carrier = mixer::oscillator(doppler_hz / FS, 0.3, len);

	(0..len).map(|n| {
		let t:i64 = (n as i64) - (delay as i64);
		let period:i64 = t.div_euclid(BLOCK_LEN as i64);
		let sign:f64 = if flip_each_period && period.rem_euclid(2) == 1 { -1.0 } else { 1.0 };
		replica[t.rem_euclid(BLOCK_LEN as i64) as usize] * carrier[n] * (sign * amplitude)
	}).collect()
}

fn add_noise(x:&mut [Complex<f64>], sigma:f64, rng:&mut StdRng) {
	let normal = Normal::new(0.0, sigma).unwrap();
	for s in x.iter_mut() {
		*s += Complex{ re: normal.sample(rng), im: normal.sample(rng) };
	}
}

fn chip_error(a:f64, b:f64) -> f64 {
	let diff:f64 = (a - b).rem_euclid(CODE_LENGTH as f64);
	diff.min((CODE_LENGTH as f64) - diff)
}

#[test]
fn noiseless_signal_gives_exact_hypothesis() {
	let codes = random_codes(1);
	let profile = test_profile(Padding::None, 4, -2000.0, 2000.0, 250.0);
	let samples = synth_signal(&codes, 2, 700, 750.0, 1.0, profile.required_len(), false);
	let buffer = SampleBuffer::new(samples, FS).unwrap();

	let result = basic_pcps::search(&buffer, &profile, &codes, 2).unwrap();
	assert_eq!(result.doppler_hz, 750.0);
	assert_eq!(result.code_phase_chips, 350.0);

	// Each block contributes the full code energy
	let expected:f64 = 4.0 * (BLOCK_LEN as f64);
	assert!((result.metric - expected).abs() < 1e-6 * expected, "metric {}", result.metric);
}

#[test]
fn injected_code_is_recovered() {
	let codes = random_codes(2);
	let profile = test_profile(Padding::None, 4, -2000.0, 2000.0, 250.0);
	let truth_doppler_hz:f64 = 750.0;

	let mut hits:usize = 0;
	for seed in 0..20 {
		let mut rng = StdRng::seed_from_u64(100 + seed);
		let delay:usize = 2*rng.gen_range(0, CODE_LENGTH);
		let mut samples = synth_signal(&codes, 1, delay, truth_doppler_hz, 1.0, profile.required_len(), false);
		add_noise(&mut samples, 3.0, &mut rng);
		let buffer = SampleBuffer::new(samples, FS).unwrap();

		let result = basic_pcps::search(&buffer, &profile, &codes, 1).unwrap();
		let truth_chips:f64 = (delay as f64) / 2.0;
		if (result.doppler_hz - truth_doppler_hz).abs() <= profile.doppler_step_hz && chip_error(result.code_phase_chips, truth_chips) <= 1.0 {
			hits += 1;
		}
	}

	assert!(hits >= 19, "only {} of 20 trials recovered the code", hits);
}

#[test]
fn pure_noise_rarely_exceeds_analytic_threshold() {
	let codes = random_codes(3);
	let profile = test_profile(Padding::None, 2, -500.0, 500.0, 200.0);
	let sigma:f64 = 1.0;

	// Each lag of each block is Rayleigh with scale sigma*sqrt(replica energy); the accumulator is a sum of
	// coherent_blocks independent draws
	let m:f64 = profile.coherent_blocks as f64;
	let scale:f64 = sigma * (BLOCK_LEN as f64).sqrt();
	let mean:f64 = m * scale * (consts::PI / 2.0).sqrt();
	let std_dev:f64 = (m * (4.0 - consts::PI) / 2.0).sqrt() * scale;
	let threshold:f64 = mean + 8.0*std_dev;

	let mut exceedances:usize = 0;
	for seed in 0..20 {
		let mut rng = StdRng::seed_from_u64(200 + seed);
		let mut samples = vec![Complex{ re: 0.0, im: 0.0 }; profile.required_len()];
		add_noise(&mut samples, sigma, &mut rng);
		let buffer = SampleBuffer::new(samples, FS).unwrap();

		let result = basic_pcps::search(&buffer, &profile, &codes, 3).unwrap();
		assert!(result.metric > mean);
		if result.metric > threshold { exceedances += 1; }
	}

	assert!(exceedances <= 1, "{} of 20 noise-only searches crossed the threshold", exceedances);
}

#[test]
fn correlation_is_shift_equivariant() {
	let codes = random_codes(4);
	let replica = codes.generate(1, 0.0, BLOCK_LEN).unwrap();
	let mut filter = MatchedFilter::new(&replica);

	for k in [0usize, 1, 37, 1022, 2045].iter() {
		let mut rotated = replica.clone();
		rotated.rotate_left(*k);

		// A window that's the replica delayed by k samples peaks at lag k
		let mut delayed = replica.clone();
		delayed.rotate_right(*k);
		let mags = filter.apply(&delayed).unwrap().magnitudes();
		let (idx, _) = basic_pcps::peak(&mags);
		assert_eq!(idx, *k);

		// Rotating the replica left by k instead moves the peak of the undelayed window to k
		let mut rotated_filter = MatchedFilter::new(&rotated);
		let mags = rotated_filter.apply(&replica).unwrap().magnitudes();
		let (idx, _) = basic_pcps::peak(&mags);
		assert_eq!(idx, *k);
	}
}

#[test]
fn incoherent_sum_ignores_block_order() {
	let codes = random_codes(5);
	let replica = codes.generate(2, 0.0, BLOCK_LEN).unwrap();
	let mut filter = MatchedFilter::new(&replica);

	let mut rng = StdRng::seed_from_u64(5);
	let mut samples = synth_signal(&codes, 2, 123, -400.0, 0.5, 5*BLOCK_LEN, false);
	add_noise(&mut samples, 1.0, &mut rng);

	let osc = mixer::oscillator(400.0 / FS, 0.0, BLOCK_LEN);
	let windows:Vec<&[Complex<f64>]> = samples.chunks(BLOCK_LEN).collect();
	let mut shuffled = windows.clone();
	shuffled.shuffle(&mut rng);
	let reversed:Vec<&[Complex<f64>]> = windows.iter().rev().cloned().collect();

	let acc = basic_pcps::incoherent_sum(&mut filter, &windows, &osc).unwrap();
	for other in [shuffled, reversed].iter() {
		let acc_other = basic_pcps::incoherent_sum(&mut filter, other, &osc).unwrap();
		for (a, b) in acc.iter().zip(acc_other.iter()) {
			assert!((a - b).abs() < 1e-9 * a.abs().max(1.0));
		}
	}
}

#[test]
fn long_code_autocorrelation() {
	// One 10230-chip period at three samples per chip
	let chips = signal_modulation::cm_code(5).unwrap();
	let mut table:BTreeMap<usize, Vec<bool>> = BTreeMap::new();
	table.insert(5, chips.to_vec());
	let codes = MemoryCode::new(10230, table).unwrap();

	let replica = codes.generate(5, 0.0, 30690).unwrap();
	let mut filter = MatchedFilter::new(&replica);
	let mags = filter.apply(&replica).unwrap().magnitudes();

	let (idx, peak) = basic_pcps::peak(&mags);
	assert_eq!(idx, 0);
	assert!((peak - 30690.0).abs() < 1e-6);

	// Beyond one chip either side of zero lag, the sidelobes stay far below the peak
	let max_sidelobe:f64 = mags[3..(30690-2)].iter().cloned().fold(0.0, f64::max);
	assert!(max_sidelobe < 0.1 * peak, "sidelobe {} vs peak {}", max_sidelobe, peak);
}

#[test]
fn zero_padding_matches_linear_correlation_where_circular_aliases() {
	let codes = random_codes(6);
	let delay:usize = BLOCK_LEN / 2;
	let blocks:usize = 2;

	// Sign flips at every period boundary, so a plain block always straddles one at this delay
	let padded = test_profile(Padding::ZeroPadded, blocks, -250.0, 250.0, 250.0);
	let naive = test_profile(Padding::None, blocks, -250.0, 250.0, 250.0);
	let samples = synth_signal(&codes, 1, delay, 0.0, 1.0, padded.required_len(), true);
	let buffer = SampleBuffer::new(samples.clone(), FS).unwrap();

	// Linear ground truth for the first window, lags 0..N
	let replica = codes.generate(1, 0.0, BLOCK_LEN).unwrap();
	let truth:Vec<f64> = (0..BLOCK_LEN).map(|k| {
		replica.iter().enumerate().map(|(n, c)| samples[n+k] * c.conj()).sum::<Complex<f64>>().norm()
	}).collect();
	assert!((truth[delay] - BLOCK_LEN as f64).abs() < 1e-6);

	let mut acq = Acquisition::new(&padded, &codes, 1).unwrap();
	let hyp = acq.test_hypothesis(&buffer, 0.0).unwrap();
	assert_eq!(hyp.code_idx, delay);

	let mut filter = MatchedFilter::zero_padded(&replica, 2*BLOCK_LEN);
	let first_window = filter.apply(&samples[..2*BLOCK_LEN]).unwrap().magnitudes();
	for k in 0..BLOCK_LEN {
		assert!((first_window[k] - truth[k]).abs() < 1e-6, "lag {}: {} vs {}", k, first_window[k], truth[k]);
	}

	// Single-length circular correlation agrees at zero lag but wraps the second half of the period back
	// onto the first, so the two signs cancel at the true delay
	let mut circular = MatchedFilter::new(&replica);
	let naive_window = circular.apply(&samples[..BLOCK_LEN]).unwrap().magnitudes();
	assert!((naive_window[0] - truth[0]).abs() < 1e-6, "lag 0: {} vs {}", naive_window[0], truth[0]);
	assert!(naive_window[delay] < 1e-6 * truth[delay], "lag {}: {}", delay, naive_window[delay]);
	let worst_alias:f64 = (delay..BLOCK_LEN).map(|k| (naive_window[k] - truth[k]).abs()).fold(0.0, f64::max);
	assert!(worst_alias > 0.9 * (BLOCK_LEN as f64), "largest wrap-around error {}", worst_alias);

	let padded_result = basic_pcps::search(&buffer, &padded, &codes, 1).unwrap();
	let full_energy:f64 = (blocks * BLOCK_LEN) as f64;
	assert!((padded_result.metric - full_energy).abs() < 1e-6 * full_energy);
	assert_eq!(padded_result.doppler_hz, 0.0);

	let mut naive_acq = Acquisition::new(&naive, &codes, 1).unwrap();
	let naive_hyp = naive_acq.test_hypothesis(&buffer, 0.0).unwrap();
	assert!(naive_hyp.metric < 0.25 * full_energy, "plain-block metric {}", naive_hyp.metric);
}

#[test]
fn zero_padded_search_recovers_delays_across_the_block() {
	let codes = random_codes(10);
	let profile = test_profile(Padding::ZeroPadded, 2, -1000.0, 1000.0, 250.0);
	let truth_doppler_hz:f64 = -500.0;

	// Both ends of the lag range, where a wrapped correlation would go wrong, plus seeded delays in between
	let mut delays:Vec<usize> = vec![0, 1, 2, BLOCK_LEN/2, BLOCK_LEN - 3, BLOCK_LEN - 2, BLOCK_LEN - 1];
	let mut rng = StdRng::seed_from_u64(300);
	while delays.len() < 20 {
		delays.push(rng.gen_range(0, BLOCK_LEN));
	}

	let mut hits:usize = 0;
	for (trial, delay) in delays.iter().enumerate() {
		let mut rng = StdRng::seed_from_u64(400 + trial as u64);
		let mut samples = synth_signal(&codes, 3, *delay, truth_doppler_hz, 1.0, profile.required_len(), false);
		add_noise(&mut samples, 3.0, &mut rng);
		let buffer = SampleBuffer::new(samples, FS).unwrap();

		let result = basic_pcps::search(&buffer, &profile, &codes, 3).unwrap();
		let truth_chips:f64 = (*delay as f64) / 2.0;
		if (result.doppler_hz - truth_doppler_hz).abs() <= profile.doppler_step_hz && chip_error(result.code_phase_chips, truth_chips) <= 1.0 {
			hits += 1;
		}
	}

	assert!(hits >= 19, "only {} of 20 zero-padded trials recovered the code", hits);
}

#[test]
fn rejects_bad_configuration() {
	let codes = random_codes(7);
	let profile = test_profile(Padding::None, 2, -500.0, 500.0, 250.0);
	let good = SampleBuffer::new(vec![Complex{ re: 1.0, im: 0.0 }; profile.required_len()], FS).unwrap();

	let short = SampleBuffer::new(vec![Complex{ re: 1.0, im: 0.0 }; profile.required_len() - 1], FS).unwrap();
	assert!(matches!(basic_pcps::search(&short, &profile, &codes, 1), Err(DigSigProcErr::Config(_))));

	let wrong_rate = SampleBuffer::new(good.samples().to_vec(), 2.0*FS).unwrap();
	assert!(matches!(basic_pcps::search(&wrong_rate, &profile, &codes, 1), Err(DigSigProcErr::Config(_))));

	assert!(matches!(basic_pcps::search(&good, &profile, &codes, 4), Err(DigSigProcErr::Config(_))));

	let mut no_grid = profile.clone();
	no_grid.doppler_max_hz = no_grid.doppler_min_hz;
	assert!(matches!(basic_pcps::search(&good, &no_grid, &codes, 1), Err(DigSigProcErr::Config(_))));

	let mut no_blocks = profile.clone();
	no_blocks.coherent_blocks = 0;
	assert!(matches!(basic_pcps::search(&good, &no_blocks, &codes, 1), Err(DigSigProcErr::Config(_))));

	let mut wrong_length = profile.clone();
	wrong_length.code_length = 2*CODE_LENGTH;
	assert!(matches!(basic_pcps::search(&good, &wrong_length, &codes, 1), Err(DigSigProcErr::Config(_))));
}

#[test]
fn non_finite_samples_are_a_numeric_error() {
	let codes = random_codes(8);
	let profile = test_profile(Padding::None, 2, -500.0, 500.0, 250.0);
	let mut samples = vec![Complex{ re: 1.0, im: 0.0 }; profile.required_len()];
	samples[10].re = std::f64::NAN;
	let buffer = SampleBuffer::new(samples, FS).unwrap();

	assert!(matches!(basic_pcps::search(&buffer, &profile, &codes, 1), Err(DigSigProcErr::Numeric(_))));
}

#[test]
fn silent_input_keeps_the_starting_hypothesis() {
	let codes = random_codes(9);
	let profile = test_profile(Padding::ZeroPadded, 2, -1000.0, 1000.0, 250.0);
	let buffer = SampleBuffer::new(vec![Complex{ re: 0.0, im: 0.0 }; profile.required_len()], FS).unwrap();

	let result = basic_pcps::search(&buffer, &profile, &codes, 1).unwrap();
	assert_eq!(result.metric, 0.0);
	assert_eq!(result.doppler_hz, 0.0);
	assert_eq!(result.code_phase_chips, 0.0);
}
