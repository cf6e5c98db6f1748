
extern crate clap;
extern crate colored;
extern crate gnss_acq;

use std::fs::File;
use std::io::BufReader;
use std::process;
use std::sync::Arc;

use clap::{Arg, App, ArgMatches};
use colored::*;
use gnss_acq::DigSigProcErr;
use gnss_acq::gnss::Signal;
use gnss_acq::gnss::code::CodeReplicaGenerator;
use gnss_acq::gnss::common::acquisition::SignalProfile;
use gnss_acq::gnss::common::acquisition::dispatch::{self, PrnOutcome};
use gnss_acq::gnss::common::front_end;
use gnss_acq::gnss::galileo_e5b;
use gnss_acq::gnss::gps_l2c;
use gnss_acq::io::{InterleavedSource, SampleFormat};
use serde::{Serialize, Deserialize};

#[derive(Debug, Serialize, Deserialize)]
struct AcquisitionRecord {
	pub prn: usize,
	pub doppler_hz: Option<f64>,
	pub metric: Option<f64>,
	pub code_phase_chips: Option<f64>,
	pub error: Option<String>,
}

impl From<&PrnOutcome> for AcquisitionRecord {
	fn from(outcome:&PrnOutcome) -> Self { match &outcome.result {
		Ok(r)  => AcquisitionRecord{ prn: outcome.prn, doppler_hz: Some(r.doppler_hz), metric: Some(r.metric), code_phase_chips: Some(r.code_phase_chips), error: None },
		Err(e) => AcquisitionRecord{ prn: outcome.prn, doppler_hz: None, metric: None, code_phase_chips: None, error: Some(e.to_string()) },
	}}
}

#[tokio::main]
async fn main() {
	env_logger::init();

	let matches = App::new("GNSS Acquisition")
		.version("0.1.0")
		.about("Takes a raw IQ capture and searches it for GPS L2 CM or Galileo E5b-Q signals, one result per PRN")
		.arg(Arg::with_name("signal_type")
			.help("Signal to search for")
			.required(true).index(1)
			.possible_values(&["gps-l2cm", "galileo-e5bq"]))
		.arg(Arg::with_name("input_path")
			.help("Input filename")
			.required(true).index(2))
		.arg(Arg::with_name("sample_rate_hz")
			.help("Capture sample rate [samples/sec]")
			.required(true).index(3))
		.arg(Arg::with_name("carrier_offset_hz")
			.help("Frequency of the signal's nominal carrier within the capture [Hz]")
			.required(true).index(4)
			.allow_hyphen_values(true))
		.arg(Arg::with_name("prns")
			.long("prns").takes_value(true)
			.help("PRNs to search, e.g. 1,2,5-9; defaults to every PRN the signal has codes for"))
		.arg(Arg::with_name("workers")
			.long("workers").takes_value(true)
			.help("Maximum number of PRNs searched at once; defaults to the number of CPUs"))
		.arg(Arg::with_name("input_type")
			.short("t").long("type").takes_value(true)
			.possible_values(&["i8", "i16"]).default_value("i8"))
		.arg(Arg::with_name("codes")
			.long("codes").takes_value(true)
			.help("galileo-e5bq code table: '<prn> <octal>' register 2 start values or '<prn> <hex>' primary codes, one line per PRN"))
		.arg(Arg::with_name("profile")
			.long("profile").takes_value(true)
			.help("JSON signal profile to use instead of the built-in one"))
		.arg(Arg::with_name("json")
			.long("json")
			.help("Print results as a JSON array instead of one line per PRN"))
		.get_matches();

	if let Err(e) = run(&matches).await {
		eprintln!("{}", format!("Error: {}", e).red());
		process::exit(1);
	}
}

async fn run(matches:&ArgMatches<'_>) -> Result<(), DigSigProcErr> {
	let signal:Signal = required(matches, "signal_type")?.parse()?;
	let fname:&str = required(matches, "input_path")?;
	let fs:f64 = parse_f64(required(matches, "sample_rate_hz")?, "sample rate")?;
	let carrier_offset_hz:f64 = parse_f64(required(matches, "carrier_offset_hz")?, "carrier offset")?;
	let fmt = match matches.value_of("input_type") {
		Some("i16") => SampleFormat::ComplexI16,
		_           => SampleFormat::ComplexI8,
	};

	let profile:SignalProfile = match matches.value_of("profile") {
		Some(path) => SignalProfile::load(path)?,
		None       => signal.profile(),
	};

	let codes:Arc<dyn CodeReplicaGenerator> = match (signal, matches.value_of("codes")) {
		(Signal::GalileoE5bq, Some(path)) => galileo_e5b::e5bq_codes(path)?,
		(Signal::GalileoE5bq, None)       => return Err(DigSigProcErr::Config(format!("{} needs a code table (--codes)", signal.name()))),
		(Signal::GpsL2cm, codes_path)     => {
			if codes_path.is_some() { eprintln!("{}", format!("Ignoring --codes; {} codes are generated", signal.name()).yellow()); }
			Arc::new(gps_l2c::CmCode)
		},
	};

	let prns:Vec<usize> = match matches.value_of("prns") {
		Some(list) => parse_prn_list(list)?,
		None       => codes.prns(),
	};
	let workers:usize = match matches.value_of("workers") {
		Some(n) => n.parse().map_err(|_| DigSigProcErr::Config(format!("unable to parse '{}' as a worker count", n)))?,
		None    => dispatch::default_workers(),
	};
	dispatch::check_request(&profile, codes.as_ref(), &prns, workers)?;

	eprintln!("Searching {} for {} at {} [samples/sec], carrier offset {} [Hz]", &fname, profile.name, fs, carrier_offset_hz);

	let file = File::open(fname).map_err(|e| DigSigProcErr::Io(format!("unable to open {}: {}", fname, e)))?;
	let mut src = InterleavedSource::new(BufReader::new(file), fmt, fs)?;
	let buffer = front_end::condition(&mut src, carrier_offset_hz, &profile)?;

	let outcomes = dispatch::dispatch(Arc::new(buffer), Arc::new(profile), codes, &prns, workers).await?;

	if matches.is_present("json") {
		let records:Vec<AcquisitionRecord> = outcomes.iter().map(AcquisitionRecord::from).collect();
		let text = serde_json::to_string_pretty(&records).map_err(|e| DigSigProcErr::Io(format!("unable to serialize results: {}", e)))?;
		println!("{}", text);
	} else {
		for outcome in outcomes.iter() {
			println!("{}", format_outcome(outcome));
		}
	}

	let failures:usize = outcomes.iter().filter(|o| o.result.is_err()).count();
	if failures > 0 {
		eprintln!("{}", format!("{} of {} PRNs failed", failures, outcomes.len()).red());
	}

	fatal_outcome(&outcomes)
}

/// A fatal error in any PRN's outcome fails the whole run
fn fatal_outcome(outcomes:&[PrnOutcome]) -> Result<(), DigSigProcErr> {
	let mut cancelled:bool = false;
	for outcome in outcomes.iter() {
		match &outcome.result {
			Err(e) if e.is_fatal()              => return Err(e.clone()),
			Err(DigSigProcErr::Cancelled)       => cancelled = true,
			_ => {},
		}
	}
	if cancelled { Err(DigSigProcErr::Cancelled) } else { Ok(()) }
}

fn required<'a>(matches:&'a ArgMatches<'_>, name:&str) -> Result<&'a str, DigSigProcErr> {
	matches.value_of(name).ok_or_else(|| DigSigProcErr::Config(format!("missing argument {}", name)))
}

fn parse_f64(s:&str, what:&str) -> Result<f64, DigSigProcErr> {
	s.trim().parse().map_err(|_| DigSigProcErr::Config(format!("unable to parse '{}' as a {}", s, what)))
}

/// Comma-separated PRNs and inclusive ranges, e.g. "1,2,5-9"
fn parse_prn_list(list:&str) -> Result<Vec<usize>, DigSigProcErr> {
	let bad = |item:&str| DigSigProcErr::Config(format!("'{}' isn't a PRN or PRN range", item));
	let mut prns:Vec<usize> = vec![];

	for item in list.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
		let mut ends = item.splitn(2, '-');
		let first:usize = ends.next().unwrap_or("").trim().parse().map_err(|_| bad(item))?;
		match ends.next() {
			Some(last) => {
				let last:usize = last.trim().parse().map_err(|_| bad(item))?;
				if last < first { return Err(bad(item)); }
				prns.extend(first..=last);
			},
			None => prns.push(first),
		}
	}

	if prns.is_empty() { Err(DigSigProcErr::Config(format!("no PRNs in '{}'", list))) } else { Ok(prns) }
}

/// printf-style "% w.pf": a leading space stands in for the sign of non-negative values
fn space_signed(x:f64, width:usize, precision:usize) -> String {
	if x.is_sign_negative() { format!("{:>w$.p$}", x, w=width, p=precision) }
	else { format!(" {:>w$.p$}", x, w=width - 1, p=precision) }
}

fn format_outcome(outcome:&PrnOutcome) -> String {
	match &outcome.result {
		Ok(r)  => format!("prn {:3} doppler {} metric {} code_offset {:6.1}",
			outcome.prn, space_signed(r.doppler_hz, 7, 1), space_signed(r.metric, 7, 1), r.code_phase_chips),
		Err(e) => format!("prn {:3} failed: {}", outcome.prn, e),
	}
}
