use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;

use sched_sim::{
    Policy, PreemptionMode, Report, SimError, input, logger,
    sim::{WorkloadParams, bernoulli_profiles},
};

const USAGE: &str = "\
usage: sched-sim [-v|-vv] [--json] [--legacy-preemption] [--max-ticks N] <input> <output> <policy> [params...]
       sched-sim generate <output> [seed] [ticks]

policies:
  1 | fcfs                 first come first serve
  2 | priority             priority with preemption on more urgent arrivals
  3 | rr <quantum>         round robin
  4 | memory <p1> <p2> <p3> <p4>
                           first fit over four memory partitions (sum <= 1000)";

#[derive(Debug, Default)]
struct Options {
    verbosity: u8,
    json: bool,
    legacy_preemption: bool,
    max_ticks: Option<u64>,
    positional: Vec<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => opts.verbosity += 1,
            "-vv" => opts.verbosity += 2,
            "--json" => opts.json = true,
            "--legacy-preemption" => opts.legacy_preemption = true,
            "--max-ticks" => {
                let raw = args.next().ok_or("--max-ticks needs a value")?;
                let ticks = raw
                    .parse()
                    .map_err(|_| format!("invalid --max-ticks value `{raw}`"))?;
                opts.max_ticks = Some(ticks);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => opts.positional.push(arg),
        }
    }
    Ok(opts)
}

fn main() -> ExitCode {
    let opts = match parse_options(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logger::init(logger::level_for(opts.verbosity)) {
        eprintln!("failed to install logger: {err}");
    }

    let result = match opts.positional.first().map(String::as_str) {
        Some("generate") => generate(&opts),
        Some(_) if opts.positional.len() >= 3 => simulate(&opts),
        _ => Err(USAGE.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("Error! {msg}");
            ExitCode::FAILURE
        }
    }
}

fn simulate(opts: &Options) -> Result<(), String> {
    let [input_path, output_path, selector, rest @ ..] = opts.positional.as_slice() else {
        return Err(USAGE.to_string());
    };
    let params: Vec<&str> = rest.iter().map(String::as_str).collect();

    let mut policy = Policy::from_args(selector, &params).map_err(|e| e.to_string())?;
    if opts.legacy_preemption {
        policy = policy.with_preemption(PreemptionMode::Legacy);
    }

    println!("{policy} scheduler for {input_path}");
    let profiles = input::load_table(input_path).map_err(|e| e.to_string())?;
    let report = sched_sim::run_with_budget(&profiles, &policy, opts.max_ticks)
        .map_err(|e: SimError| e.to_string())?;

    write_report(&report, output_path, opts.json)?;
    println!("{report}");
    Ok(())
}

fn write_report(report: &Report, path: &str, json: bool) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("cannot create {path}: {e}"))?;
    let mut out = BufWriter::new(file);
    if json {
        serde_json::to_writer_pretty(&mut out, report).map_err(|e| e.to_string())?;
        out.flush().map_err(|e| e.to_string())
    } else {
        report.write_csv(out).map_err(|e| e.to_string())
    }
}

fn generate(opts: &Options) -> Result<(), String> {
    let output_path = opts
        .positional
        .get(1)
        .ok_or_else(|| USAGE.to_string())?;
    let seed = match opts.positional.get(2) {
        Some(raw) => raw.parse().map_err(|_| format!("invalid seed `{raw}`"))?,
        None => 0,
    };
    let mut params = WorkloadParams::default();
    if let Some(raw) = opts.positional.get(3) {
        params.ticks = raw.parse().map_err(|_| format!("invalid tick count `{raw}`"))?;
    }

    let profiles = bernoulli_profiles(&params, seed);
    let file = File::create(output_path).map_err(|e| format!("cannot create {output_path}: {e}"))?;
    input::write_table(BufWriter::new(file), &profiles).map_err(|e| e.to_string())?;
    println!("wrote {} processes to {output_path}", profiles.len());
    Ok(())
}
