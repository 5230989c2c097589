//! Evaluate a predictor against one or more traces.

use branch_sweep::*;
use branch_sweep::error::Result;
use clap::Parser;
use std::process;

#[derive(Parser, Debug)]
#[command(version, about = "Replay branch traces against a predictor", long_about = None)]
struct Cli {
    /// Name of the predictor to use (see --list-predictors)
    #[arg(required_unless_present = "list_predictors")]
    predictor: Option<String>,

    /// List all available predictors and exit
    #[arg(long)]
    list_predictors: bool,

    /// Trace file to evaluate (may be repeated)
    #[arg(short, long = "trace", required_unless_present = "list_predictors")]
    traces: Vec<String>,

    /// Keep predictor state from one trace to the next
    #[arg(long)]
    no_reset: bool,

    /// key=value options passed to the predictor's constructor
    #[arg(long, num_args = 1.., value_name = "KEY=VALUE")]
    predictor_args: Vec<String>,
}

fn list_predictors() {
    println!("Available predictors:");
    for kind in PredictorKind::ALL {
        let opts = kind.options();
        if opts.is_empty() {
            println!("\t{}", kind);
        } else {
            println!("\t{:20} {}", kind.name(), opts.join(" "));
        }
    }
}

fn print_report(report: &EvaluationReport) {
    let r = &report.result;
    println!("[*] {}", report.trace);
    println!("  {:20} Global hit rate: {}/{} ({:.2}% correct) ({} misses)",
        report.predictor,
        r.correct_predicts,
        r.total_predictions,
        r.accuracy() * 100.0,
        r.incorrect_predicts,
    );
    println!("  taken:     {:8} correct {:8} incorrect",
        r.correct_takes, r.incorrect_takes);
    println!("  not-taken: {:8} correct {:8} incorrect",
        r.correct_not_takes, r.incorrect_not_takes);
    for (opcode, s) in r.opcodes_by_occurrence() {
        println!("    {:8} {:8}/{:8} ({:.4})",
            opcode, s.hits, s.occ, s.hit_rate());
    }
}

fn run(name: &str, cli: &Cli) -> Result<()> {
    let kind: PredictorKind = name.parse()?;
    let opts = PredictorOptions::parse(&cli.predictor_args)?;
    let mut predictor = kind.build(&opts)?;

    println!("[*] {} {}", predictor.name(), opts);
    let traces = TraceSet::new_from_slice(&cli.traces);
    let reports = evaluate_set(&mut predictor, &opts, traces, !cli.no_reset)?;
    for report in reports.iter() {
        print_report(report);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_predictors {
        list_predictors();
        return;
    }

    // Only optional alongside --list-predictors
    let Some(name) = cli.predictor.as_deref() else { return };
    if let Err(e) = run(name, &cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
