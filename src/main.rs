//! merit-sim entry point: CLI wiring and config-driven runs.

use std::path::Path;
use std::process;

use clap::Parser;

use merit_sim::cli::CliArgs;
use merit_sim::config::ScenarioConfig;
use merit_sim::io::export::{export_detail_csv, export_optimizer_json, export_summary_csv};
use merit_sim::logging::init_logging;
use merit_sim::optimizer::Signal;
use merit_sim::runner::{optimize, run_best, run_scenario};

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn main() {
    let cli = CliArgs::parse();
    init_logging(cli.verbose);

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut config = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path).unwrap_or_else(|e| fail(e))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name).unwrap_or_else(|e| fail(e))
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed {
        config.apply_seed(seed);
    }
    if cli.detail_out.is_some() || cli.hourly {
        config.context.detail = true;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let scenario = config.build_scenario().unwrap_or_else(|e| fail(e));
    let report = run_scenario(&scenario);

    if cli.hourly {
        for h in &report.balance.hours {
            println!("{h}");
        }
    }
    println!("{report}");

    if let Some(ref path) = cli.detail_out {
        export(path, "hourly detail", |p| {
            export_detail_csv(&report.balance, scenario.context().shortfall_sign, p)
        });
    }
    if let Some(ref path) = cli.summary_out {
        export(path, "summary", |p| export_summary_csv(&report.summary, p));
    }

    if cli.wants_optimizer() {
        let outcome = optimize(&scenario, &config.optimizer);
        println!("\n{outcome}");

        let best = outcome
            .best_for(Signal::Lcoe)
            .or_else(|| outcome.best_for(Signal::Multi));
        if let Some(best) = best {
            let rerun = run_best(&scenario, &config.optimizer, &best.evaluation.capacities);
            println!("--- Best mix ({}) ---", best.signal);
            println!("{}", rerun.summary);
        }

        if let Some(ref path) = cli.optimizer_out {
            export(path, "optimizer result", |p| export_optimizer_json(&outcome, p));
        }
    }
}

fn export(path: &Path, what: &str, write: impl FnOnce(&Path) -> std::io::Result<()>) {
    if let Err(e) = write(path) {
        fail(format!("failed to write {what}: {e}"));
    }
    eprintln!("{what} written to {}", path.display());
}
