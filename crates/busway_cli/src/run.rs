//! `busway run`: simulate a scenario and report its transactions.
//!
//! Loads the scenario, applies command-line overrides, builds the topology's
//! testbench, and runs it until the master has issued every op. The report
//! goes to stdout; progress lines go to stderr.

use busway_config::ScenarioConfig;
use busway_sim::SimConfig;

use crate::report::{expectations, RunReport};
use crate::scenario;
use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Runs the `busway run` command.
///
/// Returns exit code 1 if any read returned unexpected data, or, with
/// `--strict`, if any transaction ended in an error response.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = busway_config::load_config(&args.scenario)?;
    apply_overrides(&mut config, args);

    if !global.quiet {
        eprintln!(
            "   Simulating {} ({} ops)",
            config.bridge.topology,
            config.ops.len()
        );
    }

    let sim = sim_config(&config);
    if let Some(parent) = sim.waveform_path.as_deref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let outcome = scenario::execute(&config, &sim)?;
    let report = RunReport::new(config.bridge.topology, &outcome, &expectations(&config.ops));

    match args.format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !global.quiet {
        eprintln!("    Finished in {} cycles", report.cycles);
        if let Some(path) = &sim.waveform_path {
            eprintln!("   Waveform: {}", path.display());
        }
    }

    let failed = !report.mismatches.is_empty() || (args.strict && report.errors > 0);
    Ok(i32::from(failed))
}

fn apply_overrides(config: &mut ScenarioConfig, args: &RunArgs) {
    if let Some(max_cycles) = args.max_cycles {
        config.sim.max_cycles = max_cycles;
    }
    if let Some(vcd) = &args.vcd {
        config.sim.waveform = Some(vcd.clone());
    }
}

fn sim_config(config: &ScenarioConfig) -> SimConfig {
    SimConfig {
        max_cycles: config.sim.max_cycles,
        max_deltas: config.sim.max_deltas,
        waveform_path: config.sim.waveform.clone(),
    }
}
