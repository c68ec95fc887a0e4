//! Schedule command implementation.

use anyhow::{Context, Result};
use console::style;

use jaqal_compile::{PassManagerBuilder, ScheduleStats, VerificationResult};
use jaqal_emit::emit;

use super::common::{load_circuit, resolve_native_gates, write_output};
use crate::config::Config;

/// Execute the schedule command.
pub fn execute(
    config: &Config,
    input: &str,
    output: Option<&str>,
    format: Option<&str>,
    no_verify: bool,
    native_gates: Option<&str>,
) -> Result<()> {
    let format = format.unwrap_or(&config.output.format);
    if !matches!(format, "jaqal" | "json") {
        anyhow::bail!("Unknown output format: '{format}'. Available: jaqal, json");
    }
    let verify = config.scheduler.verify && !no_verify;

    eprintln!(
        "{} Scheduling {}",
        style("→").cyan().bold(),
        style(input).green()
    );

    // Load circuit
    let mut circuit = load_circuit(input)?;
    if let Some(table) = resolve_native_gates(config, native_gates)? {
        circuit.native_gates = table;
        circuit
            .validate()
            .context("Circuit does not match the native gate table")?;
    }
    eprintln!(
        "  Loaded: {} qubits, {} gates, {} macros",
        circuit.num_qubits(),
        circuit.body.gate_count(),
        circuit.macros.len()
    );

    // Build pass manager
    let (pm, mut props) = PassManagerBuilder::new().with_verification(verify).build();
    eprintln!("  Running passes: {}", pm.pass_names().join(", "));

    pm.run(&mut circuit, &mut props)?;

    eprintln!("{} Scheduling complete", style("✓").green().bold());
    if let Some(stats) = props.get::<ScheduleStats>() {
        eprintln!(
            "  Result: {} blocks scheduled into {} moments ({} parallel)",
            stats.blocks_scheduled, stats.moments, stats.parallel_moments
        );
    }
    if let Some(result) = props.get::<VerificationResult>() {
        eprintln!(
            "  Verified: {} blocks, widest parallel block {}",
            result.blocks_checked, result.max_parallelism
        );
    }

    // Save output
    let content = match format {
        "json" => serde_json::to_string_pretty(&circuit).context("Failed to serialize circuit")?,
        _ => emit(&circuit).context("Failed to emit Jaqal")?,
    };
    write_output(&content, output)?;
    if let Some(path) = output {
        eprintln!("  Output: {}", style(path).green());
    }

    Ok(())
}
