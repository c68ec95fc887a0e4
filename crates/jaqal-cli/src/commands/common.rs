//! Shared helpers for CLI commands.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use jaqal_ir::{Circuit, GateDefinition, NativeGateSet};

use crate::config::Config;

/// Load a circuit from a JSON file and check it against its gate table.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    let circuit: Circuit = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse circuit JSON: {path}"))?;
    circuit
        .validate()
        .with_context(|| format!("Invalid circuit: {path}"))?;
    debug!(
        "Loaded {path}: {} registers, {} top-level statements",
        circuit.registers.len(),
        circuit.body.len()
    );

    Ok(circuit)
}

/// Load a native gate table from a YAML or JSON file.
///
/// The file holds a list of gate definitions.
pub fn load_native_gates(path: &Path) -> Result<NativeGateSet> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read native gate table: {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let definitions: Vec<GateDefinition> = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Failed to parse native gate table: {}", path.display()))?,
        _ => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Failed to parse native gate table: {}", path.display()))?,
    };

    debug!(
        "Loaded {} native gates from {}",
        definitions.len(),
        path.display()
    );
    Ok(definitions.into())
}

/// Pick the native gate table: the command-line flag wins over the configuration.
///
/// Returns `None` when neither names a file.
pub fn resolve_native_gates(config: &Config, flag: Option<&str>) -> Result<Option<NativeGateSet>> {
    match flag.map(Path::new).or(config.scheduler.native_gates.as_deref()) {
        Some(path) => load_native_gates(path).map(Some),
        None => Ok(None),
    }
}

/// Write `content` to `output`, or to stdout when no file is given.
pub fn write_output(content: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
