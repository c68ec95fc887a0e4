//! Emit command implementation.

use anyhow::{Context, Result};

use jaqal_emit::emit;

use super::common::{load_circuit, write_output};

/// Execute the emit command.
pub fn execute(input: &str, output: Option<&str>) -> Result<()> {
    let circuit = load_circuit(input)?;
    let jaqal = emit(&circuit).with_context(|| format!("Failed to emit {input}"))?;
    write_output(&jaqal, output)
}
