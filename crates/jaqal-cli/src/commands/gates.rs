//! Gates command implementation.

use anyhow::Result;
use console::style;

use jaqal_ir::{NativeGateSet, ParamType};

use super::common::resolve_native_gates;
use crate::config::Config;

/// Execute the gates command.
pub fn execute(config: &Config, native_gates: Option<&str>) -> Result<()> {
    let table = resolve_native_gates(config, native_gates)?.unwrap_or_else(NativeGateSet::qscout);

    println!("{} ({} gates):", style("Native gates").bold(), table.len());
    for gate in table.iter() {
        let params: Vec<String> = gate
            .parameters
            .iter()
            .map(|p| {
                let kind = match p.kind {
                    ParamType::Qubit => "qubit",
                    ParamType::Float => "float",
                    ParamType::Int => "int",
                };
                format!("{}: {kind}", p.name)
            })
            .collect();
        println!(
            "  {:<12} {}",
            style(&gate.name).cyan(),
            style(params.join(", ")).dim()
        );
    }

    Ok(())
}
