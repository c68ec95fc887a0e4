//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - parallelizing scheduler for Jaqal circuits",
        style("jaqal").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  jaqal-ir       Circuit representation and qubit usage");
    println!("  jaqal-compile  Pass framework and scheduler");
    println!("  jaqal-emit     Jaqal source emitter");
    println!("  jaqal-cli      Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
