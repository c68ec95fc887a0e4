//! Ordered execution of passes over one circuit.

use tracing::{debug, info, instrument};

use jaqal_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{ParallelScheduler, ScheduleVerification};
use crate::property::PropertySet;

/// Runs a fixed list of passes over a circuit, sharing one property set.
pub struct PassManager {
    /// Installed passes; executed front to back.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a manager with no passes.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Append a pass; it runs after every pass added before it.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given circuit.
    #[instrument(skip(self, circuit, properties))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running {} passes over {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Pass {} starting", pass.name());
                pass.run(circuit, properties)?;
                debug!(
                    "Pass {} completed, top-level statements: {}",
                    pass.name(),
                    circuit.body.len()
                );
            } else {
                debug!("Pass {} skipped", pass.name());
            }
        }

        info!(
            "Pass manager completed, gates: {}, top-level statements: {}",
            circuit.body.gate_count(),
            circuit.body.len()
        );

        Ok(())
    }

    /// Names of the installed passes, in run order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Number of installed passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether no pass is installed.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard scheduling pipeline.
pub struct PassManagerBuilder {
    /// Whether to check the scheduled result.
    verification: bool,
    /// Initial properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with verification enabled.
    pub fn new() -> Self {
        Self {
            verification: true,
            properties: PropertySet::new(),
        }
    }

    /// Enable or disable the trailing [`ScheduleVerification`] pass.
    #[must_use]
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verification = enabled;
        self
    }

    /// Set the initial properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Assemble the scheduling pipeline: scheduler first, then the optional
    /// verification pass. Returns the initial properties alongside.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        pm.add_pass(ParallelScheduler);

        if self.verification {
            pm.add_pass(ScheduleVerification);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
