//! The unit of work the pass manager runs.

use jaqal_ir::Circuit;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// Whether a pass reads or rewrites the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the circuit.
    Analysis,
    /// Transformation pass that replaces or modifies the circuit.
    Transformation,
}

/// A step of the scheduling pipeline.
pub trait Pass: Send + Sync {
    /// Stable identifier, used in logs.
    fn name(&self) -> &str;

    /// Analysis or transformation.
    fn kind(&self) -> PassKind;

    /// Apply the pass.
    ///
    /// Analysis passes must leave the circuit untouched and report through
    /// the `PropertySet`.
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()>;

    /// Whether to run, given the circuit and what earlier passes recorded.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}
