//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while building or inspecting a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A register name does not resolve to any declared register.
    #[error("Register '{name}' not found in circuit{}", format_gate_context(.gate_name))]
    RegisterNotFound {
        /// The missing register.
        name: String,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A qubit index lies outside its register.
    #[error("Qubit index {index} out of range for register '{register}' of size {size}")]
    QubitIndexOutOfRange {
        /// Register being indexed.
        register: String,
        /// Offending index.
        index: usize,
        /// Size of the register.
        size: usize,
    },

    /// A chain of mapped registers loops back on itself.
    #[error("Mapped register '{0}' does not resolve to a fundamental register")]
    CyclicRegisterMapping(String),

    /// A register, constant or macro name is already taken.
    #[error("Name '{0}' is already declared")]
    DuplicateName(String),

    /// A gate is neither a native gate nor a declared macro.
    #[error("Gate '{0}' is neither a native gate nor a macro")]
    UnknownGate(String),

    /// Gate called with the wrong number of arguments.
    #[error("Gate '{gate_name}' takes {expected} arguments, got {got}")]
    ArgumentCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Number of declared parameters.
        expected: usize,
        /// Number of arguments supplied.
        got: usize,
    },

    /// An argument does not match the kind of its parameter.
    #[error("Argument {position} of gate '{gate_name}' must be {expected}")]
    ArgumentKindMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Zero-based argument position.
        position: usize,
        /// Human-readable expected kind.
        expected: &'static str,
    },

    /// A reference names neither a constant nor a macro parameter in scope.
    #[error("Unresolved reference '{0}'")]
    UnresolvedReference(String),

    /// Builder was asked to close a block that is not open.
    #[error("Invalid builder state: {0}")]
    InvalidBuilderState(String),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
