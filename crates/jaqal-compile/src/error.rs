//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate, typically an unresolvable qubit reference.
    #[error("IR error: {0}")]
    Ir(#[from] jaqal_ir::IrError),

    /// The circuit tree has a shape the scheduler cannot rewrite.
    #[error("Malformed circuit: {0}")]
    MalformedCircuit(String),

    /// A scheduled circuit breaks a parallelism or nesting rule.
    #[error("Schedule violation in {location}: {detail}")]
    ScheduleViolation {
        /// Where the violation was found, e.g. `body` or `macro 'H'`.
        location: String,
        /// What is wrong.
        detail: String,
    },
}

impl CompileError {
    /// Whether the failure is caused by the input circuit itself.
    ///
    /// Such failures are deterministic; the only remedy is fixing the input.
    pub fn is_malformed(&self) -> bool {
        matches!(self, CompileError::Ir(_) | CompileError::MalformedCircuit(_))
    }
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use jaqal_ir::IrError;

    #[test]
    fn test_malformed_classification() {
        let ir: CompileError = IrError::UnresolvedReference("a".into()).into();
        assert!(ir.is_malformed());
        assert!(CompileError::MalformedCircuit("x".into()).is_malformed());
        assert!(
            !CompileError::ScheduleViolation {
                location: "body".into(),
                detail: "d".into()
            }
            .is_malformed()
        );
    }

    #[test]
    fn test_violation_message() {
        let err = CompileError::ScheduleViolation {
            location: "body".into(),
            detail: "unscheduled block remains".into(),
        };
        assert_eq!(
            err.to_string(),
            "Schedule violation in body: unscheduled block remains"
        );
    }
}
