//! Which statements may share a moment.

use jaqal_ir::{Block, GateCall, QubitUsage, Statement};

/// A gate may run alongside others only if it is a native gate on at most
/// one qubit that is not `prepare_all` or `measure_all`.
pub fn is_parallelizable_gate(gate: &GateCall) -> bool {
    !gate.is_barrier() && gate.num_quantum_parameters().is_some_and(|n| n <= 1)
}

/// A parallel block may merge into a moment when every member is a
/// parallelizable gate.
pub fn is_parallelizable_block(block: &Block) -> bool {
    block.is_parallel()
        && block
            .iter()
            .all(|s| s.as_gate().is_some_and(is_parallelizable_gate))
}

/// Statement-level legality.
///
/// Sequential blocks, unscheduled blocks and loops never qualify.
pub fn is_parallelizable(statement: &Statement) -> bool {
    match statement {
        Statement::Gate(gate) => is_parallelizable_gate(gate),
        Statement::Block(block) => is_parallelizable_block(block),
        Statement::Loop(_) => false,
    }
}

/// Whether a parallelizable statement with `usage` can join a moment whose
/// occupants use `occupied` and are all parallelizable iff `open` holds.
#[inline]
pub fn compatible(open: bool, occupied: &QubitUsage, usage: &QubitUsage) -> bool {
    open && occupied.is_disjoint(usage)
}
