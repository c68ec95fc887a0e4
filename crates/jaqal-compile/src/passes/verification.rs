//! Verification pass for scheduled circuits.
//!
//! Walks the body and every macro body and checks the shape the scheduler
//! guarantees: nothing left unscheduled, no sequential block directly inside
//! another (below the top level), parallel blocks holding only gates and
//! sequential blocks, and no two members of a parallel block sharing a qubit.
//! Gate members of a multi-member parallel block must also be parallelizable.

use serde::Serialize;
use tracing::debug;

use jaqal_ir::{Block, BlockKind, Circuit, QubitUniverse, QubitUsage, Statement};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::passes::schedule::is_parallelizable_gate;
use crate::property::PropertySet;

/// Result of schedule verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Whether the verification passed.
    pub passed: bool,
    /// Number of blocks visited.
    pub blocks_checked: usize,
    /// Number of parallel blocks visited.
    pub parallel_blocks: usize,
    /// Largest number of members in one parallel block.
    pub max_parallelism: usize,
}

/// Analysis pass that rejects circuits breaking the scheduled-form rules.
///
/// Added after the scheduler to catch any violation it might introduce, and
/// usable on its own to check hand-written schedules.
pub struct ScheduleVerification;

impl Pass for ScheduleVerification {
    fn name(&self) -> &'static str {
        "schedule_verification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let result = verify_schedule(circuit)?;
        debug!(
            "Schedule verification passed: {} blocks checked, {} parallel, widest {}",
            result.blocks_checked, result.parallel_blocks, result.max_parallelism
        );
        properties.insert(result);
        Ok(())
    }
}

/// Check a circuit without going through a pass manager.
pub fn verify_schedule(circuit: &Circuit) -> CompileResult<VerificationResult> {
    let universe = circuit.universe();
    let mut result = VerificationResult::default();

    Checker {
        universe: &universe,
        location: "body",
        result: &mut result,
    }
    .check_block(&circuit.body, true)?;

    for m in circuit.macros.values() {
        let scope = universe.clone().with_parameters(&m.parameters);
        let location = format!("macro '{}'", m.name);
        Checker {
            universe: &scope,
            location: &location,
            result: &mut result,
        }
        .check_block(&m.body, false)?;
    }

    result.passed = true;
    Ok(result)
}

struct Checker<'a, 'c> {
    universe: &'a QubitUniverse<'c>,
    location: &'a str,
    result: &'a mut VerificationResult,
}

impl Checker<'_, '_> {
    fn violation(&self, detail: impl Into<String>) -> CompileError {
        CompileError::ScheduleViolation {
            location: self.location.to_string(),
            detail: detail.into(),
        }
    }

    fn check_block(&mut self, block: &Block, top_level: bool) -> CompileResult<()> {
        self.result.blocks_checked += 1;
        match block.kind {
            BlockKind::Unscheduled => Err(self.violation("unscheduled block remains")),
            BlockKind::Sequential => {
                for statement in block {
                    match statement {
                        Statement::Gate(_) => {}
                        Statement::Block(child) => {
                            if child.is_sequential() && !top_level {
                                return Err(
                                    self.violation("sequential block nested in sequential block")
                                );
                            }
                            self.check_block(child, false)?;
                        }
                        Statement::Loop(lp) => self.check_block(&lp.body, false)?,
                    }
                }
                Ok(())
            }
            BlockKind::Parallel => self.check_parallel(block),
        }
    }

    fn check_parallel(&mut self, block: &Block) -> CompileResult<()> {
        self.result.parallel_blocks += 1;
        self.result.max_parallelism = self.result.max_parallelism.max(block.len());

        let mut occupied = QubitUsage::new();
        for statement in block {
            let usage = match statement {
                Statement::Gate(gate) => {
                    if block.len() > 1 && !is_parallelizable_gate(gate) {
                        return Err(
                            self.violation(format!("'{gate}' cannot run in parallel with others"))
                        );
                    }
                    self.universe.gate_usage(gate)?
                }
                Statement::Block(child) if child.is_sequential() => {
                    self.check_block(child, false)?;
                    self.universe.block_usage(child)?
                }
                Statement::Block(child) if child.is_parallel() => {
                    return Err(self.violation("parallel block nested in parallel block"));
                }
                Statement::Block(child) => {
                    self.check_block(child, false)?;
                    self.universe.block_usage(child)?
                }
                Statement::Loop(_) => {
                    return Err(self.violation("loop inside parallel block"));
                }
            };
            if !occupied.is_disjoint(&usage) {
                return Err(self.violation("members of a parallel block share a qubit"));
            }
            occupied.extend(&usage);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaqal_ir::{Argument, LoopStatement, NativeGateSet};

    fn circuit() -> Circuit {
        let mut c = Circuit::new(NativeGateSet::qscout());
        c.register("q", 3).unwrap();
        c
    }

    fn g(c: &Circuit, name: &str, qubits: &[usize]) -> Statement {
        let args: Vec<Argument> = qubits
            .iter()
            .map(|&i| c.qubit("q", i).unwrap().into())
            .collect();
        c.gate(name, args).unwrap().into()
    }

    #[test]
    fn test_valid_schedule_passes() {
        let mut c = circuit();
        c.body = Block::sequential(vec![
            g(&c, "prepare_all", &[]),
            Block::parallel(vec![g(&c, "Px", &[0]), g(&c, "Py", &[1])]).into(),
            g(&c, "measure_all", &[]),
        ]);
        let mut props = PropertySet::new();
        ScheduleVerification.run(&mut c, &mut props).unwrap();
        let result = props.get::<VerificationResult>().unwrap();
        assert!(result.passed);
        assert_eq!(result.parallel_blocks, 1);
        assert_eq!(result.max_parallelism, 2);
    }

    #[test]
    fn test_unscheduled_rejected() {
        let mut c = circuit();
        c.body = Block::sequential(vec![Block::unscheduled(vec![g(&c, "Px", &[0])]).into()]);
        let err = verify_schedule(&c).unwrap_err();
        assert!(matches!(err, CompileError::ScheduleViolation { .. }));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_nested_sequential_allowed_only_at_top() {
        let mut c = circuit();
        let inner = Block::sequential(vec![g(&c, "Px", &[0])]);
        c.body = Block::sequential(vec![inner.clone().into()]);
        assert!(verify_schedule(&c).is_ok());

        c.body = Block::sequential(vec![
            LoopStatement::fixed(2, Block::sequential(vec![inner.into()])).into(),
        ]);
        assert!(verify_schedule(&c).is_err());
    }

    #[test]
    fn test_shared_qubit_in_parallel_rejected() {
        let mut c = circuit();
        c.body = Block::sequential(vec![
            Block::parallel(vec![g(&c, "Px", &[0]), g(&c, "Py", &[0])]).into(),
        ]);
        let err = verify_schedule(&c).unwrap_err();
        assert!(err.to_string().contains("share a qubit"));
    }

    #[test]
    fn test_two_qubit_gate_in_parallel_rejected() {
        let mut c = circuit();
        c.body = Block::sequential(vec![
            Block::parallel(vec![g(&c, "Sxx", &[0, 1]), g(&c, "Py", &[2])]).into(),
        ]);
        assert!(verify_schedule(&c).is_err());
    }

    #[test]
    fn test_loop_in_parallel_rejected() {
        let mut c = circuit();
        let lp = LoopStatement::fixed(3, Block::sequential(vec![g(&c, "Px", &[0])]));
        c.body = Block::sequential(vec![Block::parallel(vec![lp.into()]).into()]);
        assert!(verify_schedule(&c).is_err());
    }
}
