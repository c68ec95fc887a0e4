//! The parallelizing scheduler.
//!
//! Rewrites every unscheduled block of a circuit into a sequential block of
//! moments. Statements are visited in listed order; each one goes into the
//! earliest moment that comes after every earlier use of its qubits and that
//! it may legally share. Gates that cannot run alongside others (multi-qubit
//! gates, `prepare_all`, `measure_all`, macro calls) and loops always get a
//! new trailing moment of their own.
//!
//! Already scheduled blocks are normalized on the way: sequential blocks
//! nested directly in sequential blocks are spliced into their parent, except
//! for the children of the top-level body. Parallel blocks are trusted as
//! written; only their block and loop children are rewritten. Inside an
//! unscheduled block an authored parallel block either merges into an
//! existing moment or is kept whole as a moment of its own.
//!
//! The input circuit is never modified; a new one is built.

mod legality;
mod moments;

pub use legality::{is_parallelizable, is_parallelizable_block, is_parallelizable_gate};

use tracing::{debug, info, instrument, trace};

use jaqal_ir::{Block, BlockKind, Circuit, LoopStatement, QubitUniverse, Statement};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{PropertySet, ScheduleStats};
use moments::Timeline;

/// Transformation pass that schedules every unscheduled block.
///
/// Stores a [`ScheduleStats`] in the property set.
pub struct ParallelScheduler;

impl Pass for ParallelScheduler {
    fn name(&self) -> &'static str {
        "parallel_scheduler"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let (scheduled, stats) = schedule_with_stats(circuit)?;
        info!(
            "Scheduled {} blocks into {} moments ({} parallel)",
            stats.blocks_scheduled, stats.moments, stats.parallel_moments
        );
        *circuit = scheduled;
        properties.insert(stats);
        Ok(())
    }
}

/// Schedule a circuit, returning a new one.
///
/// ```rust
/// use jaqal_ir::{Block, Circuit, NativeGateSet};
/// use jaqal_compile::schedule_circuit;
///
/// let mut circuit = Circuit::new(NativeGateSet::qscout());
/// circuit.register("q", 2).unwrap();
/// let px = circuit.gate("Px", vec![circuit.qubit("q", 0).unwrap().into()]).unwrap();
/// let py = circuit.gate("Py", vec![circuit.qubit("q", 1).unwrap().into()]).unwrap();
/// circuit.body.statements.push(Block::unscheduled(vec![px.into(), py.into()]).into());
///
/// let scheduled = schedule_circuit(&circuit).unwrap();
/// assert_eq!(scheduled.body.len(), 1);
/// assert!(scheduled.body.statements[0].as_block().unwrap().is_parallel());
/// ```
pub fn schedule_circuit(circuit: &Circuit) -> CompileResult<Circuit> {
    schedule_with_stats(circuit).map(|(scheduled, _)| scheduled)
}

/// Schedule a circuit and report what was done.
#[instrument(skip_all, fields(qubits = circuit.num_qubits(), macros = circuit.macros.len()))]
pub fn schedule_with_stats(circuit: &Circuit) -> CompileResult<(Circuit, ScheduleStats)> {
    let universe = circuit.universe();
    let mut stats = ScheduleStats::default();

    let body = match circuit.body.kind {
        BlockKind::Sequential => rewrite_sequential(&circuit.body, &universe, true, &mut stats)?,
        BlockKind::Unscheduled => schedule_block(&circuit.body, &universe, &mut stats)?,
        BlockKind::Parallel => {
            return Err(CompileError::MalformedCircuit(
                "top-level body must be a sequential block".into(),
            ));
        }
    };

    let mut scheduled = Circuit {
        constants: circuit.constants.clone(),
        registers: circuit.registers.clone(),
        macros: circuit.macros.clone(),
        native_gates: circuit.native_gates.clone(),
        body,
    };
    for m in scheduled.macros.values_mut() {
        debug!("Scheduling macro {}", m.name);
        // Formals are one-slot pseudo-registers inside the body.
        let scope = universe.clone().with_parameters(&m.parameters);
        m.body = rewrite_block(&m.body, &scope, &mut stats)?;
    }
    Ok((scheduled, stats))
}

fn rewrite_block(
    block: &Block,
    universe: &QubitUniverse<'_>,
    stats: &mut ScheduleStats,
) -> CompileResult<Block> {
    match block.kind {
        BlockKind::Unscheduled => schedule_block(block, universe, stats),
        BlockKind::Sequential => rewrite_sequential(block, universe, false, stats),
        BlockKind::Parallel => rewrite_parallel(block, universe, stats),
    }
}

fn rewrite_statement(
    statement: &Statement,
    universe: &QubitUniverse<'_>,
    stats: &mut ScheduleStats,
) -> CompileResult<Statement> {
    Ok(match statement {
        Statement::Gate(gate) => Statement::Gate(gate.clone()),
        Statement::Block(block) => rewrite_block(block, universe, stats)?.into(),
        Statement::Loop(lp) => rewrite_loop(lp, universe, stats)?.into(),
    })
}

fn rewrite_loop(
    lp: &LoopStatement,
    universe: &QubitUniverse<'_>,
    stats: &mut ScheduleStats,
) -> CompileResult<LoopStatement> {
    Ok(LoopStatement {
        iterations: lp.iterations.clone(),
        body: rewrite_block(&lp.body, universe, stats)?,
    })
}

/// Rewrite children and splice nested sequential blocks into this one.
///
/// Scheduled unscheduled children are always spliced. Authored sequential
/// children of the top-level body stay nested.
fn rewrite_sequential(
    block: &Block,
    universe: &QubitUniverse<'_>,
    top_level: bool,
    stats: &mut ScheduleStats,
) -> CompileResult<Block> {
    let mut statements = Vec::with_capacity(block.len());
    for statement in block {
        match statement {
            Statement::Block(child) if child.is_unscheduled() => {
                statements.extend(schedule_block(child, universe, stats)?.statements);
            }
            Statement::Block(child) if child.is_sequential() => {
                let inner = rewrite_sequential(child, universe, false, stats)?;
                if top_level {
                    statements.push(inner.into());
                } else {
                    statements.extend(inner.statements);
                }
            }
            other => statements.push(rewrite_statement(other, universe, stats)?),
        }
    }
    Ok(Block::sequential(statements))
}

fn rewrite_parallel(
    block: &Block,
    universe: &QubitUniverse<'_>,
    stats: &mut ScheduleStats,
) -> CompileResult<Block> {
    let statements = block
        .iter()
        .map(|s| rewrite_statement(s, universe, stats))
        .collect::<CompileResult<_>>()?;
    Ok(Block::parallel(statements))
}

/// Rewrite one unscheduled block into a sequential block of moments.
fn schedule_block(
    block: &Block,
    universe: &QubitUniverse<'_>,
    stats: &mut ScheduleStats,
) -> CompileResult<Block> {
    let mut timeline = Timeline::new();
    for statement in block {
        place(statement, None, &mut timeline, universe, stats)?;
    }
    let moments = timeline.len();
    let (scheduled, block_stats) = timeline.finish();
    debug!(
        "Scheduled {} statements into {} moments",
        block.len(),
        moments
    );
    *stats += block_stats;
    Ok(scheduled)
}

/// Place a statement no earlier than one past `after`.
///
/// Returns the moment the statement (or the last member of a sequence)
/// landed in, or `after` unchanged for an empty block.
fn place(
    statement: &Statement,
    after: Option<usize>,
    timeline: &mut Timeline,
    universe: &QubitUniverse<'_>,
    stats: &mut ScheduleStats,
) -> CompileResult<Option<usize>> {
    let index = match statement {
        Statement::Gate(gate) => {
            let usage = universe.gate_usage(gate)?;
            let placed = Statement::Gate(gate.clone());
            if is_parallelizable_gate(gate) {
                timeline.place(placed, usage, after)
            } else {
                timeline.isolate(placed, usage)
            }
        }
        Statement::Loop(lp) => {
            let rewritten = rewrite_loop(lp, universe, stats)?;
            let usage = universe.block_usage(&rewritten.body)?;
            timeline.isolate(rewritten.into(), usage)
        }
        Statement::Block(block) => match block.kind {
            BlockKind::Sequential => {
                return place_sequence(&block.statements, after, timeline, universe, stats);
            }
            BlockKind::Unscheduled => {
                let inner = schedule_block(block, universe, stats)?;
                return place_sequence(&inner.statements, after, timeline, universe, stats);
            }
            BlockKind::Parallel => {
                let rewritten = rewrite_parallel(block, universe, stats)?;
                if rewritten.is_empty() {
                    return Ok(after);
                }
                let usage = universe.block_usage(&rewritten)?;
                if is_parallelizable_block(&rewritten) {
                    timeline.place_group(rewritten, usage, after)
                } else {
                    timeline.isolate(rewritten.into(), usage)
                }
            }
        },
    };
    trace!("Placed statement in moment {index}");
    Ok(Some(index))
}

/// Place the members of a sequential sub-block one after another.
fn place_sequence(
    statements: &[Statement],
    after: Option<usize>,
    timeline: &mut Timeline,
    universe: &QubitUniverse<'_>,
    stats: &mut ScheduleStats,
) -> CompileResult<Option<usize>> {
    let mut last = after;
    for statement in statements {
        last = place(statement, last, timeline, universe, stats)?;
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaqal_ir::{Argument, NativeGateSet};

    fn circuit(size: usize) -> Circuit {
        let mut c = Circuit::new(NativeGateSet::qscout());
        c.register("q", size).unwrap();
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
    fn test_two_gates_on_same_qubit_stay_ordered() {
        let mut c = circuit(1);
        let block = Block::unscheduled(vec![g(&c, "Px", &[0]), g(&c, "Py", &[0])]);
        c.body.statements.push(block.into());

        let out = schedule_circuit(&c).unwrap();
        assert_eq!(
            out.body,
            Block::sequential(vec![g(&c, "Px", &[0]), g(&c, "Py", &[0])])
        );
    }

    #[test]
    fn test_parallel_top_level_body_rejected() {
        let mut c = circuit(1);
        c.body = Block::parallel(vec![]);
        let err = schedule_circuit(&c).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_unscheduled_top_level_body_is_scheduled() {
        let mut c = circuit(2);
        c.body = Block::unscheduled(vec![g(&c, "Px", &[0]), g(&c, "Py", &[1])]);
        let out = schedule_circuit(&c).unwrap();
        assert!(out.body.is_sequential());
        assert_eq!(out.body.len(), 1);
    }

    #[test]
    fn test_empty_parallel_block_is_dropped() {
        let mut c = circuit(1);
        let block = Block::unscheduled(vec![Block::parallel(vec![]).into(), g(&c, "Px", &[0])]);
        c.body.statements.push(block.into());
        let out = schedule_circuit(&c).unwrap();
        assert_eq!(out.body, Block::sequential(vec![g(&c, "Px", &[0])]));
    }

    #[test]
    fn test_stats_reported_through_pass() {
        let mut c = circuit(2);
        let block = Block::unscheduled(vec![
            g(&c, "prepare_all", &[]),
            g(&c, "Px", &[0]),
            g(&c, "Py", &[1]),
            g(&c, "measure_all", &[]),
        ]);
        c.body.statements.push(block.into());

        let mut props = PropertySet::new();
        ParallelScheduler.run(&mut c, &mut props).unwrap();
        let stats = props.get::<ScheduleStats>().unwrap();
        assert_eq!(stats.blocks_scheduled, 1);
        assert_eq!(stats.moments, 3);
        assert_eq!(stats.parallel_moments, 1);
        assert_eq!(stats.statements_placed, 4);
        assert!(!c.body.contains_unscheduled());
    }

    #[test]
    fn test_macro_call_is_isolated() {
        let mut c = circuit(2);
        let params = vec!["a".to_string()];
        let body = Block::sequential(vec![
            c.gate_in_scope("Pz", vec![Argument::Ref("a".into())], &params)
                .unwrap()
                .into(),
        ]);
        c.define_macro("Flip", params, body).unwrap();
        let call: Statement = c
            .gate("Flip", vec![c.qubit("q", 0).unwrap().into()])
            .unwrap()
            .into();
        let block = Block::unscheduled(vec![call.clone(), g(&c, "Px", &[1])]);
        c.body.statements.push(block.into());

        let out = schedule_circuit(&c).unwrap();
        // Px on q[1] cannot join the macro's moment, so it opens its own.
        assert_eq!(out.body, Block::sequential(vec![call, g(&c, "Px", &[1])]));
    }
}
