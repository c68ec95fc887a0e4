//! Jaqal Compilation Framework
//!
//! This crate turns circuits with unscheduled blocks into circuits the
//! hardware can run: sequences of moments, each moment a single statement or
//! a parallel block of single-qubit native gates on distinct qubits.
//!
//! # Architecture
//!
//! ```text
//! Input Circuit (unscheduled blocks)
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- PropertySet (ScheduleStats, VerificationResult)
//! +-------------+
//!       |
//!       +-- ParallelScheduler
//!       +-- ScheduleVerification
//!       |
//!       v
//! Output Circuit (sequential / parallel blocks only)
//! ```
//!
//! # Example
//!
//! ```rust
//! use jaqal_compile::{PassManagerBuilder, ScheduleStats};
//! use jaqal_ir::{CircuitBuilder, NativeGateSet};
//!
//! let mut b = CircuitBuilder::new(NativeGateSet::qscout());
//! b.register("q", 2).unwrap();
//! b.begin_unscheduled();
//! b.gate("prepare_all", vec![]).unwrap();
//! b.gate("Px", vec![b.qubit("q", 0).unwrap().into()]).unwrap();
//! b.gate("Py", vec![b.qubit("q", 1).unwrap().into()]).unwrap();
//! b.gate("measure_all", vec![]).unwrap();
//! b.end_block().unwrap();
//! let mut circuit = b.build().unwrap();
//!
//! let (pm, mut props) = PassManagerBuilder::new().build();
//! pm.run(&mut circuit, &mut props).unwrap();
//!
//! // prepare_all, <Px q[0] | Py q[1]>, measure_all
//! assert_eq!(circuit.body.len(), 3);
//! assert_eq!(props.get::<ScheduleStats>().unwrap().parallel_moments, 1);
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use jaqal_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use jaqal_ir::Circuit;
//!
//! struct CountGates;
//!
//! impl Pass for CountGates {
//!     fn name(&self) -> &str { "count_gates" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, circuit: &mut Circuit, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(circuit.body.gate_count());
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod property;

// Built-in passes
pub mod passes;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{
    ParallelScheduler, ScheduleVerification, VerificationResult, schedule_circuit,
    schedule_with_stats, verify_schedule,
};
pub use property::{PropertySet, ScheduleStats};
