//! Jaqal Circuit Intermediate Representation
//!
//! This crate provides the tree-shaped circuit model that frontends build and
//! the scheduler in `jaqal-compile` rewrites.
//!
//! # Core Components
//!
//! - **Registers**: [`Registers`] holds fundamental registers (owning physical
//!   qubits) and mapped registers (aliases over a selection of another
//!   register). [`NamedQubit`] handles resolve to a [`PhysicalQubit`].
//! - **Gates**: [`NativeGateSet`] is the table of hardware gates, each a
//!   [`GateDefinition`] with typed parameters. [`GateCall`] binds arguments to
//!   a native gate or a macro.
//! - **Statements**: [`Statement`] is a gate call, a [`Block`] (sequential,
//!   parallel or unscheduled) or a [`LoopStatement`].
//! - **Circuit**: [`Circuit`] holds constants, registers, [`Macro`]s and the
//!   body. [`CircuitBuilder`] constructs one incrementally.
//! - **Usage**: [`QubitUniverse`] computes which physical qubits a statement
//!   touches.
//!
//! # Example
//!
//! ```rust
//! use jaqal_ir::{Circuit, NativeGateSet, Block};
//!
//! let mut circuit = Circuit::new(NativeGateSet::qscout());
//! circuit.register("q", 2).unwrap();
//!
//! let prepare = circuit.gate("prepare_all", vec![]).unwrap();
//! let px = circuit
//!     .gate("Px", vec![circuit.qubit("q", 0).unwrap().into()])
//!     .unwrap();
//! circuit
//!     .body
//!     .statements
//!     .push(Block::unscheduled(vec![prepare.into(), px.into()]).into());
//!
//! assert!(circuit.body.contains_unscheduled());
//! assert_eq!(circuit.num_qubits(), 2);
//! ```

pub mod builder;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod register;
pub mod statement;
pub mod usage;

pub use builder::CircuitBuilder;
pub use circuit::{Circuit, Macro};
pub use error::{IrError, IrResult};
pub use gate::{
    GateDefinition, GateKind, MEASURE_ALL, NativeGateSet, PREPARE_ALL, ParamType, Parameter,
    is_barrier_gate,
};
pub use register::{NamedQubit, PhysicalQubit, Register, RegisterKind, Registers, Selection};
pub use statement::{
    Argument, Block, BlockKind, GateCall, LoopCount, LoopStatement, Statement,
};
pub use usage::{QubitUniverse, QubitUsage, UsageKey};
