//! Jaqal Emitter
//!
//! Writes a [`jaqal_ir::Circuit`] as Jaqal source text. Declarations come
//! first (`register`, `map`, `let`, then `macro`), followed by the body.
//!
//! | Construct | Output |
//! |-----------|--------|
//! | Register | `register q[4]` |
//! | Mapped register | `map pair q[0:2]` |
//! | Constant | `let angle 0.25` |
//! | Sequential block | `{ ... }` |
//! | Parallel block | `< ... >`, one member per line |
//! | Loop | `loop 5 { ... }` |
//!
//! There is no parser; circuits reach the emitter through the IR builder or
//! JSON.
//!
//! # Example
//!
//! ```rust
//! use jaqal_ir::{Block, Circuit, NativeGateSet};
//! use jaqal_emit::emit;
//!
//! let mut circuit = Circuit::new(NativeGateSet::qscout());
//! circuit.register("q", 2).unwrap();
//! let px = circuit.gate("Px", vec![circuit.qubit("q", 0).unwrap().into()]).unwrap();
//! let py = circuit.gate("Py", vec![circuit.qubit("q", 1).unwrap().into()]).unwrap();
//! circuit.body = Block::sequential(vec![Block::parallel(vec![px.into(), py.into()]).into()]);
//!
//! let jaqal = emit(&circuit).unwrap();
//! assert!(jaqal.starts_with("register q[2]\n"));
//! assert!(jaqal.contains("<\n    Px q[0]\n    Py q[1]\n>\n"));
//! ```

mod emitter;
mod error;

pub use emitter::emit;
pub use error::{EmitError, EmitResult};
