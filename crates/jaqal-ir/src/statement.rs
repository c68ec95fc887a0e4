//! Statements: gate calls, blocks and loops.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::{GateDefinition, GateKind, is_barrier_gate};
use crate::register::NamedQubit;

/// A value bound to a gate parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    /// A literal number.
    Number(f64),
    /// A register slot.
    Qubit(NamedQubit),
    /// A named constant or a macro parameter.
    Ref(String),
}

impl Argument {
    /// Get the qubit if this argument is one.
    pub fn as_qubit(&self) -> Option<&NamedQubit> {
        match self {
            Argument::Qubit(q) => Some(q),
            _ => None,
        }
    }
}

impl From<NamedQubit> for Argument {
    fn from(q: NamedQubit) -> Self {
        Argument::Qubit(q)
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Number(value)
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Number(f64::from(value))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Number(v) => write!(f, "{v}"),
            Argument::Qubit(q) => write!(f, "{q}"),
            Argument::Ref(name) => write!(f, "{name}"),
        }
    }
}

/// A single gate invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCall {
    name: String,
    kind: GateKind,
    #[serde(default)]
    args: Vec<Argument>,
}

impl GateCall {
    /// Create a call to a native gate.
    ///
    /// No validation is done; use [`crate::Circuit::gate`] for checked construction.
    pub fn native(definition: GateDefinition, args: Vec<Argument>) -> Self {
        Self {
            name: definition.name.clone(),
            kind: GateKind::Native(definition),
            args,
        }
    }

    /// Create a call to a macro.
    pub fn macro_call(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            kind: GateKind::Macro,
            args,
        }
    }

    /// The gate name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the gate is implemented.
    #[inline]
    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    /// Bound argument values.
    #[inline]
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Check if this calls a native gate.
    pub fn is_native(&self) -> bool {
        matches!(self.kind, GateKind::Native(_))
    }

    /// Check if this calls a macro.
    pub fn is_macro(&self) -> bool {
        matches!(self.kind, GateKind::Macro)
    }

    /// Check if this is `prepare_all` or `measure_all`.
    pub fn is_barrier(&self) -> bool {
        self.is_native() && is_barrier_gate(&self.name)
    }

    /// Arguments bound to qubit parameters of a native gate.
    ///
    /// For macro calls every argument is returned, since macro parameters are
    /// untyped.
    pub fn quantum_args(&self) -> impl Iterator<Item = &Argument> {
        let kinds: Vec<bool> = match &self.kind {
            GateKind::Native(def) => def.parameters.iter().map(|p| p.kind.is_quantum()).collect(),
            GateKind::Macro => vec![true; self.args.len()],
        };
        self.args
            .iter()
            .zip(kinds)
            .filter_map(|(arg, quantum)| quantum.then_some(arg))
    }

    /// Number of qubit parameters of the bound native definition.
    pub fn num_quantum_parameters(&self) -> Option<usize> {
        self.kind.native().map(GateDefinition::num_qubits)
    }
}

impl fmt::Display for GateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Execution mode of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Statements run one at a time in listed order.
    Sequential,
    /// Statements run simultaneously.
    Parallel,
    /// Statements are only partially ordered and await scheduling.
    Unscheduled,
}

/// An ordered list of statements with an execution mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Execution mode.
    pub kind: BlockKind,
    /// Child statements.
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Block {
    /// Create a block of the given kind.
    pub fn new(kind: BlockKind, statements: Vec<Statement>) -> Self {
        Self { kind, statements }
    }

    /// Create a sequential block.
    pub fn sequential(statements: Vec<Statement>) -> Self {
        Self::new(BlockKind::Sequential, statements)
    }

    /// Create a parallel block.
    pub fn parallel(statements: Vec<Statement>) -> Self {
        Self::new(BlockKind::Parallel, statements)
    }

    /// Create an unscheduled block.
    pub fn unscheduled(statements: Vec<Statement>) -> Self {
        Self::new(BlockKind::Unscheduled, statements)
    }

    /// Check if the block is sequential.
    pub fn is_sequential(&self) -> bool {
        self.kind == BlockKind::Sequential
    }

    /// Check if the block is parallel.
    pub fn is_parallel(&self) -> bool {
        self.kind == BlockKind::Parallel
    }

    /// Check if the block awaits scheduling.
    pub fn is_unscheduled(&self) -> bool {
        self.kind == BlockKind::Unscheduled
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Check if the block has no children.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterate direct children.
    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Check whether any block at any depth is unscheduled.
    pub fn contains_unscheduled(&self) -> bool {
        self.is_unscheduled()
            || self.statements.iter().any(|s| match s {
                Statement::Gate(_) => false,
                Statement::Block(b) => b.contains_unscheduled(),
                Statement::Loop(l) => l.body.contains_unscheduled(),
            })
    }

    /// Count gate calls at any depth (loop bodies counted once).
    pub fn gate_count(&self) -> usize {
        self.statements
            .iter()
            .map(|s| match s {
                Statement::Gate(_) => 1,
                Statement::Block(b) => b.gate_count(),
                Statement::Loop(l) => l.body.gate_count(),
            })
            .sum()
    }
}

impl<'a> IntoIterator for &'a Block {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

/// Iteration count of a loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopCount {
    /// A literal count.
    Fixed(u64),
    /// A named constant or macro parameter.
    Symbol(String),
}

impl fmt::Display for LoopCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopCount::Fixed(n) => write!(f, "{n}"),
            LoopCount::Symbol(name) => write!(f, "{name}"),
        }
    }
}

/// A block repeated a number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopStatement {
    /// How many times the body runs.
    pub iterations: LoopCount,
    /// The repeated body.
    pub body: Block,
}

impl LoopStatement {
    /// Create a loop.
    pub fn new(iterations: impl Into<LoopCount>, body: Block) -> Self {
        Self {
            iterations: iterations.into(),
            body,
        }
    }

    /// Create a loop with a literal iteration count.
    pub fn fixed(count: u64, body: Block) -> Self {
        Self::new(LoopCount::Fixed(count), body)
    }
}

impl From<u64> for LoopCount {
    fn from(n: u64) -> Self {
        LoopCount::Fixed(n)
    }
}

impl From<&str> for LoopCount {
    fn from(name: &str) -> Self {
        LoopCount::Symbol(name.to_string())
    }
}

/// A statement of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// A gate call.
    Gate(GateCall),
    /// A nested block.
    Block(Block),
    /// A loop.
    Loop(LoopStatement),
}

impl Statement {
    /// Get the gate call, if this is one.
    pub fn as_gate(&self) -> Option<&GateCall> {
        match self {
            Statement::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Get the block, if this is one.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Statement::Block(b) => Some(b),
            _ => None,
        }
    }

    /// Check if this is a loop.
    pub fn is_loop(&self) -> bool {
        matches!(self, Statement::Loop(_))
    }
}

impl From<GateCall> for Statement {
    fn from(g: GateCall) -> Self {
        Statement::Gate(g)
    }
}

impl From<Block> for Statement {
    fn from(b: Block) -> Self {
        Statement::Block(b)
    }
}

impl From<LoopStatement> for Statement {
    fn from(l: LoopStatement) -> Self {
        Statement::Loop(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{NativeGateSet, PREPARE_ALL};

    fn px(index: usize) -> GateCall {
        let def = NativeGateSet::qscout().get("Px").cloned().unwrap();
        GateCall::native(def, vec![NamedQubit::new("q", index).into()])
    }

    #[test]
    fn test_gate_call_accessors() {
        let g = px(1);
        assert_eq!(g.name(), "Px");
        assert!(g.is_native());
        assert!(!g.is_barrier());
        assert_eq!(g.num_quantum_parameters(), Some(1));
        assert_eq!(format!("{g}"), "Px q[1]");
    }

    #[test]
    fn test_quantum_args_skip_classical() {
        let def = NativeGateSet::qscout().get("Rx").cloned().unwrap();
        let g = GateCall::native(def, vec![NamedQubit::new("q", 0).into(), 1.5.into()]);
        let quantum: Vec<_> = g.quantum_args().collect();
        assert_eq!(quantum.len(), 1);
        assert_eq!(quantum[0].as_qubit(), Some(&NamedQubit::new("q", 0)));
    }

    #[test]
    fn test_barrier_gate() {
        let def = NativeGateSet::qscout().get(PREPARE_ALL).cloned().unwrap();
        assert!(GateCall::native(def, vec![]).is_barrier());
        assert!(!GateCall::macro_call(PREPARE_ALL, vec![]).is_barrier());
    }

    #[test]
    fn test_block_queries() {
        let inner = Block::unscheduled(vec![px(0).into()]);
        let body = Block::sequential(vec![
            px(1).into(),
            LoopStatement::fixed(3, inner).into(),
        ]);
        assert!(body.contains_unscheduled());
        assert_eq!(body.gate_count(), 2);
        assert_eq!(body.len(), 2);
    }
}
