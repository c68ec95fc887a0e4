//! Qubit-usage analysis.
//!
//! Computes which physical qubits a statement touches, recursively. A block
//! uses the union of its children; a loop uses its body regardless of the
//! iteration count; `prepare_all` and `measure_all` use every qubit in the
//! universe.
//!
//! Inside a macro body, qubits are named by the macro's formal parameters
//! rather than by registers. Each formal becomes a one-slot pseudo-register
//! ([`UsageKey::Parameter`]) so that two statements on the same formal are
//! still seen as conflicting.

use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{IrError, IrResult};
use crate::gate::GateKind;
use crate::register::Registers;
use crate::statement::{Argument, Block, GateCall, Statement};

/// Identifies a group of qubit slots in a usage set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UsageKey {
    /// A fundamental register.
    Register(String),
    /// A macro formal parameter standing for one qubit.
    Parameter(String),
}

impl UsageKey {
    /// The register or parameter name.
    pub fn name(&self) -> &str {
        match self {
            UsageKey::Register(name) | UsageKey::Parameter(name) => name,
        }
    }
}

/// A set of used qubit indices, grouped by fundamental register.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QubitUsage {
    slots: BTreeMap<UsageKey, BTreeSet<usize>>,
}

impl QubitUsage {
    /// Create an empty usage set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a slot as used.
    pub fn insert(&mut self, key: UsageKey, index: usize) {
        self.slots.entry(key).or_default().insert(index);
    }

    /// Add every slot of `other`.
    pub fn extend(&mut self, other: &QubitUsage) {
        for (key, indices) in &other.slots {
            self.slots
                .entry(key.clone())
                .or_default()
                .extend(indices.iter().copied());
        }
    }

    /// Union of two usage sets.
    #[must_use]
    pub fn union(&self, other: &QubitUsage) -> QubitUsage {
        let mut out = self.clone();
        out.extend(other);
        out
    }

    /// Check whether a slot is used.
    pub fn contains(&self, key: &UsageKey, index: usize) -> bool {
        self.slots.get(key).is_some_and(|s| s.contains(&index))
    }

    /// Check that no slot is used by both sets.
    pub fn is_disjoint(&self, other: &QubitUsage) -> bool {
        self.slots.iter().all(|(key, indices)| {
            other
                .slots
                .get(key)
                .is_none_or(|theirs| indices.is_disjoint(theirs))
        })
    }

    /// Check whether no qubit is used.
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(BTreeSet::is_empty)
    }

    /// Total number of used slots.
    pub fn len(&self) -> usize {
        self.slots.values().map(BTreeSet::len).sum()
    }

    /// Iterate used slots as `(key, index)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&UsageKey, usize)> {
        self.slots
            .iter()
            .flat_map(|(key, indices)| indices.iter().map(move |&i| (key, i)))
    }

    /// Used indices of one register, if any.
    pub fn indices(&self, key: &UsageKey) -> Option<&BTreeSet<usize>> {
        self.slots.get(key)
    }
}

/// Every qubit slot that exists in a scheduling context.
///
/// Built once per circuit from its fundamental registers and threaded through
/// the analysis; macro bodies get a copy extended with the macro's formals.
#[derive(Debug, Clone)]
pub struct QubitUniverse<'c> {
    registers: &'c Registers,
    sizes: IndexMap<UsageKey, usize>,
    all: QubitUsage,
}

impl<'c> QubitUniverse<'c> {
    /// Create the universe of a circuit's fundamental registers.
    pub fn new(registers: &'c Registers) -> Self {
        let mut universe = Self {
            registers,
            sizes: IndexMap::new(),
            all: QubitUsage::new(),
        };
        for (name, size) in registers.fundamental() {
            universe.add_slots(UsageKey::Register(name.to_string()), size);
        }
        universe
    }

    /// Extend the universe with one slot per macro formal parameter.
    #[must_use]
    pub fn with_parameters<'p>(mut self, parameters: impl IntoIterator<Item = &'p String>) -> Self {
        for name in parameters {
            self.add_slots(UsageKey::Parameter(name.clone()), 1);
        }
        self
    }

    fn add_slots(&mut self, key: UsageKey, size: usize) {
        for index in 0..size {
            self.all.insert(key.clone(), index);
        }
        self.sizes.insert(key, size);
    }

    /// The register table qubits are resolved against.
    pub fn registers(&self) -> &'c Registers {
        self.registers
    }

    /// Number of slots behind a key.
    pub fn size(&self, key: &UsageKey) -> Option<usize> {
        self.sizes.get(key).copied()
    }

    /// Iterate keys with their sizes.
    pub fn iter(&self) -> impl Iterator<Item = (&UsageKey, usize)> {
        self.sizes.iter().map(|(k, &s)| (k, s))
    }

    /// Total number of slots.
    pub fn num_qubits(&self) -> usize {
        self.sizes.values().sum()
    }

    /// Usage set containing every slot.
    pub fn full(&self) -> &QubitUsage {
        &self.all
    }

    fn is_parameter(&self, name: &str) -> bool {
        self.sizes.contains_key(&UsageKey::Parameter(name.to_string()))
    }

    /// Qubits used by a statement, recursively.
    pub fn usage(&self, statement: &Statement) -> IrResult<QubitUsage> {
        match statement {
            Statement::Gate(gate) => self.gate_usage(gate),
            Statement::Block(block) => self.block_usage(block),
            Statement::Loop(lp) => self.block_usage(&lp.body),
        }
    }

    /// Union of the usage of a block's children.
    pub fn block_usage(&self, block: &Block) -> IrResult<QubitUsage> {
        let mut usage = QubitUsage::new();
        for statement in block {
            usage.extend(&self.usage(statement)?);
        }
        Ok(usage)
    }

    /// Qubits touched by a single gate call.
    pub fn gate_usage(&self, gate: &GateCall) -> IrResult<QubitUsage> {
        if gate.is_barrier() {
            return Ok(self.all.clone());
        }
        let native = matches!(gate.kind(), GateKind::Native(_));
        let mut usage = QubitUsage::new();
        for arg in gate.quantum_args() {
            match arg {
                Argument::Qubit(qubit) => {
                    let phys = self.registers.resolve(qubit).map_err(|e| match e {
                        IrError::RegisterNotFound { name, .. } => IrError::RegisterNotFound {
                            name,
                            gate_name: Some(gate.name().to_string()),
                        },
                        other => other,
                    })?;
                    usage.insert(UsageKey::Register(phys.register), phys.index);
                }
                Argument::Ref(name) if self.is_parameter(name) => {
                    usage.insert(UsageKey::Parameter(name.clone()), 0);
                }
                // Native gates only bind qubits or formals in quantum positions.
                Argument::Ref(name) if native => {
                    return Err(IrError::UnresolvedReference(name.clone()));
                }
                // Classical arguments of a macro call.
                Argument::Ref(_) | Argument::Number(_) => {}
            }
        }
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{MEASURE_ALL, NativeGateSet};
    use crate::register::{NamedQubit, Selection};
    use crate::statement::LoopStatement;

    fn registers() -> Registers {
        let mut regs = Registers::new();
        regs.add_fundamental("q", 3).unwrap();
        regs.add_fundamental("r", 2).unwrap();
        regs.add_mapped("tail", "q", Selection::range(1, 3)).unwrap();
        regs
    }

    fn gate(name: &str, args: Vec<Argument>) -> GateCall {
        GateCall::native(NativeGateSet::qscout().get(name).cloned().unwrap(), args)
    }

    #[test]
    fn test_gate_usage_resolves_mapped() {
        let regs = registers();
        let universe = QubitUniverse::new(&regs);
        let g = gate("Px", vec![NamedQubit::new("tail", 1).into()]);
        let usage = universe.gate_usage(&g).unwrap();
        assert!(usage.contains(&UsageKey::Register("q".into()), 2));
        assert_eq!(usage.len(), 1);
    }

    #[test]
    fn test_barrier_uses_everything() {
        let regs = registers();
        let universe = QubitUniverse::new(&regs);
        let usage = universe.gate_usage(&gate(MEASURE_ALL, vec![])).unwrap();
        assert_eq!(usage.len(), 5);
        assert_eq!(universe.num_qubits(), 5);
    }

    #[test]
    fn test_classical_args_ignored() {
        let regs = registers();
        let universe = QubitUniverse::new(&regs);
        let g = gate(
            "MS",
            vec![
                NamedQubit::new("q", 0).into(),
                NamedQubit::new("r", 1).into(),
                Argument::Ref("theta".into()),
                0.5.into(),
            ],
        );
        let usage = universe.gate_usage(&g).unwrap();
        assert_eq!(usage.len(), 2);
        assert!(usage.contains(&UsageKey::Register("r".into()), 1));
    }

    #[test]
    fn test_loop_usage_is_body_usage() {
        let regs = registers();
        let universe = QubitUniverse::new(&regs);
        let body = Block::sequential(vec![
            gate("Px", vec![NamedQubit::new("q", 0).into()]).into(),
            gate("Py", vec![NamedQubit::new("r", 0).into()]).into(),
        ]);
        let usage = universe
            .usage(&LoopStatement::fixed(10, body).into())
            .unwrap();
        assert_eq!(usage.len(), 2);
    }

    #[test]
    fn test_formal_parameters_are_slots() {
        let regs = registers();
        let formals = vec!["a".to_string(), "b".to_string()];
        let universe = QubitUniverse::new(&regs).with_parameters(&formals);
        let g = gate("Pz", vec![Argument::Ref("a".into())]);
        let usage = universe.gate_usage(&g).unwrap();
        assert!(usage.contains(&UsageKey::Parameter("a".into()), 0));
        assert_eq!(universe.num_qubits(), 7);
    }

    #[test]
    fn test_unresolved_qubit_reference() {
        let regs = registers();
        let universe = QubitUniverse::new(&regs);
        let g = gate("Pz", vec![Argument::Ref("a".into())]);
        assert!(matches!(
            universe.gate_usage(&g),
            Err(IrError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn test_missing_register_names_gate() {
        let regs = registers();
        let universe = QubitUniverse::new(&regs);
        let g = gate("Pz", vec![NamedQubit::new("nope", 0).into()]);
        match universe.gate_usage(&g) {
            Err(IrError::RegisterNotFound { gate_name, .. }) => {
                assert_eq!(gate_name.as_deref(), Some("Pz"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_disjoint() {
        let mut a = QubitUsage::new();
        a.insert(UsageKey::Register("q".into()), 0);
        let mut b = QubitUsage::new();
        b.insert(UsageKey::Register("q".into()), 1);
        b.insert(UsageKey::Register("r".into()), 0);
        assert!(a.is_disjoint(&b));
        a.insert(UsageKey::Register("r".into()), 0);
        assert!(!a.is_disjoint(&b));
    }
}
