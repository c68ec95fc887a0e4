//! Property-based tests for mapped-register resolution and qubit usage.

use jaqal_ir::{Circuit, NamedQubit, NativeGateSet, Selection, UsageKey};
use proptest::prelude::*;

/// A fundamental register size together with a strided slice over it.
fn arb_slice() -> impl Strategy<Value = (usize, usize, usize, usize)> {
    (1_usize..=16).prop_flat_map(|size| {
        (Just(size), 0..size, 0..=size + 2, 1_usize..=4)
    })
}

proptest! {
    /// Resolving slot `i` of a slice lands on `start + i * step` of the source.
    #[test]
    fn slice_resolution_matches_arithmetic((size, start, stop, step) in arb_slice()) {
        let mut circuit = Circuit::new(NativeGateSet::qscout());
        circuit.register("q", size).unwrap();
        circuit.map("s", "q", Selection::Slice { start, stop, step }).unwrap();

        let len = circuit.registers.size_of("s").unwrap();
        for i in 0..len {
            let phys = circuit.registers.resolve(&NamedQubit::new("s", i)).unwrap();
            prop_assert_eq!(phys.register.as_str(), "q");
            prop_assert_eq!(phys.index, start + i * step);
            prop_assert!(phys.index < size);
        }
        prop_assert!(circuit.registers.resolve(&NamedQubit::new("s", len)).is_err());
    }

    /// A chain of whole-register aliases resolves to the same physical slot.
    #[test]
    fn alias_chain_is_transparent(size in 1_usize..=8, depth in 1_usize..=6, pick in 0_usize..8) {
        let mut circuit = Circuit::new(NativeGateSet::qscout());
        circuit.register("q", size).unwrap();
        let mut source = "q".to_string();
        for d in 0..depth {
            let name = format!("a{d}");
            circuit.map(name.as_str(), source.as_str(), Selection::Whole).unwrap();
            source = name;
        }
        let index = pick % size;
        let phys = circuit.registers.resolve(&NamedQubit::new(source, index)).unwrap();
        prop_assert_eq!(phys.index, index);
    }

    /// A single-qubit gate uses exactly the slot it names.
    #[test]
    fn single_qubit_usage(size in 1_usize..=8, pick in 0_usize..8) {
        let mut circuit = Circuit::new(NativeGateSet::qscout());
        circuit.register("q", size).unwrap();
        let q = circuit.qubit("q", pick % size).unwrap();
        let gate = circuit.gate("Px", vec![q.into()]).unwrap();

        let usage = circuit.universe().gate_usage(&gate).unwrap();
        prop_assert_eq!(usage.len(), 1);
        prop_assert!(usage.contains(&UsageKey::Register("q".into()), pick % size));
    }
}
