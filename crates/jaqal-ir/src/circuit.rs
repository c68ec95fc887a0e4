//! The top-level circuit container.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{GateKind, NativeGateSet, ParamType};
use crate::register::{NamedQubit, Registers, Selection};
use crate::statement::{Argument, Block, GateCall, LoopCount, Statement};
use crate::usage::QubitUniverse;

/// A user-defined composite gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macro {
    /// Macro name.
    pub name: String,
    /// Formal parameter names, bound positionally at the call site.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Macro body.
    pub body: Block,
}

impl Macro {
    /// Create a macro.
    pub fn new(name: impl Into<String>, parameters: Vec<String>, body: Block) -> Self {
        Self {
            name: name.into(),
            parameters,
            body,
        }
    }
}

/// A Jaqal circuit.
///
/// Holds named constants, registers and macros (all in declaration order),
/// the native gate table gate calls were bound against, and the body block.
/// Ownership is a tree: every statement has exactly one parent. Constants and
/// macros are referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Named numeric constants (`let`).
    #[serde(default)]
    pub constants: IndexMap<String, f64>,
    /// Fundamental and mapped registers.
    #[serde(default)]
    pub registers: Registers,
    /// Macro definitions.
    #[serde(default)]
    pub macros: IndexMap<String, Macro>,
    /// Native gates available to the circuit.
    #[serde(default = "NativeGateSet::qscout")]
    pub native_gates: NativeGateSet,
    /// The top-level body. Always sequential.
    #[serde(default = "empty_body")]
    pub body: Block,
}

fn empty_body() -> Block {
    Block::sequential(vec![])
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new(NativeGateSet::qscout())
    }
}

impl Circuit {
    /// Create an empty circuit over a native gate table.
    pub fn new(native_gates: NativeGateSet) -> Self {
        Self {
            constants: IndexMap::new(),
            registers: Registers::new(),
            macros: IndexMap::new(),
            native_gates,
            body: empty_body(),
        }
    }

    fn check_fresh(&self, name: &str) -> IrResult<()> {
        if self.registers.contains(name)
            || self.constants.contains_key(name)
            || self.macros.contains_key(name)
            || self.native_gates.contains(name)
        {
            return Err(IrError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Declare a fundamental register.
    pub fn register(&mut self, name: impl Into<String>, size: usize) -> IrResult<&mut Self> {
        let name = name.into();
        self.check_fresh(&name)?;
        self.registers.add_fundamental(name, size)?;
        Ok(self)
    }

    /// Declare a mapped register over an existing register.
    pub fn map(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        selection: Selection,
    ) -> IrResult<&mut Self> {
        let name = name.into();
        self.check_fresh(&name)?;
        self.registers.add_mapped(name, source, selection)?;
        Ok(self)
    }

    /// Declare a named constant.
    pub fn let_constant(&mut self, name: impl Into<String>, value: f64) -> IrResult<&mut Self> {
        let name = name.into();
        self.check_fresh(&name)?;
        self.constants.insert(name, value);
        Ok(self)
    }

    /// Declare a macro. Its body is validated with the formals in scope.
    pub fn define_macro(
        &mut self,
        name: impl Into<String>,
        parameters: Vec<String>,
        body: Block,
    ) -> IrResult<&mut Self> {
        let name = name.into();
        self.check_fresh(&name)?;
        for (i, p) in parameters.iter().enumerate() {
            if parameters[..i].contains(p) {
                return Err(IrError::DuplicateName(p.clone()));
            }
        }
        self.check_block(&body, &parameters)?;
        self.macros
            .insert(name.clone(), Macro::new(name, parameters, body));
        Ok(self)
    }

    /// Build a validated handle to `register[index]`.
    pub fn qubit(&self, register: &str, index: usize) -> IrResult<NamedQubit> {
        self.registers.qubit(register, index)
    }

    /// Look up a macro.
    pub fn get_macro(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    /// Total number of physical qubits.
    pub fn num_qubits(&self) -> usize {
        self.registers.fundamental().map(|(_, size)| size).sum()
    }

    /// The qubit universe of this circuit's fundamental registers.
    pub fn universe(&self) -> QubitUniverse<'_> {
        QubitUniverse::new(&self.registers)
    }

    /// Build a validated gate call at top level.
    ///
    /// References may only name constants.
    pub fn gate(&self, name: &str, args: Vec<Argument>) -> IrResult<GateCall> {
        self.gate_in_scope(name, args, &[])
    }

    /// Build a validated gate call inside a macro body whose formals are `scope`.
    pub fn gate_in_scope(
        &self,
        name: &str,
        args: Vec<Argument>,
        scope: &[String],
    ) -> IrResult<GateCall> {
        match self.check_call(name, &args, scope)? {
            GateKind::Native(def) => Ok(GateCall::native(def, args)),
            GateKind::Macro => Ok(GateCall::macro_call(name, args)),
        }
    }

    /// Re-check every gate call, loop count and macro body.
    ///
    /// Circuits built through [`Circuit::gate`] are valid by construction; this
    /// exists for circuits that arrive through deserialization.
    pub fn validate(&self) -> IrResult<()> {
        for m in self.macros.values() {
            self.check_block(&m.body, &m.parameters)?;
        }
        self.check_block(&self.body, &[])
    }

    fn check_block(&self, block: &Block, scope: &[String]) -> IrResult<()> {
        for statement in block {
            match statement {
                Statement::Gate(g) => {
                    let kind = self.check_call(g.name(), g.args(), scope)?;
                    if &kind != g.kind() {
                        return Err(IrError::UnknownGate(g.name().to_string()));
                    }
                }
                Statement::Block(b) => self.check_block(b, scope)?,
                Statement::Loop(l) => {
                    if let LoopCount::Symbol(name) = &l.iterations {
                        self.check_reference(name, scope)?;
                    }
                    self.check_block(&l.body, scope)?;
                }
            }
        }
        Ok(())
    }

    fn check_reference(&self, name: &str, scope: &[String]) -> IrResult<()> {
        if self.constants.contains_key(name) || scope.iter().any(|p| p == name) {
            Ok(())
        } else {
            Err(IrError::UnresolvedReference(name.to_string()))
        }
    }

    fn check_qubit(&self, qubit: &NamedQubit, gate_name: &str) -> IrResult<()> {
        self.registers
            .qubit(&qubit.register, qubit.index)
            .map(|_| ())
            .map_err(|e| match e {
                IrError::RegisterNotFound { name, .. } => IrError::RegisterNotFound {
                    name,
                    gate_name: Some(gate_name.to_string()),
                },
                other => other,
            })
    }

    fn check_call(&self, name: &str, args: &[Argument], scope: &[String]) -> IrResult<GateKind> {
        if let Some(def) = self.native_gates.get(name) {
            if def.parameters.len() != args.len() {
                return Err(IrError::ArgumentCountMismatch {
                    gate_name: name.to_string(),
                    expected: def.parameters.len(),
                    got: args.len(),
                });
            }
            for (position, (param, arg)) in def.parameters.iter().zip(args).enumerate() {
                match (param.kind, arg) {
                    (ParamType::Qubit, Argument::Qubit(q)) => self.check_qubit(q, name)?,
                    (ParamType::Qubit, Argument::Ref(r)) => {
                        if !scope.iter().any(|p| p == r) {
                            return Err(IrError::UnresolvedReference(r.clone()));
                        }
                    }
                    (ParamType::Qubit, Argument::Number(_)) => {
                        return Err(IrError::ArgumentKindMismatch {
                            gate_name: name.to_string(),
                            position,
                            expected: "a qubit",
                        });
                    }
                    (_, Argument::Number(_)) => {}
                    (_, Argument::Ref(r)) => self.check_reference(r, scope)?,
                    (_, Argument::Qubit(_)) => {
                        return Err(IrError::ArgumentKindMismatch {
                            gate_name: name.to_string(),
                            position,
                            expected: "a number",
                        });
                    }
                }
            }
            return Ok(GateKind::Native(def.clone()));
        }

        let Some(m) = self.macros.get(name) else {
            return Err(IrError::UnknownGate(name.to_string()));
        };
        if m.parameters.len() != args.len() {
            return Err(IrError::ArgumentCountMismatch {
                gate_name: name.to_string(),
                expected: m.parameters.len(),
                got: args.len(),
            });
        }
        for arg in args {
            match arg {
                Argument::Qubit(q) => self.check_qubit(q, name)?,
                Argument::Ref(r) => self.check_reference(r, scope)?,
                Argument::Number(_) => {}
            }
        }
        Ok(GateKind::Macro)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit() -> Circuit {
        let mut c = Circuit::default();
        c.register("q", 3).unwrap().let_constant("pi2", 1.57).unwrap();
        c
    }

    #[test]
    fn test_gate_validation() {
        let c = circuit();
        let q0 = c.qubit("q", 0).unwrap();
        let g = c.gate("Rx", vec![q0.clone().into(), Argument::Ref("pi2".into())]).unwrap();
        assert!(g.is_native());

        assert!(matches!(
            c.gate("Rx", vec![q0.clone().into()]),
            Err(IrError::ArgumentCountMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            c.gate("Rx", vec![0.5.into(), 0.5.into()]),
            Err(IrError::ArgumentKindMismatch { position: 0, .. })
        ));
        assert!(matches!(
            c.gate("Rx", vec![q0.into(), Argument::Ref("theta".into())]),
            Err(IrError::UnresolvedReference(_))
        ));
        assert!(matches!(c.gate("H", vec![]), Err(IrError::UnknownGate(_))));
    }

    #[test]
    fn test_gate_qubit_out_of_range() {
        let c = circuit();
        let err = c
            .gate("Px", vec![NamedQubit::new("q", 3).into()])
            .unwrap_err();
        assert!(matches!(err, IrError::QubitIndexOutOfRange { size: 3, .. }));
    }

    #[test]
    fn test_names_are_unique() {
        let mut c = circuit();
        assert!(matches!(c.register("pi2", 1), Err(IrError::DuplicateName(_))));
        assert!(matches!(
            c.define_macro("Px", vec![], Block::sequential(vec![])),
            Err(IrError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_macro_scope() {
        let mut c = circuit();
        let params = vec!["a".to_string()];
        let body = Block::sequential(vec![
            c.gate_in_scope("Pz", vec![Argument::Ref("a".into())], &params)
                .unwrap()
                .into(),
        ]);
        c.define_macro("Flip", params, body).unwrap();

        let call = c.gate("Flip", vec![c.qubit("q", 1).unwrap().into()]).unwrap();
        assert!(call.is_macro());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_catches_bad_deserialized_call() {
        let mut c = circuit();
        let def = c.native_gates.get("Px").cloned().unwrap();
        c.body
            .statements
            .push(GateCall::native(def, vec![NamedQubit::new("r", 0).into()]).into());
        assert!(matches!(
            c.validate(),
            Err(IrError::RegisterNotFound { .. })
        ));
    }

    #[test]
    fn test_serde_json_roundtrip_keeps_equality() {
        let mut c = circuit();
        c.map("tail", "q", Selection::range(1, 3)).unwrap();
        let g = c.gate("Px", vec![c.qubit("tail", 0).unwrap().into()]).unwrap();
        c.body.statements.push(g.into());

        let json = serde_json::to_string(&c).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.num_qubits(), 3);
    }
}
