//! Native gate definitions and the native gate table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the gate that prepares every qubit.
pub const PREPARE_ALL: &str = "prepare_all";

/// Name of the gate that measures every qubit.
pub const MEASURE_ALL: &str = "measure_all";

/// Check whether a gate name is one of the whole-register barrier gates.
#[inline]
pub fn is_barrier_gate(name: &str) -> bool {
    name == PREPARE_ALL || name == MEASURE_ALL
}

/// The type of a gate parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// A single qubit.
    Qubit,
    /// A real number, e.g. an angle.
    Float,
    /// An integer.
    Int,
}

impl ParamType {
    /// Check if the parameter is qubit-valued.
    #[inline]
    pub fn is_quantum(self) -> bool {
        matches!(self, ParamType::Qubit)
    }
}

/// A formal parameter of a native gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub kind: ParamType,
}

impl Parameter {
    /// Create a qubit parameter.
    pub fn qubit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamType::Qubit,
        }
    }

    /// Create a real-valued parameter.
    pub fn float(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamType::Float,
        }
    }
}

/// A gate the hardware executes directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDefinition {
    /// Gate name.
    pub name: String,
    /// Ordered parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl GateDefinition {
    /// Create a definition from its parameters.
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Qubit-valued parameters, in order.
    pub fn quantum_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.kind.is_quantum())
    }

    /// Classical parameters, in order.
    pub fn classical_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| !p.kind.is_quantum())
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> usize {
        self.quantum_parameters().count()
    }
}

/// The table of native gates a circuit may call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<GateDefinition>", into = "Vec<GateDefinition>")]
pub struct NativeGateSet {
    gates: IndexMap<String, GateDefinition>,
}

impl NativeGateSet {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a gate definition, replacing any previous one of the same name.
    pub fn insert(&mut self, definition: GateDefinition) {
        self.gates.insert(definition.name.clone(), definition);
    }

    /// Look up a gate by name.
    pub fn get(&self, name: &str) -> Option<&GateDefinition> {
        self.gates.get(name)
    }

    /// Check whether a gate is native.
    pub fn contains(&self, name: &str) -> bool {
        self.gates.contains_key(name)
    }

    /// Iterate definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GateDefinition> {
        self.gates.values()
    }

    /// Number of gates in the table.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// The QSCOUT 1.0 trapped-ion gate set.
    pub fn qscout() -> Self {
        let q = || Parameter::qubit("q");
        let angle = || Parameter::float("angle");

        let mut set = Self::new();
        set.insert(GateDefinition::new(PREPARE_ALL, vec![]));
        set.insert(GateDefinition::new(MEASURE_ALL, vec![]));
        set.insert(GateDefinition::new(
            "R",
            vec![
                q(),
                Parameter::float("axis_angle"),
                Parameter::float("rotation_angle"),
            ],
        ));
        for name in ["Rx", "Ry", "Rz"] {
            set.insert(GateDefinition::new(name, vec![q(), angle()]));
        }
        for name in ["Px", "Py", "Pz", "Sx", "Sy", "Sz", "Sxd", "Syd", "Szd"] {
            set.insert(GateDefinition::new(name, vec![q()]));
        }
        set.insert(GateDefinition::new(
            "MS",
            vec![
                Parameter::qubit("q0"),
                Parameter::qubit("q1"),
                Parameter::float("axis_angle"),
                Parameter::float("rotation_angle"),
            ],
        ));
        set.insert(GateDefinition::new(
            "Sxx",
            vec![Parameter::qubit("q0"), Parameter::qubit("q1")],
        ));
        set
    }
}

impl From<Vec<GateDefinition>> for NativeGateSet {
    fn from(definitions: Vec<GateDefinition>) -> Self {
        let mut set = Self::new();
        for definition in definitions {
            set.insert(definition);
        }
        set
    }
}

impl From<NativeGateSet> for Vec<GateDefinition> {
    fn from(set: NativeGateSet) -> Self {
        set.gates.into_values().collect()
    }
}

/// How a gate call is implemented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "definition", rename_all = "snake_case")]
pub enum GateKind {
    /// A native gate, with its definition bound at construction.
    Native(GateDefinition),
    /// A call to a macro declared in the circuit.
    Macro,
}

impl GateKind {
    /// Get the bound native definition, if any.
    #[inline]
    pub fn native(&self) -> Option<&GateDefinition> {
        match self {
            GateKind::Native(def) => Some(def),
            GateKind::Macro => None,
        }
    }
}
