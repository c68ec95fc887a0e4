//! Qubit registers and named qubit handles.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// Which indices of a source register a mapped register exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Every index of the source, in order.
    Whole,
    /// A half-open, strided range of the source. `stop` is clamped to the
    /// source size.
    Slice {
        /// First source index.
        start: usize,
        /// One past the last source index.
        stop: usize,
        /// Stride, at least 1.
        step: usize,
    },
    /// An explicit list of source indices.
    Indices(Vec<usize>),
}

impl Selection {
    /// Create a unit-stride slice.
    pub fn range(start: usize, stop: usize) -> Self {
        Selection::Slice {
            start,
            stop,
            step: 1,
        }
    }

    /// Number of slots exposed when applied to a source of `source_size`.
    pub fn len(&self, source_size: usize) -> usize {
        match self {
            Selection::Whole => source_size,
            Selection::Slice { start, stop, step } => {
                let stop = (*stop).min(source_size);
                if *step == 0 || *start >= stop {
                    0
                } else {
                    (stop - start).div_ceil(*step)
                }
            }
            Selection::Indices(indices) => indices.len(),
        }
    }

    /// Whether the selection exposes no slots.
    pub fn is_empty(&self, source_size: usize) -> bool {
        self.len(source_size) == 0
    }

    /// Translate a slot of the mapped register to a source index.
    fn source_index(&self, index: usize) -> usize {
        match self {
            Selection::Whole => index,
            Selection::Slice { start, step, .. } => start + index * step,
            Selection::Indices(indices) => indices[index],
        }
    }
}

/// The storage kind of a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegisterKind {
    /// Owns `size` physical qubits.
    Fundamental {
        /// Number of qubits.
        size: usize,
    },
    /// An alias over (part of) another register.
    Mapped {
        /// The register this one is carved out of.
        source: String,
        /// Which source slots are exposed.
        selection: Selection,
    },
}

/// A named, ordered sequence of qubit slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// The register name.
    pub name: String,
    /// Fundamental or mapped.
    #[serde(flatten)]
    pub kind: RegisterKind,
}

impl Register {
    /// Create a fundamental register.
    pub fn fundamental(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            kind: RegisterKind::Fundamental { size },
        }
    }

    /// Create a mapped register.
    pub fn mapped(name: impl Into<String>, source: impl Into<String>, selection: Selection) -> Self {
        Self {
            name: name.into(),
            kind: RegisterKind::Mapped {
                source: source.into(),
                selection,
            },
        }
    }

    /// Check if this register owns physical qubits.
    pub fn is_fundamental(&self) -> bool {
        matches!(self.kind, RegisterKind::Fundamental { .. })
    }
}

/// A single slot of a register, as written in a gate call (`q[3]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedQubit {
    /// Register the slot belongs to; may be mapped.
    pub register: String,
    /// Index within that register.
    pub index: usize,
}

impl NamedQubit {
    /// Create a handle without validating it.
    pub fn new(register: impl Into<String>, index: usize) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for NamedQubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// A physical qubit: a fundamental register and an index into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysicalQubit {
    /// Name of the fundamental register.
    pub register: String,
    /// Physical index.
    pub index: usize,
}

/// The registers of a circuit, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registers {
    inner: IndexMap<String, Register>,
}

impl Registers {
    /// Create an empty register table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a fundamental register.
    pub fn add_fundamental(&mut self, name: impl Into<String>, size: usize) -> IrResult<()> {
        self.insert(Register::fundamental(name, size))
    }

    /// Declare a mapped register over an already declared one.
    pub fn add_mapped(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        selection: Selection,
    ) -> IrResult<()> {
        let register = Register::mapped(name, source, selection);
        if let RegisterKind::Mapped { source, selection } = &register.kind {
            let source_size = self.size_of(source)?;
            if let Selection::Indices(indices) = selection {
                if let Some(&bad) = indices.iter().find(|&&i| i >= source_size) {
                    return Err(IrError::QubitIndexOutOfRange {
                        register: source.clone(),
                        index: bad,
                        size: source_size,
                    });
                }
            }
        }
        self.insert(register)
    }

    fn insert(&mut self, register: Register) -> IrResult<()> {
        if self.inner.contains_key(&register.name) {
            return Err(IrError::DuplicateName(register.name));
        }
        self.inner.insert(register.name.clone(), register);
        Ok(())
    }

    /// Look up a register by name.
    pub fn get(&self, name: &str) -> Option<&Register> {
        self.inner.get(name)
    }

    /// Check whether a register is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Iterate all registers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Register> {
        self.inner.values()
    }

    /// Iterate fundamental registers with their sizes, in declaration order.
    pub fn fundamental(&self) -> impl Iterator<Item = (&str, usize)> {
        self.inner.values().filter_map(|r| match r.kind {
            RegisterKind::Fundamental { size } => Some((r.name.as_str(), size)),
            RegisterKind::Mapped { .. } => None,
        })
    }

    /// Number of declared registers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if no registers are declared.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of slots in a register, mapped or fundamental.
    pub fn size_of(&self, name: &str) -> IrResult<usize> {
        self.size_with_depth(name, 0)
    }

    fn size_with_depth(&self, name: &str, depth: usize) -> IrResult<usize> {
        if depth > self.inner.len() {
            return Err(IrError::CyclicRegisterMapping(name.to_string()));
        }
        let register = self.get(name).ok_or_else(|| IrError::RegisterNotFound {
            name: name.to_string(),
            gate_name: None,
        })?;
        match &register.kind {
            RegisterKind::Fundamental { size } => Ok(*size),
            RegisterKind::Mapped { source, selection } => {
                Ok(selection.len(self.size_with_depth(source, depth + 1)?))
            }
        }
    }

    /// Build a validated handle to `name[index]`.
    pub fn qubit(&self, name: &str, index: usize) -> IrResult<NamedQubit> {
        let size = self.size_of(name)?;
        if index >= size {
            return Err(IrError::QubitIndexOutOfRange {
                register: name.to_string(),
                index,
                size,
            });
        }
        Ok(NamedQubit::new(name, index))
    }

    /// Resolve a named qubit to its fundamental register and physical index.
    ///
    /// Follows mapped registers transitively. Pure: the table is not touched.
    pub fn resolve(&self, qubit: &NamedQubit) -> IrResult<PhysicalQubit> {
        let mut name = qubit.register.as_str();
        let mut index = qubit.index;
        for _ in 0..=self.inner.len() {
            let register = self.get(name).ok_or_else(|| IrError::RegisterNotFound {
                name: name.to_string(),
                gate_name: None,
            })?;
            match &register.kind {
                RegisterKind::Fundamental { size } => {
                    if index >= *size {
                        return Err(IrError::QubitIndexOutOfRange {
                            register: name.to_string(),
                            index,
                            size: *size,
                        });
                    }
                    return Ok(PhysicalQubit {
                        register: name.to_string(),
                        index,
                    });
                }
                RegisterKind::Mapped { source, selection } => {
                    let size = selection.len(self.size_of(source)?);
                    if index >= size {
                        return Err(IrError::QubitIndexOutOfRange {
                            register: name.to_string(),
                            index,
                            size,
                        });
                    }
                    index = selection.source_index(index);
                    name = source;
                }
            }
        }
        Err(IrError::CyclicRegisterMapping(qubit.register.clone()))
    }
}
