//! Fluent construction of circuits, the way frontends emit them.

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::NativeGateSet;
use crate::register::{NamedQubit, Selection};
use crate::statement::{Argument, Block, BlockKind, LoopCount, LoopStatement, Statement};

#[derive(Debug)]
enum FrameKind {
    Root,
    Block(BlockKind),
    Loop(LoopCount),
    Macro { name: String, parameters: Vec<String> },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    statements: Vec<Statement>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            statements: vec![],
        }
    }
}

/// Builds a [`Circuit`] statement by statement.
///
/// Blocks, loops and macro definitions are opened and closed explicitly;
/// gates go into the innermost open one. Gate calls are validated against the
/// circuit as it stands, with the formals of an open macro in scope.
///
/// ```rust
/// use jaqal_ir::{CircuitBuilder, NativeGateSet};
///
/// let mut b = CircuitBuilder::new(NativeGateSet::qscout());
/// b.register("q", 2).unwrap();
/// b.begin_unscheduled();
/// b.gate("prepare_all", vec![]).unwrap();
/// b.gate("Px", vec![b.qubit("q", 0).unwrap().into()]).unwrap();
/// b.barrier().unwrap();
/// b.gate_unless_last("measure_all").unwrap();
/// b.end_block().unwrap();
/// let circuit = b.build().unwrap();
/// assert_eq!(circuit.body.len(), 2);
/// ```
#[derive(Debug)]
pub struct CircuitBuilder {
    circuit: Circuit,
    stack: Vec<Frame>,
}

impl CircuitBuilder {
    /// Start an empty circuit.
    pub fn new(native_gates: NativeGateSet) -> Self {
        Self {
            circuit: Circuit::new(native_gates),
            stack: vec![Frame::new(FrameKind::Root)],
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The root frame is never popped.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn scope(&self) -> &[String] {
        self.stack
            .iter()
            .rev()
            .find_map(|f| match &f.kind {
                FrameKind::Macro { parameters, .. } => Some(parameters.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Declare a fundamental register.
    pub fn register(&mut self, name: &str, size: usize) -> IrResult<&mut Self> {
        self.circuit.register(name, size)?;
        Ok(self)
    }

    /// Declare a mapped register.
    pub fn map(&mut self, name: &str, source: &str, selection: Selection) -> IrResult<&mut Self> {
        self.circuit.map(name, source, selection)?;
        Ok(self)
    }

    /// Declare a named constant.
    pub fn let_constant(&mut self, name: &str, value: f64) -> IrResult<&mut Self> {
        self.circuit.let_constant(name, value)?;
        Ok(self)
    }

    /// Build a validated qubit handle.
    pub fn qubit(&self, register: &str, index: usize) -> IrResult<NamedQubit> {
        self.circuit.qubit(register, index)
    }

    /// Append a gate call to the innermost open block.
    pub fn gate(&mut self, name: &str, args: Vec<Argument>) -> IrResult<&mut Self> {
        let call = self.circuit.gate_in_scope(name, args, self.scope())?;
        self.top().statements.push(call.into());
        Ok(self)
    }

    /// Append an argument-less gate unless the innermost block already ends with it.
    pub fn gate_unless_last(&mut self, name: &str) -> IrResult<&mut Self> {
        let ends_with = self
            .top()
            .statements
            .last()
            .and_then(Statement::as_gate)
            .is_some_and(|g| g.name() == name);
        if ends_with {
            return Ok(self);
        }
        self.gate(name, vec![])
    }

    /// Open a block of the given kind.
    pub fn begin_block(&mut self, kind: BlockKind) -> &mut Self {
        self.stack.push(Frame::new(FrameKind::Block(kind)));
        self
    }

    /// Open a sequential block.
    pub fn begin_sequential(&mut self) -> &mut Self {
        self.begin_block(BlockKind::Sequential)
    }

    /// Open a parallel block.
    pub fn begin_parallel(&mut self) -> &mut Self {
        self.begin_block(BlockKind::Parallel)
    }

    /// Open an unscheduled block.
    pub fn begin_unscheduled(&mut self) -> &mut Self {
        self.begin_block(BlockKind::Unscheduled)
    }

    /// Close the innermost block.
    pub fn end_block(&mut self) -> IrResult<&mut Self> {
        let frame = self.pop("block", |k| matches!(k, FrameKind::Block(_)))?;
        if let FrameKind::Block(kind) = frame.kind {
            self.top()
                .statements
                .push(Block::new(kind, frame.statements).into());
        }
        Ok(self)
    }

    /// Close the current unscheduled region and open the next one.
    ///
    /// An empty region is dropped rather than emitted.
    pub fn barrier(&mut self) -> IrResult<&mut Self> {
        let frame = self.pop("unscheduled block", |k| {
            matches!(k, FrameKind::Block(BlockKind::Unscheduled))
        })?;
        if !frame.statements.is_empty() {
            self.top()
                .statements
                .push(Block::unscheduled(frame.statements).into());
        }
        Ok(self.begin_unscheduled())
    }

    /// Open a loop body.
    pub fn begin_loop(&mut self, iterations: impl Into<LoopCount>) -> &mut Self {
        self.stack.push(Frame::new(FrameKind::Loop(iterations.into())));
        self
    }

    /// Close the innermost loop.
    pub fn end_loop(&mut self) -> IrResult<&mut Self> {
        if let Some(Frame {
            kind: FrameKind::Loop(LoopCount::Symbol(name)),
            ..
        }) = self.stack.last()
        {
            let in_scope = self.stack[..self.stack.len() - 1]
                .iter()
                .rev()
                .find_map(|f| match &f.kind {
                    FrameKind::Macro { parameters, .. } => Some(parameters.contains(name)),
                    _ => None,
                })
                .unwrap_or(false);
            if !self.circuit.constants.contains_key(name) && !in_scope {
                return Err(IrError::UnresolvedReference(name.clone()));
            }
        }
        let frame = self.pop("loop", |k| matches!(k, FrameKind::Loop(_)))?;
        if let FrameKind::Loop(count) = frame.kind {
            let body = Block::sequential(frame.statements);
            self.top()
                .statements
                .push(LoopStatement::new(count, body).into());
        }
        Ok(self)
    }

    /// Start a macro definition. Only allowed at top level.
    pub fn begin_macro(&mut self, name: &str, parameters: &[&str]) -> IrResult<&mut Self> {
        if self.stack.len() != 1 {
            return Err(IrError::InvalidBuilderState(format!(
                "macro '{name}' must be defined at top level"
            )));
        }
        self.stack.push(Frame::new(FrameKind::Macro {
            name: name.to_string(),
            parameters: parameters.iter().map(|p| (*p).to_string()).collect(),
        }));
        Ok(self)
    }

    /// Finish the macro being defined and register it with the circuit.
    pub fn end_macro(&mut self) -> IrResult<&mut Self> {
        let frame = self.pop("macro", |k| matches!(k, FrameKind::Macro { .. }))?;
        if let FrameKind::Macro { name, parameters } = frame.kind {
            self.circuit
                .define_macro(name, parameters, Block::sequential(frame.statements))?;
        }
        Ok(self)
    }

    /// Pop the innermost frame if it is of the expected kind. The root frame
    /// is never popped.
    fn pop(&mut self, expected: &str, is_expected: impl Fn(&FrameKind) -> bool) -> IrResult<Frame> {
        if self.stack.len() == 1 {
            return Err(IrError::InvalidBuilderState(format!(
                "no open {expected} to close"
            )));
        }
        let top = &self.stack[self.stack.len() - 1];
        if !is_expected(&top.kind) {
            return Err(unbalanced(expected, &top.kind));
        }
        self.stack
            .pop()
            .ok_or_else(|| IrError::InvalidBuilderState("empty block stack".into()))
    }

    /// Finish the circuit. Fails if any block, loop or macro is still open.
    pub fn build(mut self) -> IrResult<Circuit> {
        if self.stack.len() != 1 {
            let open = &self.stack[self.stack.len() - 1].kind;
            return Err(IrError::InvalidBuilderState(format!(
                "{} left open",
                describe(open)
            )));
        }
        let root = self.top();
        let statements = std::mem::take(&mut root.statements);
        self.circuit.body = Block::sequential(statements);
        Ok(self.circuit)
    }
}

fn describe(kind: &FrameKind) -> String {
    match kind {
        FrameKind::Root => "body".into(),
        FrameKind::Block(kind) => format!("{kind:?} block").to_lowercase(),
        FrameKind::Loop(_) => "loop".into(),
        FrameKind::Macro { name, .. } => format!("macro '{name}'"),
    }
}

fn unbalanced(expected: &str, found: &FrameKind) -> IrError {
    IrError::InvalidBuilderState(format!(
        "expected to close a {expected}, found {}",
        describe(found)
    ))
}
