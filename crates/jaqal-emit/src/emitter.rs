//! Jaqal emitter for serializing circuits.

use jaqal_ir::{
    Argument, Block, BlockKind, Circuit, GateCall, LoopStatement, Macro, Register, RegisterKind,
    Selection, Statement,
};

use crate::error::{EmitError, EmitResult};

/// Emit a circuit as Jaqal source code.
///
/// Unscheduled blocks are written as sequential blocks.
pub fn emit(circuit: &Circuit) -> EmitResult<String> {
    let mut emitter = Emitter::new();
    emitter.emit_circuit(circuit)
}

/// Jaqal emitter.
struct Emitter {
    output: String,
    indent: usize,
}

impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> EmitResult<String> {
        // Declarations
        for register in circuit.registers.iter() {
            self.emit_register(register)?;
        }
        for (name, value) in &circuit.constants {
            let value = format_number(*value, || format!("constant '{name}'"))?;
            self.writeln(&format!("let {name} {value}"));
        }
        if !circuit.registers.is_empty() || !circuit.constants.is_empty() {
            self.writeln("");
        }

        for m in circuit.macros.values() {
            self.emit_macro(m)?;
            self.writeln("");
        }

        // Body
        for statement in &circuit.body {
            self.emit_statement(statement)?;
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn emit_register(&mut self, register: &Register) -> EmitResult<()> {
        match &register.kind {
            RegisterKind::Fundamental { size } => {
                self.writeln(&format!("register {}[{size}]", register.name));
            }
            RegisterKind::Mapped { source, selection } => {
                let target = match selection {
                    Selection::Whole => source.clone(),
                    Selection::Slice { start, stop, step } => {
                        format!("{source}{}", format_slice(*start, *stop, *step))
                    }
                    Selection::Indices(indices) => {
                        let (start, stop, step) = as_slice(indices)
                            .ok_or_else(|| EmitError::UnsupportedSelection(register.name.clone()))?;
                        format!("{source}{}", format_slice(start, stop, step))
                    }
                };
                self.writeln(&format!("map {} {target}", register.name));
            }
        }
        Ok(())
    }

    fn emit_macro(&mut self, m: &Macro) -> EmitResult<()> {
        let mut header = format!("macro {}", m.name);
        for p in &m.parameters {
            header.push(' ');
            header.push_str(p);
        }
        self.emit_block(&header, &m.body)
    }

    fn emit_statement(&mut self, statement: &Statement) -> EmitResult<()> {
        match statement {
            Statement::Gate(gate) => {
                let line = format_gate(gate)?;
                self.writeln(&line);
            }
            Statement::Block(block) => self.emit_block("", block)?,
            Statement::Loop(lp) => self.emit_loop(lp)?,
        }
        Ok(())
    }

    fn emit_loop(&mut self, lp: &LoopStatement) -> EmitResult<()> {
        self.emit_block(&format!("loop {}", lp.iterations), &lp.body)
    }

    /// Write `header`, the block's delimiters and its members one per line.
    fn emit_block(&mut self, header: &str, block: &Block) -> EmitResult<()> {
        let (open, close) = match block.kind {
            BlockKind::Parallel => ("<", ">"),
            BlockKind::Sequential | BlockKind::Unscheduled => ("{", "}"),
        };
        if header.is_empty() {
            self.writeln(open);
        } else {
            self.writeln(&format!("{header} {open}"));
        }

        self.indent += 1;
        for statement in block {
            self.emit_statement(statement)?;
        }
        self.indent -= 1;

        self.writeln(close);
        Ok(())
    }

    fn writeln(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str("    ");
            }
            self.output.push_str(line);
        }
        self.output.push('\n');
    }
}

fn format_gate(gate: &GateCall) -> EmitResult<String> {
    for arg in gate.args() {
        if let Argument::Number(value) = arg {
            format_number(*value, || format!("call to '{}'", gate.name()))?;
        }
    }
    Ok(gate.to_string())
}

fn format_number(value: f64, context: impl FnOnce() -> String) -> EmitResult<String> {
    if value.is_finite() {
        Ok(value.to_string())
    } else {
        Err(EmitError::NonFiniteNumber {
            value,
            context: context(),
        })
    }
}

fn format_slice(start: usize, stop: usize, step: usize) -> String {
    if step == 1 {
        format!("[{start}:{stop}]")
    } else {
        format!("[{start}:{stop}:{step}]")
    }
}

/// An index list as `(start, stop, step)` if it is an increasing
/// arithmetic progression.
fn as_slice(indices: &[usize]) -> Option<(usize, usize, usize)> {
    match indices {
        [] => Some((0, 0, 1)),
        [only] => Some((*only, only + 1, 1)),
        [first, second, ..] => {
            let step = second.checked_sub(*first).filter(|&s| s > 0)?;
            let regular = indices.windows(2).all(|w| w[1].checked_sub(w[0]) == Some(step));
            let last = indices[indices.len() - 1];
            regular.then_some((*first, last + 1, step))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaqal_ir::NativeGateSet;

    fn circuit() -> Circuit {
        let mut c = Circuit::new(NativeGateSet::qscout());
        c.register("q", 3).unwrap();
        c
    }

    fn g(c: &Circuit, name: &str, qubits: &[usize]) -> Statement {
        let args: Vec<Argument> = qubits
            .iter()
            .map(|&i| c.qubit("q", i).unwrap().into())
            .collect();
        c.gate(name, args).unwrap().into()
    }

    #[test]
    fn test_emit_scheduled_body() {
        let mut c = circuit();
        c.body = Block::sequential(vec![
            g(&c, "prepare_all", &[]),
            Block::parallel(vec![g(&c, "Px", &[0]), g(&c, "Py", &[1])]).into(),
            g(&c, "measure_all", &[]),
        ]);

        let text = emit(&c).unwrap();
        assert_eq!(
            text,
            "register q[3]\n\nprepare_all\n<\n    Px q[0]\n    Py q[1]\n>\nmeasure_all\n"
        );
    }

    #[test]
    fn test_emit_declarations() {
        let mut c = circuit();
        c.map("all", "q", Selection::Whole).unwrap();
        c.map("odd", "q", Selection::Slice { start: 1, stop: 3, step: 2 })
            .unwrap();
        c.map("head", "q", Selection::range(0, 2)).unwrap();
        c.let_constant("angle", 0.25).unwrap();

        let text = emit(&c).unwrap();
        assert!(text.contains("map all q\n"));
        assert!(text.contains("map odd q[1:3:2]\n"));
        assert!(text.contains("map head q[0:2]\n"));
        assert!(text.contains("let angle 0.25\n"));
    }

    #[test]
    fn test_emit_macro_and_loop() {
        let mut c = circuit();
        let params = vec!["a".to_string()];
        let body = Block::sequential(vec![
            c.gate_in_scope("Pz", vec![Argument::Ref("a".into())], &params)
                .unwrap()
                .into(),
        ]);
        c.define_macro("Flip", params, body).unwrap();
        c.body = Block::sequential(vec![
            jaqal_ir::LoopStatement::fixed(4, Block::sequential(vec![g(&c, "Flip", &[2])])).into(),
        ]);

        let text = emit(&c).unwrap();
        assert!(text.contains("macro Flip a {\n    Pz a\n}\n"));
        assert!(text.contains("loop 4 {\n    Flip q[2]\n}\n"));
    }

    #[test]
    fn test_unscheduled_written_as_sequential() {
        let mut c = circuit();
        c.body = Block::sequential(vec![Block::unscheduled(vec![g(&c, "Px", &[0])]).into()]);
        let text = emit(&c).unwrap();
        assert!(text.ends_with("{\n    Px q[0]\n}\n"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut c = circuit();
        c.let_constant("bad", f64::NAN).unwrap();
        assert!(matches!(
            emit(&c),
            Err(EmitError::NonFiniteNumber { .. })
        ));

        let mut c = circuit();
        let rz = c
            .gate("Rz", vec![c.qubit("q", 0).unwrap().into(), f64::INFINITY.into()])
            .unwrap();
        c.body = Block::sequential(vec![rz.into()]);
        let err = emit(&c).unwrap_err();
        assert!(err.to_string().contains("Rz"));
    }

    #[test]
    fn test_index_list_selection() {
        assert_eq!(as_slice(&[2]), Some((2, 3, 1)));
        assert_eq!(as_slice(&[0, 2, 4]), Some((0, 5, 2)));
        assert_eq!(as_slice(&[0, 1, 3]), None);
        assert_eq!(as_slice(&[2, 1]), None);

        let mut c = circuit();
        c.map("pick", "q", Selection::Indices(vec![2, 0])).unwrap();
        assert!(matches!(
            emit(&c),
            Err(EmitError::UnsupportedSelection(_))
        ));
    }
}
