//! Two-pass assembler.
//!
//! Pass 1 records the instruction index of every label definition;
//! pass 2 emits the instruction vector with label operands resolved to
//! absolute indices. Lines hold either a single `name:` label or one
//! mnemonic with its operands; `;` starts a comment.
use std::collections::HashMap;

use log::trace;
use smol_str::SmolStr;

use crate::{
    bytecode::{Instr, SlotRef},
    error::AsmError,
};

pub struct Assembler<'a> {
    source: &'a str,
    labels: HashMap<SmolStr, usize>,
    instrs: Vec<Instr>,
}

impl<'a> Assembler<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            labels: HashMap::new(),
            instrs: Vec::new(),
        }
    }

    pub fn assemble(mut self) -> Result<Vec<Instr>, AsmError> {
        self.scan_labels()?;
        self.emit_instructions()?;
        trace!(
            "assembled {} instructions, {} labels",
            self.instrs.len(),
            self.labels.len()
        );
        Ok(self.instrs)
    }

    /// Pass 1: map label names to the index of the instruction that
    /// follows them.
    fn scan_labels(&mut self) -> Result<(), AsmError> {
        let mut index = 0;

        for (line_no, line) in lines(self.source) {
            if let Some(name) = label_name(line) {
                if !is_valid_label(name) {
                    return Err(AsmError::new(line_no, format!("invalid label '{}'", name)));
                }
                if self
                    .labels
                    .insert(SmolStr::from(name), index)
                    .is_some()
                {
                    return Err(AsmError::new(
                        line_no,
                        format!("duplicate label '{}'", name),
                    ));
                }
            } else {
                index += 1;
            }
        }

        Ok(())
    }

    /// Pass 2: parse each instruction line.
    fn emit_instructions(&mut self) -> Result<(), AsmError> {
        for (line_no, line) in lines(self.source) {
            if label_name(line).is_some() {
                continue;
            }

            // Commas only separate operands; treat them as whitespace.
            let normalized = line.replace(',', " ");
            let mut words = normalized.split_whitespace();
            let mnemonic = words
                .next()
                .unwrap_or_else(|| unreachable!("blank lines are filtered out"));
            let operands: Vec<&str> = words.collect();

            let instr = self.parse_instruction(line_no, mnemonic, &operands)?;
            self.instrs.push(instr);
        }

        Ok(())
    }

    #[rustfmt::skip]
    fn parse_instruction(
        &self,
        line_no: usize,
        mnemonic: &str,
        operands: &[&str],
    ) -> Result<Instr, AsmError> {
        use Instr as I;

        // Bare instructions carry no operands.
        let bare = match mnemonic {
            "dup"         => Some(I::Dup),
            "drop"        => Some(I::Drop),
            "add"         => Some(I::Add),
            "sub"         => Some(I::Sub),
            "mul"         => Some(I::Mul),
            "div"         => Some(I::Div),
            "mod"         => Some(I::Mod),
            "neg"         => Some(I::Neg),
            "eq"          => Some(I::Eq),
            "ne"          => Some(I::Ne),
            "lt"          => Some(I::Lt),
            "le"          => Some(I::Le),
            "gt"          => Some(I::Gt),
            "ge"          => Some(I::Ge),
            "and"         => Some(I::And),
            "or"          => Some(I::Or),
            "not"         => Some(I::Not),
            "ret"         => Some(I::Ret),
            "halt"        => Some(I::Halt),
            "cframe"      => Some(I::CloseFrame),
            "itof"        => Some(I::IntToFloat),
            "ftoi"        => Some(I::FloatToInt),
            "itoc"        => Some(I::IntToColour),
            "ctoi"        => Some(I::ColourToInt),
            "btoi"        => Some(I::BoolToInt),
            "itob"        => Some(I::IntToBool),
            "clear"       => Some(I::Clear),
            "write_pixel" => Some(I::WritePixel),
            "write_box"   => Some(I::WriteBox),
            "read_pixel"  => Some(I::ReadPixel),
            "width"       => Some(I::Width),
            "height"      => Some(I::Height),
            "rand"        => Some(I::Rand),
            "print"       => Some(I::Print),
            "delay"       => Some(I::Delay),
            _             => None,
        };

        if let Some(instr) = bare {
            return if operands.is_empty() {
                Ok(instr)
            } else {
                Err(AsmError::new(
                    line_no,
                    format!("'{}' takes no operands", mnemonic),
                ))
            };
        }

        match mnemonic {
            "push"   => self.parse_push(line_no, self.expect_one(line_no, mnemonic, operands)?),
            "pop"    => self.parse_pop(line_no, self.expect_one(line_no, mnemonic, operands)?),
            "jmp"    => Ok(I::Jmp(self.resolve_label(
                line_no,
                self.expect_one(line_no, mnemonic, operands)?,
            )?)),
            "jz"     => Ok(I::Jz(self.resolve_label(
                line_no,
                self.expect_one(line_no, mnemonic, operands)?,
            )?)),
            "jnz"    => Ok(I::Jnz(self.resolve_label(
                line_no,
                self.expect_one(line_no, mnemonic, operands)?,
            )?)),
            "oframe" => {
                let slots = self.expect_one(line_no, mnemonic, operands)?;
                let slots = slots.parse::<usize>().map_err(|_| {
                    AsmError::new(line_no, format!("invalid frame size '{}'", slots))
                })?;
                Ok(I::OpenFrame(slots))
            }
            "call"   => {
                if operands.len() != 2 {
                    return Err(AsmError::new(
                        line_no,
                        format!("'call' expects a label and an argument count, found {} operands", operands.len()),
                    ));
                }
                let target = self.resolve_label(line_no, operands[0])?;
                let args = operands[1].parse::<usize>().map_err(|_| {
                    AsmError::new(line_no, format!("invalid argument count '{}'", operands[1]))
                })?;
                Ok(I::Call { target, args })
            }
            _ => Err(AsmError::new(
                line_no,
                format!("unknown mnemonic '{}'", mnemonic),
            )),
        }
    }

    fn expect_one<'b>(
        &self,
        line_no: usize,
        mnemonic: &str,
        operands: &[&'b str],
    ) -> Result<&'b str, AsmError> {
        match operands {
            [operand] => Ok(*operand),
            _ => Err(AsmError::new(
                line_no,
                format!(
                    "'{}' expects one operand, found {}",
                    mnemonic,
                    operands.len()
                ),
            )),
        }
    }

    fn parse_push(&self, line_no: usize, operand: &str) -> Result<Instr, AsmError> {
        if let Some(reference) = operand.strip_prefix('+') {
            return Ok(Instr::PushIndexed(parse_slot_ref(line_no, reference)?));
        }
        if operand.starts_with('[') {
            return Ok(Instr::PushSlot(parse_slot_ref(line_no, operand)?));
        }
        if let Some(digits) = operand.strip_prefix('#') {
            return parse_colour(line_no, operand, digits).map(Instr::PushColour);
        }
        if let Ok(value) = operand.parse::<i32>() {
            return Ok(Instr::PushInt(value));
        }
        if let Ok(value) = operand.parse::<f64>() {
            return Ok(Instr::PushFloat(value));
        }
        Err(AsmError::new(
            line_no,
            format!("invalid push operand '{}'", operand),
        ))
    }

    fn parse_pop(&self, line_no: usize, operand: &str) -> Result<Instr, AsmError> {
        if let Some(reference) = operand.strip_prefix('+') {
            return Ok(Instr::PopIndexed(parse_slot_ref(line_no, reference)?));
        }
        if operand.starts_with('[') {
            return Ok(Instr::PopSlot(parse_slot_ref(line_no, operand)?));
        }
        Err(AsmError::new(
            line_no,
            format!("invalid pop operand '{}'", operand),
        ))
    }

    fn resolve_label(&self, line_no: usize, name: &str) -> Result<usize, AsmError> {
        self.labels.get(name).copied().ok_or_else(|| {
            AsmError::new(line_no, format!("unresolved label '{}'", name))
        })
    }
}

/// Meaningful lines with their 1-based line numbers; comments and
/// blanks removed.
fn lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| {
            let line = line.split(';').next().unwrap_or("").trim();
            (index + 1, line)
        })
        .filter(|(_, line)| !line.is_empty())
}

fn label_name(line: &str) -> Option<&str> {
    line.strip_suffix(':')
}

fn is_valid_label(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some('a'..='z' | 'A'..='Z' | '_') => {}
        _ => return false,
    }
    chars.all(|c| matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_'))
}

/// `[n]` or `[n:g]`, brackets included.
fn parse_slot_ref(line_no: usize, text: &str) -> Result<SlotRef, AsmError> {
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| AsmError::new(line_no, format!("invalid slot reference '{}'", text)))?;

    let (slot_text, global) = match inner.split_once(':') {
        None => (inner, false),
        Some((slot_text, "g")) => (slot_text, true),
        Some((_, frame)) => {
            return Err(AsmError::new(
                line_no,
                format!("invalid frame qualifier '{}'", frame),
            ));
        }
    };

    let slot = slot_text
        .parse::<usize>()
        .map_err(|_| AsmError::new(line_no, format!("invalid slot index '{}'", slot_text)))?;

    Ok(SlotRef { slot, global })
}

fn parse_colour(line_no: usize, operand: &str, digits: &str) -> Result<u32, AsmError> {
    if digits.len() != 6 {
        return Err(AsmError::new(
            line_no,
            format!("invalid colour operand '{}'", operand),
        ));
    }
    u32::from_str_radix(digits, 16)
        .map_err(|_| AsmError::new(line_no, format!("invalid colour operand '{}'", operand)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_assemble_resolves_labels() {
        let source = "\
main:
    push 0
loop:
    push 1
    add
    jmp loop
";
        let instrs = assemble_ok(source);
        assert_eq!(instrs.len(), 4);
        // `loop` points at the second instruction.
        assert_eq!(instrs[3], Instr::Jmp(1));
    }

    #[test]
    fn test_assemble_slot_references() {
        let instrs = assemble_ok("push [2]\npush [3:g]\npop +[1]\npush +[0:g]\n");
        assert_eq!(
            instrs[0],
            Instr::PushSlot(SlotRef {
                slot: 2,
                global: false
            })
        );
        assert_eq!(
            instrs[1],
            Instr::PushSlot(SlotRef {
                slot: 3,
                global: true
            })
        );
        assert_eq!(
            instrs[2],
            Instr::PopIndexed(SlotRef {
                slot: 1,
                global: false
            })
        );
        assert_eq!(
            instrs[3],
            Instr::PushIndexed(SlotRef {
                slot: 0,
                global: true
            })
        );
    }

    #[test]
    fn test_assemble_immediates() {
        let instrs = assemble_ok("push -7\npush 2.5\npush #FF00AA\n");
        assert_eq!(instrs[0], Instr::PushInt(-7));
        assert_eq!(instrs[1], Instr::PushFloat(2.5));
        assert_eq!(instrs[2], Instr::PushColour(0xFF00AA));
    }

    #[test]
    fn test_assemble_call_and_comments() {
        let source = "\
; entry
main:
    push 3      ; argument
    call fib, 1
    halt
fib:
    push [0]
    ret
";
        let instrs = assemble_ok(source);
        assert_eq!(instrs[1], Instr::Call { target: 3, args: 1 });
    }

    #[test]
    fn test_assemble_errors() {
        assert!(matches!(
            super::super::assemble("frobnicate"),
            Err(AsmError { line: 1, .. })
        ));
        assert!(super::super::assemble("jmp nowhere").is_err());
        assert!(super::super::assemble("dup 1").is_err());
        assert!(super::super::assemble("x:\nx:\n").is_err());
        assert!(super::super::assemble("push [1:q]").is_err());
    }

    fn assemble_ok(source: &str) -> Vec<Instr> {
        match super::super::assemble(source) {
            Ok(instrs) => instrs,
            Err(err) => panic!("{}", err),
        }
    }
}
