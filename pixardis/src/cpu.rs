//! Machine state.
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    bytecode::{Instr, SlotRef},
    display::PixelDisplay,
    error::RuntimeError,
    value::Value,
};

/// A locals frame: a base pointer into the linear local-variable
/// array. A frame's extent runs from its base to the next frame's base
/// (or the end of the array for the innermost frame).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub base: usize,
}

/// Bookkeeping for one `call`: where to resume, recorded so `ret`
/// restores the caller exactly.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallRecord {
    pub return_addr: usize,
}

/// Core state of the Pixardis stack machine.
pub struct PixardisCpu {
    /// Immutable once loaded; replaced atomically by the next load.
    pub(crate) program: Vec<Instr>,
    /// Program counter.
    pub(crate) pc: usize,
    /// Operand stack.
    pub(crate) operands: Vec<Value>,
    /// Linear local-variable storage shared by all frames.
    pub(crate) locals: Vec<Value>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) calls: Vec<CallRecord>,
    /// Arguments popped by `call`, adopted by the callee's `oframe`.
    pub(crate) pending_args: Vec<Value>,
    /// Remaining instruction slots consumed by an armed `delay`.
    pub(crate) delay_ticks: u32,
    pub(crate) halted: bool,
    /// Error slot; set once when the machine stops on a fault.
    pub(crate) error: Option<RuntimeError>,
    pub(crate) display: PixelDisplay,
    pub(crate) print_buffer: Vec<String>,
    rng: SmallRng,
    pub(crate) max_call_depth: usize,
}

impl PixardisCpu {
    pub fn new(width: usize, height: usize, seed: u64, max_call_depth: usize) -> Self {
        Self {
            program: Vec::new(),
            pc: 0,
            operands: Vec::new(),
            locals: Vec::new(),
            frames: Vec::new(),
            calls: Vec::new(),
            pending_args: Vec::new(),
            delay_ticks: 0,
            halted: false,
            error: None,
            display: PixelDisplay::new(width, height),
            print_buffer: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            max_call_depth,
        }
    }

    /// Install a program and rewind execution. The framebuffer, print
    /// buffer and RNG stream are left untouched so hosts can inspect
    /// state across loads.
    pub(crate) fn load(&mut self, program: Vec<Instr>) {
        self.program = program;
        self.pc = 0;
        self.operands.clear();
        self.locals.clear();
        self.frames.clear();
        self.calls.clear();
        self.pending_args.clear();
        self.delay_ticks = 0;
        self.halted = false;
        self.error = None;
    }

    pub(crate) fn random_int(&mut self, bound: i32) -> i32 {
        self.rng.gen_range(0..bound)
    }

    // ------------------------------------------------------------------------
    // Operand stack

    pub(crate) fn push(&mut self, value: Value) {
        self.operands.push(value);
    }

    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.operands.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub(crate) fn peek(&self) -> Result<Value, RuntimeError> {
        self.operands
            .last()
            .copied()
            .ok_or(RuntimeError::StackUnderflow)
    }

    pub(crate) fn pop_int(&mut self, opcode: &'static str) -> Result<i32, RuntimeError> {
        match self.pop()? {
            Value::Int(value) => Ok(value),
            other => Err(RuntimeError::TypeMismatch {
                opcode,
                found: other.type_name(),
            }),
        }
    }

    pub(crate) fn pop_colour(&mut self, opcode: &'static str) -> Result<u32, RuntimeError> {
        match self.pop()? {
            Value::Colour(value) => Ok(value),
            other => Err(RuntimeError::TypeMismatch {
                opcode,
                found: other.type_name(),
            }),
        }
    }

    pub(crate) fn pop_bool(&mut self, opcode: &'static str) -> Result<bool, RuntimeError> {
        match self.pop()? {
            Value::Bool(value) => Ok(value),
            other => Err(RuntimeError::TypeMismatch {
                opcode,
                found: other.type_name(),
            }),
        }
    }

    /// Conditions accept a bool or an int; zero is false.
    pub(crate) fn pop_condition(&mut self, opcode: &'static str) -> Result<bool, RuntimeError> {
        match self.pop()? {
            Value::Bool(value) => Ok(value),
            Value::Int(value) => Ok(value != 0),
            other => Err(RuntimeError::TypeMismatch {
                opcode,
                found: other.type_name(),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Frames and slots

    pub(crate) fn open_frame(&mut self, slots: usize) -> Result<(), RuntimeError> {
        let base = self.locals.len();
        if self.pending_args.len() > slots {
            return Err(RuntimeError::SlotOutOfBounds {
                slot: self.pending_args.len().saturating_sub(1),
            });
        }

        self.frames.push(Frame { base });
        self.locals.resize(base + slots, Value::default());
        for (offset, value) in self.pending_args.drain(..).enumerate() {
            self.locals[base + offset] = value;
        }
        Ok(())
    }

    pub(crate) fn close_frame(&mut self) -> Result<(), RuntimeError> {
        let frame = self.frames.pop().ok_or(RuntimeError::NoOpenFrame)?;
        self.locals.truncate(frame.base);
        Ok(())
    }

    /// Extent of the frame a reference addresses: the entry frame for
    /// global references, the innermost frame otherwise.
    fn frame_extent(&self, global: bool) -> Result<(usize, usize), RuntimeError> {
        if global {
            let base = self.frames.first().ok_or(RuntimeError::NoOpenFrame)?.base;
            let end = self
                .frames
                .get(1)
                .map(|frame| frame.base)
                .unwrap_or(self.locals.len());
            Ok((base, end))
        } else {
            let base = self.frames.last().ok_or(RuntimeError::NoOpenFrame)?.base;
            Ok((base, self.locals.len()))
        }
    }

    pub(crate) fn read_slot(&self, reference: SlotRef) -> Result<Value, RuntimeError> {
        let (base, end) = self.frame_extent(reference.global)?;
        let index = base + reference.slot;
        if index >= end {
            return Err(RuntimeError::SlotOutOfBounds {
                slot: reference.slot,
            });
        }
        Ok(self.locals[index])
    }

    pub(crate) fn write_slot(&mut self, reference: SlotRef, value: Value) -> Result<(), RuntimeError> {
        let (base, end) = self.frame_extent(reference.global)?;
        let index = base + reference.slot;
        if index >= end {
            return Err(RuntimeError::SlotOutOfBounds {
                slot: reference.slot,
            });
        }
        self.locals[index] = value;
        Ok(())
    }

    /// Displaced access for the indexed push/pop forms. The index is
    /// checked against the frame extent; a negative index is always
    /// out of bounds.
    fn displace(&self, reference: SlotRef, index: i32) -> Result<usize, RuntimeError> {
        let (base, end) = self.frame_extent(reference.global)?;
        if index < 0 {
            return Err(RuntimeError::IndexOutOfBounds { index });
        }
        let absolute = base + reference.slot + index as usize;
        if absolute >= end {
            return Err(RuntimeError::IndexOutOfBounds { index });
        }
        Ok(absolute)
    }

    pub(crate) fn read_indexed(&self, reference: SlotRef, index: i32) -> Result<Value, RuntimeError> {
        self.displace(reference, index).map(|at| self.locals[at])
    }

    pub(crate) fn write_indexed(
        &mut self,
        reference: SlotRef,
        index: i32,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let at = self.displace(reference, index)?;
        self.locals[at] = value;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cpu() -> PixardisCpu {
        PixardisCpu::new(4, 4, 0, 16)
    }

    #[test]
    fn test_stack_underflow() {
        let mut cpu = cpu();
        assert_eq!(cpu.pop(), Err(RuntimeError::StackUnderflow));
    }

    #[test]
    fn test_frame_slots() {
        let mut cpu = cpu();
        cpu.open_frame(2).unwrap();
        let slot = SlotRef {
            slot: 1,
            global: false,
        };
        cpu.write_slot(slot, Value::Int(9)).unwrap();
        assert_eq!(cpu.read_slot(slot).unwrap(), Value::Int(9));

        // Slot 2 is past the frame.
        let bad = SlotRef {
            slot: 2,
            global: false,
        };
        assert!(cpu.read_slot(bad).is_err());
    }

    #[test]
    fn test_global_frame_access() {
        let mut cpu = cpu();
        cpu.open_frame(1).unwrap();
        cpu.write_slot(
            SlotRef {
                slot: 0,
                global: false,
            },
            Value::Int(41),
        )
        .unwrap();

        // From a nested frame the entry slot is reachable through the
        // global form, and stays writable.
        cpu.open_frame(1).unwrap();
        let global = SlotRef {
            slot: 0,
            global: true,
        };
        assert_eq!(cpu.read_slot(global).unwrap(), Value::Int(41));
        cpu.write_slot(global, Value::Int(42)).unwrap();
        cpu.close_frame().unwrap();

        assert_eq!(
            cpu.read_slot(SlotRef {
                slot: 0,
                global: false
            })
            .unwrap(),
            Value::Int(42)
        );
    }

    #[test]
    fn test_pending_args_adopted_in_order() {
        let mut cpu = cpu();
        cpu.pending_args = vec![Value::Int(1), Value::Int(2)];
        cpu.open_frame(3).unwrap();

        let slot = |slot| SlotRef {
            slot,
            global: false,
        };
        assert_eq!(cpu.read_slot(slot(0)).unwrap(), Value::Int(1));
        assert_eq!(cpu.read_slot(slot(1)).unwrap(), Value::Int(2));
        assert_eq!(cpu.read_slot(slot(2)).unwrap(), Value::Int(0));
    }
}
