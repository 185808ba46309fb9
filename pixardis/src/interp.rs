//! Instruction interpreter.
//!
//! A single bounded, synchronous burst per call: one instruction per
//! loop iteration until the cycle budget runs out, the program halts,
//! or an instruction faults. There are no suspension points, so the
//! host regains control between bursts and splitting a run across
//! bursts is observationally identical to one large burst.
use log::trace;

use crate::{
    bytecode::Instr,
    cpu::{CallRecord, PixardisCpu},
    error::RuntimeError,
    value::{self, Value},
};

/// Execute up to `cycles` instructions. `Ok` when the budget was spent
/// or the program halted cleanly; the first fault stops the machine,
/// records the error and returns it. A stopped machine keeps returning
/// its error.
pub(crate) fn run(cpu: &mut PixardisCpu, cycles: usize) -> Result<(), RuntimeError> {
    if let Some(error) = &cpu.error {
        return Err(error.clone());
    }

    for _ in 0..cycles {
        if cpu.halted {
            break;
        }

        // An armed delay eats instruction slots instead of sleeping,
        // which keeps stepping deterministic for the host's animation
        // loop.
        if cpu.delay_ticks > 0 {
            cpu.delay_ticks -= 1;
            continue;
        }

        let instr = match cpu.program.get(cpu.pc) {
            Some(instr) => *instr,
            None => {
                let error = RuntimeError::UndefinedAddress { address: cpu.pc };
                cpu.error = Some(error.clone());
                return Err(error);
            }
        };

        trace!("[{:4}] {}", cpu.pc, instr);
        cpu.pc += 1;

        if let Err(error) = execute(cpu, instr) {
            // Stop on the offending instruction; state stays
            // inspectable for the host.
            cpu.pc -= 1;
            cpu.error = Some(error.clone());
            return Err(error);
        }
    }

    Ok(())
}

fn execute(cpu: &mut PixardisCpu, instr: Instr) -> Result<(), RuntimeError> {
    use Instr as I;

    match instr {
        // --------------------------------------------------------------------
        // Stack
        I::PushInt(value) => cpu.push(Value::Int(value)),
        I::PushFloat(value) => cpu.push(Value::Float(value)),
        I::PushColour(value) => cpu.push(Value::Colour(value)),
        I::PushSlot(reference) => {
            let value = cpu.read_slot(reference)?;
            cpu.push(value);
        }
        I::PushIndexed(reference) => {
            let index = cpu.pop_int("push +[]")?;
            let value = cpu.read_indexed(reference, index)?;
            cpu.push(value);
        }
        I::PopSlot(reference) => {
            let value = cpu.pop()?;
            cpu.write_slot(reference, value)?;
        }
        I::PopIndexed(reference) => {
            let index = cpu.pop_int("pop +[]")?;
            let value = cpu.pop()?;
            cpu.write_indexed(reference, index, value)?;
        }
        I::Dup => {
            let value = cpu.peek()?;
            cpu.push(value);
        }
        I::Drop => {
            cpu.pop()?;
        }

        // --------------------------------------------------------------------
        // Arithmetic. The right operand is on top of the stack.
        I::Add => binary(cpu, "add", |a, b| match (a, b) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_add(b))),
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(a + b)),
            (Value::Colour(a), Value::Colour(b)) => Some(Value::Colour(value::colour_add(a, b))),
            _ => None,
        })?,
        I::Sub => binary(cpu, "sub", |a, b| match (a, b) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_sub(b))),
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(a - b)),
            (Value::Colour(a), Value::Colour(b)) => Some(Value::Colour(value::colour_sub(a, b))),
            _ => None,
        })?,
        I::Mul => binary(cpu, "mul", |a, b| match (a, b) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_mul(b))),
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(a * b)),
            (Value::Colour(a), Value::Colour(b)) => Some(Value::Colour(value::colour_mul(a, b))),
            (Value::Colour(a), Value::Int(b)) => Some(Value::Colour(value::colour_scale(a, b))),
            _ => None,
        })?,
        I::Div => {
            let b = cpu.pop()?;
            let a = cpu.pop()?;
            let result = match (a, b) {
                (Value::Int(_), Value::Int(0)) => return Err(RuntimeError::DivisionByZero),
                (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_div(b)),
                (Value::Float(a), Value::Float(b)) => {
                    if b.abs() < f64::EPSILON {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    Value::Float(a / b)
                }
                (_, b) => {
                    return Err(RuntimeError::TypeMismatch {
                        opcode: "div",
                        found: b.type_name(),
                    })
                }
            };
            cpu.push(result);
        }
        I::Mod => {
            let b = cpu.pop_int("mod")?;
            let a = cpu.pop_int("mod")?;
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            cpu.push(Value::Int(a.wrapping_rem(b)));
        }
        I::Neg => {
            let result = match cpu.pop()? {
                Value::Int(value) => Value::Int(value.wrapping_neg()),
                Value::Float(value) => Value::Float(-value),
                other => {
                    return Err(RuntimeError::TypeMismatch {
                        opcode: "neg",
                        found: other.type_name(),
                    })
                }
            };
            cpu.push(result);
        }

        // --------------------------------------------------------------------
        // Comparison and logic
        I::Eq => equality(cpu, "eq", false)?,
        I::Ne => equality(cpu, "ne", true)?,
        I::Lt => relational(cpu, "lt", |a, b| a < b, |a, b| a < b)?,
        I::Le => relational(cpu, "le", |a, b| a <= b, |a, b| a <= b)?,
        I::Gt => relational(cpu, "gt", |a, b| a > b, |a, b| a > b)?,
        I::Ge => relational(cpu, "ge", |a, b| a >= b, |a, b| a >= b)?,
        I::And => {
            let b = cpu.pop_bool("and")?;
            let a = cpu.pop_bool("and")?;
            cpu.push(Value::Bool(a && b));
        }
        I::Or => {
            let b = cpu.pop_bool("or")?;
            let a = cpu.pop_bool("or")?;
            cpu.push(Value::Bool(a || b));
        }
        I::Not => {
            let value = cpu.pop_bool("not")?;
            cpu.push(Value::Bool(!value));
        }

        // --------------------------------------------------------------------
        // Control
        I::Jmp(target) => cpu.pc = target,
        I::Jz(target) => {
            if !cpu.pop_condition("jz")? {
                cpu.pc = target;
            }
        }
        I::Jnz(target) => {
            if cpu.pop_condition("jnz")? {
                cpu.pc = target;
            }
        }
        I::Call { target, args } => {
            if cpu.calls.len() >= cpu.max_call_depth {
                return Err(RuntimeError::CallDepthExceeded {
                    limit: cpu.max_call_depth,
                });
            }
            if target >= cpu.program.len() {
                return Err(RuntimeError::UndefinedAddress { address: target });
            }

            // Arguments were pushed left to right; popping reverses
            // them, so flip back before the callee adopts them.
            let mut pending = Vec::with_capacity(args);
            for _ in 0..args {
                pending.push(cpu.pop()?);
            }
            pending.reverse();
            cpu.pending_args = pending;

            cpu.calls.push(CallRecord {
                return_addr: cpu.pc,
            });
            cpu.pc = target;
        }
        I::Ret => {
            let value = cpu.pop()?;
            cpu.close_frame()?;
            let record = cpu.calls.pop().ok_or(RuntimeError::NoOpenFrame)?;
            cpu.pc = record.return_addr;
            cpu.push(value);
        }
        I::Halt => cpu.halted = true,

        // --------------------------------------------------------------------
        // Frames
        I::OpenFrame(slots) => cpu.open_frame(slots)?,
        I::CloseFrame => cpu.close_frame()?,

        // --------------------------------------------------------------------
        // Conversions
        I::IntToFloat => {
            let value = cpu.pop_int("itof")?;
            cpu.push(Value::Float(value as f64));
        }
        I::FloatToInt => match cpu.pop()? {
            // Truncates toward zero, saturating at the int range.
            Value::Float(value) => cpu.push(Value::Int(value as i32)),
            other => {
                return Err(RuntimeError::TypeMismatch {
                    opcode: "ftoi",
                    found: other.type_name(),
                })
            }
        },
        I::IntToColour => {
            let value = cpu.pop_int("itoc")?;
            cpu.push(Value::Colour(value as u32 & 0xFF_FFFF));
        }
        I::ColourToInt => {
            let value = cpu.pop_colour("ctoi")?;
            cpu.push(Value::Int(value as i32));
        }
        I::BoolToInt => {
            let value = cpu.pop_bool("btoi")?;
            cpu.push(Value::Int(value as i32));
        }
        I::IntToBool => {
            let value = cpu.pop_int("itob")?;
            cpu.push(Value::Bool(value != 0));
        }

        // --------------------------------------------------------------------
        // Graphics and IO
        I::Clear => {
            let colour = cpu.pop_colour("clear")?;
            cpu.display.clear(colour);
        }
        I::WritePixel => {
            let x = cpu.pop_int("write_pixel")?;
            let y = cpu.pop_int("write_pixel")?;
            let colour = cpu.pop_colour("write_pixel")?;
            cpu.display.write_pixel(x, y, colour)?;
        }
        I::WriteBox => {
            let x = cpu.pop_int("write_box")?;
            let y = cpu.pop_int("write_box")?;
            let w = cpu.pop_int("write_box")?;
            let h = cpu.pop_int("write_box")?;
            let colour = cpu.pop_colour("write_box")?;
            cpu.display.write_box(x, y, w, h, colour)?;
        }
        I::ReadPixel => {
            let x = cpu.pop_int("read_pixel")?;
            let y = cpu.pop_int("read_pixel")?;
            let colour = cpu.display.read_pixel(x, y)?;
            cpu.push(Value::Colour(colour));
        }
        I::Width => cpu.push(Value::Int(cpu.display.width() as i32)),
        I::Height => cpu.push(Value::Int(cpu.display.height() as i32)),
        I::Rand => {
            let bound = cpu.pop_int("rand")?;
            if bound <= 0 {
                return Err(RuntimeError::InvalidRandomBound { bound });
            }
            let value = cpu.random_int(bound);
            cpu.push(Value::Int(value));
        }
        I::Print => {
            let value = cpu.pop()?;
            cpu.print_buffer.push(value.to_string());
        }
        I::Delay => {
            let millis = cpu.pop_int("delay")?;
            if millis < 0 {
                return Err(RuntimeError::InvalidDelay { millis });
            }
            cpu.delay_ticks = millis as u32;
        }
    }

    Ok(())
}

/// Pop right then left, apply, push. `None` from the combiner means
/// the tag pair is unsupported.
fn binary(
    cpu: &mut PixardisCpu,
    opcode: &'static str,
    combine: impl Fn(Value, Value) -> Option<Value>,
) -> Result<(), RuntimeError> {
    let b = cpu.pop()?;
    let a = cpu.pop()?;
    match combine(a, b) {
        Some(result) => {
            cpu.push(result);
            Ok(())
        }
        None => Err(RuntimeError::TypeMismatch {
            opcode,
            found: b.type_name(),
        }),
    }
}

/// Equality is defined for every primitive, but both sides must carry
/// the same tag.
fn equality(cpu: &mut PixardisCpu, opcode: &'static str, negate: bool) -> Result<(), RuntimeError> {
    let b = cpu.pop()?;
    let a = cpu.pop()?;
    let equal = match (a, b) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Colour(a), Value::Colour(b)) => a == b,
        _ => {
            return Err(RuntimeError::TypeMismatch {
                opcode,
                found: b.type_name(),
            })
        }
    };
    cpu.push(Value::Bool(equal ^ negate));
    Ok(())
}

fn relational(
    cpu: &mut PixardisCpu,
    opcode: &'static str,
    int_cmp: impl Fn(i32, i32) -> bool,
    float_cmp: impl Fn(f64, f64) -> bool,
) -> Result<(), RuntimeError> {
    let b = cpu.pop()?;
    let a = cpu.pop()?;
    let result = match (a, b) {
        (Value::Int(a), Value::Int(b)) => int_cmp(a, b),
        (Value::Float(a), Value::Float(b)) => float_cmp(a, b),
        _ => {
            return Err(RuntimeError::TypeMismatch {
                opcode,
                found: b.type_name(),
            })
        }
    };
    cpu.push(Value::Bool(result));
    Ok(())
}
