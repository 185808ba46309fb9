//! Result and errors.
use std::fmt::{self, Display, Formatter};

pub type PixardisResult<T> = std::result::Result<T, PixardisError>;

#[derive(Debug)]
pub enum PixardisError {
    /// The assembly text could not be loaded.
    Asm(AsmError),
    /// Compilation produced diagnostics instead of assembly.
    Compile(Vec<String>),
    /// The machine stopped on a faulting instruction.
    Runtime(RuntimeError),
}

impl Display for PixardisError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Asm(err) => write!(f, "assembly error: {}", err),
            Self::Compile(errors) => {
                // Diagnostics are already rendered; separate them with
                // a blank line the way the editor expects.
                write!(f, "{}", errors.join("\n\n"))
            }
            Self::Runtime(err) => write!(f, "runtime error: {}", err),
        }
    }
}

impl std::error::Error for PixardisError {}

impl From<AsmError> for PixardisError {
    fn from(err: AsmError) -> Self {
        PixardisError::Asm(err)
    }
}

impl From<RuntimeError> for PixardisError {
    fn from(err: RuntimeError) -> Self {
        PixardisError::Runtime(err)
    }
}

/// Error raised while assembling program text, anchored to the
/// 1-based assembly line it occurred on.
#[derive(Debug)]
pub struct AsmError {
    pub line: usize,
    pub message: String,
}

impl AsmError {
    pub fn new(line: usize, message: impl ToString) -> Self {
        Self {
            line,
            message: message.to_string(),
        }
    }
}

impl Display for AsmError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AsmError {}

/// Faults that stop the machine. The offending state is preserved for
/// inspection; only `reset` clears it.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    StackUnderflow,
    /// An opcode met an operand tag it is not defined for.
    TypeMismatch {
        opcode: &'static str,
        found: &'static str,
    },
    DivisionByZero,
    PixelOutOfBounds {
        x: i32,
        y: i32,
    },
    SlotOutOfBounds {
        slot: usize,
    },
    IndexOutOfBounds {
        index: i32,
    },
    /// Jump or call target outside the loaded program.
    UndefinedAddress {
        address: usize,
    },
    CallDepthExceeded {
        limit: usize,
    },
    /// `rand` requires a strictly positive bound.
    InvalidRandomBound {
        bound: i32,
    },
    InvalidDelay {
        millis: i32,
    },
    /// A frame operation with no frame to act on.
    NoOpenFrame,
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::StackUnderflow => write!(f, "operand stack underflow"),
            Self::TypeMismatch { opcode, found } => {
                write!(f, "'{}' is not defined for operand of type {}", opcode, found)
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::PixelOutOfBounds { x, y } => {
                write!(f, "pixel coordinates ({}, {}) outside the display", x, y)
            }
            Self::SlotOutOfBounds { slot } => {
                write!(f, "frame slot {} outside the current frame", slot)
            }
            Self::IndexOutOfBounds { index } => {
                write!(f, "array index {} out of bounds", index)
            }
            Self::UndefinedAddress { address } => {
                write!(f, "address {} outside the loaded program", address)
            }
            Self::CallDepthExceeded { limit } => {
                write!(f, "call depth exceeded the configured cap of {}", limit)
            }
            Self::InvalidRandomBound { bound } => {
                write!(f, "random bound must be positive, got {}", bound)
            }
            Self::InvalidDelay { millis } => {
                write!(f, "delay must not be negative, got {}", millis)
            }
            Self::NoOpenFrame => write!(f, "no open frame"),
        }
    }
}
