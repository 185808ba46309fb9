//! Assembler
mod assembler;

pub use self::assembler::Assembler;

use crate::{bytecode::Instr, error::AsmError};

/// Assemble program text into an executable instruction vector with
/// every label resolved to an absolute instruction index.
pub fn assemble(source_code: impl AsRef<str>) -> Result<Vec<Instr>, AsmError> {
    Assembler::new(source_code.as_ref()).assemble()
}
