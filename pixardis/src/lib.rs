//! Pixardis: a retro pixel-graphics programming system.
//!
//! This crate is the machine half: the assembler/loader, the stack VM
//! with its framebuffer and print log, and the facade the host embeds.
//! The language frontend lives in `pixardis_compiler`; [`compile`]
//! re-exposes it in the shape hosts consume.
pub mod asm;
mod bytecode;
pub mod constants;
mod cpu;
mod display;
mod error;
mod interp;
mod value;
mod vm;

pub use self::{
    asm::assemble,
    bytecode::{Instr, SlotRef},
    error::{AsmError, PixardisError, PixardisResult, RuntimeError},
    value::Value,
    vm::{PixardisConf, PixardisVm, StepOutcome},
};

/// Version of *this* implementation.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        compile, CompileOutput, PixardisConf, PixardisError, PixardisResult, PixardisVm,
        StepOutcome,
    };
}

/// Result of compiling Pixardis source, in the shape the editor
/// consumes: either assembly, or every diagnostic rendered in source
/// order.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub success: bool,
    pub assembly: String,
    pub errors: Vec<String>,
}

/// Compile source text to stack-machine assembly.
pub fn compile(source: &str) -> CompileOutput {
    match pixardis_compiler::compile(source) {
        Ok(assembly) => CompileOutput {
            success: true,
            assembly,
            errors: Vec::new(),
        },
        Err(errors) => CompileOutput {
            success: false,
            assembly: String::new(),
            errors,
        },
    }
}
