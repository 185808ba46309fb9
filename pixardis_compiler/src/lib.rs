//! Compiler frontend for the Pixardis pixel-graphics language.
//!
//! The pipeline is lexer → parser → semantic analysis → code
//! generation, with a shared diagnostics sink so every stage reports
//! all the problems it can find. The output is textual assembly for
//! the Pixardis stack machine; the `pixardis` crate assembles and
//! runs it.
pub mod analysis;
pub mod ast;
pub mod codegen;
pub mod diag;
pub mod lex;
pub mod parsing;
pub mod pretty;
pub mod token_stream;
pub mod tokens;

use diag::Diagnostics;
use token_stream::TokenStream;

/// Compile source text to assembly.
///
/// On failure every collected diagnostic is returned, rendered in the
/// editor format and ordered by source line. No assembly is produced
/// when any stage reported an error.
pub fn compile(source: &str) -> Result<String, Vec<String>> {
    let mut diag = Diagnostics::new();

    let tokens = lex::tokenize(source, &mut diag);
    if !diag.is_empty() {
        return Err(diag.render(source));
    }

    let stream = TokenStream::new(tokens, source);
    let (program, node_count) = parsing::parse(stream, &mut diag);
    if !diag.is_empty() {
        return Err(diag.render(source));
    }

    let notes = analysis::analyse(&program, node_count, &mut diag);
    if !diag.is_empty() {
        return Err(diag.render(source));
    }

    Ok(codegen::generate(&program, &notes))
}
