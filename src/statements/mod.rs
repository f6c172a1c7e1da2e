//! Statement accumulation: canonical statements folded from page fragments

pub mod assembler;
pub mod statement;

pub use assembler::*;
pub use statement::*;
