//! Account number canonicalization

pub mod normalizer;

pub use normalizer::*;
