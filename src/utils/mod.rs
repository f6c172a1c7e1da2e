//! Utility modules

pub mod money;
pub mod text;

#[cfg(test)]
pub(crate) mod log_capture;

pub use money::*;
pub use text::*;
