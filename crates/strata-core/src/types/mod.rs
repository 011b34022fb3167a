//! Core types for strata.

mod memory;
mod message;

pub use memory::*;
pub use message::*;
