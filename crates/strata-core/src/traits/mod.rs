//! Core traits for strata providers and stores.

mod embedder;
mod llm;
mod long_term;
mod oracle;
mod short_term;
mod vector_store;

pub use embedder::*;
pub use llm::*;
pub use long_term::*;
pub use oracle::*;
pub use short_term::*;
pub use vector_store::*;
