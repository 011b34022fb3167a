//! Built-in store implementations: process-local stores for development and
//! tests, and the embedding-backed long-term store used with any
//! [`VectorStore`](crate::traits::VectorStore).

mod id;
mod memory_short_term;
mod memory_vector;
mod semantic;

pub use id::{Clock, SystemClock, TimestampIdGenerator};
pub use memory_short_term::InMemoryShortTermStore;
pub use memory_vector::{cosine_similarity, InMemoryVectorStore};
pub use semantic::{SemanticStore, CREATED_AT_FIELD, TEXT_FIELD};
