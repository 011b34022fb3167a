//! strata-client - Client library for the strata HTTP API.
//!
//! # Example
//!
//! ```ignore
//! use strata_client::StrataClient;
//!
//! let client = StrataClient::new("http://localhost:5001")?.with_api_key("secret");
//!
//! let placed = client.process("Standup moved to 10am").await?;
//! let found = client.query("Standup moved to 10am", None).await?;
//! ```

mod client;

pub use client::{HealthStatus, StrataClient};
pub use strata_core::types::{PlacementResult, QueryResult, ShortTermEntry};
pub use strata_core::SweepReport;
