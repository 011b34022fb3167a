//! Memory item, placement and query result types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use strum::{Display, EnumString};

/// Open key/value metadata attached to long-term documents.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Equality filter over long-term document metadata.
///
/// A document matches when every key is present with an equal value.
pub type MetadataFilter = HashMap<String, serde_json::Value>;

/// Storage tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    ShortTerm,
    LongTerm,
}

/// Where an ingested item was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum PlacementResult {
    /// Stored in the expiring tier.
    ShortTerm {
        ttl_seconds: u64,
        importance_score: f64,
    },
    /// Stored durably with a store-assigned id.
    LongTerm { id: String, importance_score: f64 },
}

impl PlacementResult {
    /// The tier the item landed in.
    pub fn tier(&self) -> Tier {
        match self {
            Self::ShortTerm { .. } => Tier::ShortTerm,
            Self::LongTerm { .. } => Tier::LongTerm,
        }
    }

    /// The importance score computed at ingest.
    pub fn importance_score(&self) -> f64 {
        match self {
            Self::ShortTerm {
                importance_score, ..
            }
            | Self::LongTerm {
                importance_score, ..
            } => *importance_score,
        }
    }
}

/// A ranked long-term search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub id: String,
    pub score: f32,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A stored long-term document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermDocument {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Outcome of a query across tiers.
///
/// `None` is a legitimate empty answer and is never used to report a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum QueryResult {
    /// Exact key hit in the short-term tier.
    ShortTerm { result: String },
    /// Semantic matches from the long-term tier, best first.
    LongTerm {
        results: Vec<SearchMatch>,
        used_data: String,
    },
    /// Nothing in either tier.
    None,
}

impl QueryResult {
    /// The tier that answered, if any.
    pub fn source(&self) -> Option<Tier> {
        match self {
            Self::ShortTerm { .. } => Some(Tier::ShortTerm),
            Self::LongTerm { .. } => Some(Tier::LongTerm),
            Self::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Live state of a short-term entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTermEntry {
    /// Store key (raw text or content hash).
    pub key: String,
    /// Remaining lifetime in whole seconds, if the store reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_remaining_secs: Option<u64>,
    pub access_count: u64,
}

impl ShortTermEntry {
    pub fn new(key: impl Into<String>, ttl_remaining: Option<Duration>, access_count: u64) -> Self {
        Self {
            key: key.into(),
            ttl_remaining_secs: ttl_remaining.map(|d| d.as_secs()),
            access_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placement_serializes_with_tier_tag() {
        let placed = PlacementResult::ShortTerm {
            ttl_seconds: 20,
            importance_score: 20.0,
        };
        let value = serde_json::to_value(&placed).unwrap();
        assert_eq!(
            value,
            json!({"tier": "short_term", "ttl_seconds": 20, "importance_score": 20.0})
        );
        assert_eq!(placed.tier(), Tier::ShortTerm);
    }

    #[test]
    fn test_query_result_none_is_distinct() {
        let value = serde_json::to_value(QueryResult::None).unwrap();
        assert_eq!(value, json!({"source": "none"}));
        assert!(QueryResult::None.source().is_none());
    }

    #[test]
    fn test_query_result_long_term_shape() {
        let result = QueryResult::LongTerm {
            results: vec![SearchMatch {
                id: "1".to_string(),
                score: 0.9,
                text: "Alan Turing".to_string(),
                metadata: Metadata::new(),
            }],
            used_data: "Alan Turing".to_string(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["source"], "long_term");
        assert_eq!(value["used_data"], "Alan Turing");
        assert_eq!(value["results"][0]["id"], "1");
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::LongTerm.to_string(), "long_term");
        assert_eq!("short_term".parse::<Tier>().unwrap(), Tier::ShortTerm);
    }
}
