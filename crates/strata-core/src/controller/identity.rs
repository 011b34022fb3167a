//! Short-term key derivation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::{Display, EnumString};

/// Value written under raw-text keys. The key itself carries the content.
pub const RAW_TEXT_MARKER: &str = "stored";

/// How a short-term key is derived from item text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KeyStrategy {
    /// The text is the key and the value is a fixed marker. Identical texts
    /// collapse to a single entry.
    #[default]
    RawText,
    /// The key is the SHA-256 hex digest of the text and the value is the text.
    ContentHash,
}

impl KeyStrategy {
    /// Key under which `text` is stored.
    pub fn key_for(&self, text: &str) -> String {
        match self {
            Self::RawText => text.to_string(),
            Self::ContentHash => hex::encode(Sha256::digest(text.as_bytes())),
        }
    }

    /// Value stored alongside the key for `text`.
    pub fn value_for<'a>(&self, text: &'a str) -> &'a str {
        match self {
            Self::RawText => RAW_TEXT_MARKER,
            Self::ContentHash => text,
        }
    }

    /// Recover the original item text from a stored key/value pair.
    pub fn text_for<'a>(&self, key: &'a str, value: &'a str) -> &'a str {
        match self {
            Self::RawText => key,
            Self::ContentHash => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_key_is_text() {
        let strategy = KeyStrategy::RawText;
        assert_eq!(strategy.key_for("hello"), "hello");
        assert_eq!(strategy.value_for("hello"), RAW_TEXT_MARKER);
        assert_eq!(strategy.text_for("hello", RAW_TEXT_MARKER), "hello");
    }

    #[test]
    fn test_content_hash_key() {
        let strategy = KeyStrategy::ContentHash;
        let key = strategy.key_for("hello");
        assert_eq!(
            key,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(strategy.value_for("hello"), "hello");
        assert_eq!(strategy.text_for(&key, "hello"), "hello");
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(
            "content_hash".parse::<KeyStrategy>().unwrap(),
            KeyStrategy::ContentHash
        );
        assert_eq!("raw_text".parse::<KeyStrategy>().unwrap(), KeyStrategy::RawText);
        assert!("sha1".parse::<KeyStrategy>().is_err());
    }
}
