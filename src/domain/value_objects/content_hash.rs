use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(hash: String) -> Result<Self, String> {
        if hash.len() != 64 {
            return Err("Content hash must be 64 characters long (SHA-256)".to_string());
        }

        if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("Content hash must contain only hexadecimal characters".to_string());
        }

        Ok(Self(hash.to_lowercase()))
    }

    /// Hashes chunk text so the same passage is stored only once per collection.
    pub fn of_content(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hash = ContentHash::of_content("hello world");
        assert_eq!(
            hash.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_same_content_same_hash() {
        assert_eq!(
            ContentHash::of_content("a passage"),
            ContentHash::of_content("a passage")
        );
        assert_ne!(
            ContentHash::of_content("a passage"),
            ContentHash::of_content("another passage")
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ContentHash::new("short".to_string()).is_err());
        let not_hex = "g".repeat(64);
        assert!(ContentHash::new(not_hex).is_err());
    }

    #[test]
    fn test_parse_normalizes_case() {
        let upper = "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9";
        let hash = ContentHash::new(upper.to_string()).unwrap();
        assert_eq!(hash, ContentHash::of_content("hello world"));
    }
}
