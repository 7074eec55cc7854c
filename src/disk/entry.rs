//! Disk Entry Module
//!
//! The envelope written to the box for every disk-tier key.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// == Disk Cache Entry ==
/// Stored form of a disk-tier value:
/// `{ "data": <json>, "expires_at": "<RFC 3339 timestamp>" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskCacheEntry {
    /// Codec output for the cached value
    pub data: Value,
    /// Instant after which the entry counts as absent
    pub expires_at: DateTime<Utc>,
}

impl DiskCacheEntry {
    /// Wraps `data` with an expiry `ttl` from now.
    pub fn new(data: Value, ttl: Duration) -> Self {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self { data, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Serializes the envelope to the string stored in the box.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a stored string back into an envelope.
    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoded_shape() {
        let entry = DiskCacheEntry::new(json!({"id": 1}), Duration::from_secs(60));
        let raw: Value = serde_json::from_str(&entry.encode().unwrap()).unwrap();

        assert_eq!(raw["data"], json!({"id": 1}));
        let expires_at = raw["expires_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(expires_at).is_ok());
    }

    #[test]
    fn test_decode_encoded() {
        let entry = DiskCacheEntry::new(json!([1, 2, 3]), Duration::from_secs(60));
        let decoded = DiskCacheEntry::decode(&entry.encode().unwrap()).unwrap();
        assert_eq!(decoded, entry);
        assert!(!decoded.is_expired());
    }

    #[test]
    fn test_decode_truncated_fails() {
        let raw = DiskCacheEntry::new(json!("x"), Duration::from_secs(60))
            .encode()
            .unwrap();
        assert!(DiskCacheEntry::decode(&raw[..raw.len() / 2]).is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let entry = DiskCacheEntry::new(Value::Null, Duration::from_secs(10));
        let at = entry.expires_at;

        assert!(!entry.is_expired_at(at - chrono::Duration::milliseconds(1)));
        assert!(entry.is_expired_at(at));
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let entry = DiskCacheEntry::new(Value::Null, Duration::ZERO);
        assert!(entry.is_expired());
    }

    #[test]
    fn test_decode_accepts_foreign_timestamp() {
        let raw = r#"{"data":{"name":"Pizza"},"expires_at":"2000-01-01T00:00:00+00:00"}"#;
        let entry = DiskCacheEntry::decode(raw).unwrap();
        assert_eq!(entry.data["name"], "Pizza");
        assert!(entry.is_expired());
    }
}
