//! Identity and state fingerprints.
//!
//! Both hashes are SHA-256 over a canonical JSON rendering: object keys are
//! sorted at every depth and no whitespace is emitted, so two structurally
//! equal values hash identically however they were assembled. The schema
//! version is part of every preimage.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};
use sha2::{Digest as _, Sha256};

use crate::error::{SyncError, SyncResult};
use crate::event::{Behavior, Identity, ManifestEvent, Payload, Timing};
use crate::schema::{HASH_PREFIX, IDENTITY_FIELDS, KEY_SCHEMA_VERSION, SCHEMA_VERSION, STATE_FIELDS};

/// A 32-byte SHA-256 digest, rendered as `sha256:<hex>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&digest);
        Digest(arr)
    }

    /// Hash the canonical JSON rendering of `value`.
    pub fn of_canonical<T: Serialize>(value: &T) -> SyncResult<Self> {
        let value = serde_json::to_value(value)?;
        Ok(Self::of_bytes(canonical_json(&value).as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("{HASH_PREFIX}{}", hex::encode(self.0))
    }

    /// First 12 hex characters, for log lines and terminal output.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short())
    }
}

impl FromStr for Digest {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(HASH_PREFIX)
            .ok_or_else(|| SyncError::manifest(format!("hash '{s}' lacks '{HASH_PREFIX}' prefix")))?;
        if rest.len() != 64 {
            return Err(SyncError::manifest(format!(
                "hash '{s}' has {} hex characters, expected 64",
                rest.len()
            )));
        }
        let mut buf = [0u8; 32];
        hex::decode_to_slice(rest, &mut buf)
            .map_err(|e| SyncError::manifest(format!("hash '{s}' is not valid hex: {e}")))?;
        Ok(Digest(buf))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Render a JSON value with keys sorted at every depth and no whitespace.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Fingerprint of "the same logical event". Only the identity field set goes
/// into the preimage.
pub fn identity_hash(identity: &Identity) -> SyncResult<Digest> {
    identity.validate()?;
    let identity = serde_json::to_value(identity.canonical())?;

    let mut preimage = serde_json::Map::new();
    preimage.insert(KEY_SCHEMA_VERSION.into(), json!(SCHEMA_VERSION));
    preimage.insert("scope".into(), json!("identity"));
    for field in IDENTITY_FIELDS {
        let value = identity.get(field).cloned().ok_or_else(|| {
            SyncError::identity(format!("identity is missing required field '{field}'"))
        })?;
        preimage.insert(field.into(), value);
    }

    Digest::of_canonical(&Value::Object(preimage))
}

/// Fingerprint of one sub-event's observable state.
pub fn state_hash(timing: &Timing, payload: &Payload, behavior: &Behavior) -> SyncResult<Digest> {
    let values = [
        serde_json::to_value(timing.canonical())?,
        serde_json::to_value(payload)?,
        serde_json::to_value(behavior)?,
    ];

    let mut preimage = serde_json::Map::new();
    preimage.insert(KEY_SCHEMA_VERSION.into(), json!(SCHEMA_VERSION));
    preimage.insert("scope".into(), json!("state"));
    for (field, value) in STATE_FIELDS.into_iter().zip(values) {
        preimage.insert(field.into(), value);
    }

    Digest::of_canonical(&Value::Object(preimage))
}

/// Recompute every stored hash on `event` and fail on the first mismatch.
pub fn verify_event(event: &ManifestEvent) -> SyncResult<()> {
    let expected = identity_hash(&event.identity)?;
    if expected != event.identity_hash {
        return Err(SyncError::identity(format!(
            "identity hash mismatch for {}: stored={} expected={}",
            event.identity, event.identity_hash, expected
        )));
    }

    for (i, sub) in event.sub_events.iter().enumerate() {
        let expected = state_hash(&sub.timing, &sub.payload, &sub.behavior)?;
        if expected != sub.state_hash {
            return Err(SyncError::manifest(format!(
                "state hash mismatch for {} sub-event {i}: stored={} expected={}",
                event.identity, sub.state_hash, expected
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DaySet, EventKind};
    use chrono::NaiveTime;

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let a = json!({"b": 1, "a": {"y": [1, {"d": 0, "c": 1}], "x": null}});
        assert_eq!(
            canonical_json(&a),
            r#"{"a":{"x":null,"y":[1,{"c":1,"d":0}]},"b":1}"#
        );
    }

    #[test]
    fn digest_round_trips_through_string() {
        let digest = Digest::of_bytes(b"show");
        let parsed: Digest = digest.to_hex().parse().unwrap();
        assert_eq!(parsed, digest);
        assert_eq!(digest.to_hex().len(), HASH_PREFIX.len() + 64);
    }

    #[test]
    fn digest_parse_rejects_malformed() {
        assert!("deadbeef".parse::<Digest>().is_err());
        assert!("sha256:abc".parse::<Digest>().is_err());
        let bad = format!("{HASH_PREFIX}{}", "zz".repeat(32));
        assert!(bad.parse::<Digest>().is_err());
    }

    #[test]
    fn identity_hash_ignores_target_whitespace() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let a = Identity {
            kind: EventKind::Playlist,
            target: "Main Show".into(),
            days: DaySet::everyday(),
            start_time: t(18),
            end_time: t(22),
        };
        let b = Identity {
            target: " Main Show ".into(),
            ..a.clone()
        };
        assert_eq!(identity_hash(&a).unwrap(), identity_hash(&b).unwrap());

        let c = Identity {
            kind: EventKind::Sequence,
            ..a.clone()
        };
        assert_ne!(identity_hash(&a).unwrap(), identity_hash(&c).unwrap());
    }
}
