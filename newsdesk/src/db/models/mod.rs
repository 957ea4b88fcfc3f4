//! Database entity models.
//!
//! Every stored record is a JSON document. The types in this module give those documents a shape:
//! an [`Entity`] knows its collection and identifier, and serializes to the document that is
//! handed to the record store.

pub mod articles;
pub mod categories;
pub mod comments;
pub mod paging;
pub mod status;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::types::EntityId;
pub use status::Status;

/// Field name to value mapping used for create/update payloads and stored documents.
pub type Fields = serde_json::Map<String, Value>;

/// Keys assigned by the server. Incoming data never sets them.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// A record type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the records live in
    const COLLECTION: &'static str;

    /// Human readable resource name used in errors and logs
    const NAME: &'static str;

    /// Fields whose non-null values must be unique across the collection
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> EntityId;
}

/// Entities that carry a [`Status`] and can be flipped between active and inactive.
pub trait StatusTogglable: Entity {
    fn status(&self) -> Status;
}

/// Remove server-assigned keys from incoming data.
pub fn strip_reserved(mut data: Fields) -> Fields {
    for key in RESERVED_FIELDS {
        data.remove(key);
    }
    data
}

/// Current time at the precision documents are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 timestamps (microseconds, `Z` suffix).
///
/// Stored documents compare chronologically under plain string ordering only because every
/// timestamp has the same width.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&format(dt)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.is_empty() => DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| Some(dt.with_timezone(&Utc)))
                    .map_err(serde::de::Error::custom),
                _ => Ok(None),
            }
        }
    }

    /// Like [`option`], but `null` or `""` deserializes to `Some(None)` so an update can clear the
    /// value. Use with `#[serde(default, skip_serializing_if = "Option::is_none")]`.
    pub mod nullable {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<Option<DateTime<Utc>>>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(Some(dt)) => serializer.serialize_some(&format(dt)),
                _ => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error> {
            super::option::deserialize(deserializer).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_strip_reserved() {
        let data = json!({"id": "x", "created_at": "y", "updated_at": "z", "title": "kept"});
        let Value::Object(map) = data else { unreachable!() };
        let stripped = strip_reserved(map);
        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped["title"], "kept");
    }

    #[test]
    fn test_timestamps_are_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(timestamp::format(&whole), "2024-01-02T03:04:05.000000Z");
        assert_eq!(timestamp::format(&now()).len(), timestamp::format(&whole).len());
    }

    #[test]
    fn test_fixed_width_orders_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let later = earlier + chrono::Duration::microseconds(1500);
        assert!(timestamp::format(&earlier) < timestamp::format(&later));
    }
}
