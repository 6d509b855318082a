/// Record identifiers
///
/// Every persisted entity is keyed by a `RecordId`: a positive 64-bit integer handed
/// out by the store in creation order. Identifiers are totally ordered, which is what
/// lets them double as keyset-pagination cursors.
///
/// On the wire (JSON bodies, token claims) an identifier is always a decimal string.
///
/// # Example
///
/// ```
/// use pawlog_shared::models::id::RecordId;
///
/// let id: RecordId = "42".parse().unwrap();
/// assert_eq!(id.get(), 42);
/// assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
/// ```

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Creation-ordered identifier of a User, Animal or TrainingLog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct RecordId(i64);

/// Error returned when a string is not a well-formed identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid identifier")]
pub struct InvalidRecordId(pub String);

impl RecordId {
    /// Wraps a raw value; returns `None` for zero or negative values
    pub fn new(value: i64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Raw integer value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Reject signs and other decoration that i64::from_str would accept.
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidRecordId(s.to_string()));
        }

        trimmed
            .parse::<i64>()
            .ok()
            .and_then(RecordId::new)
            .ok_or_else(|| InvalidRecordId(s.to_string()))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordIdVisitor;

        impl<'de> de::Visitor<'de> for RecordIdVisitor {
            type Value = RecordId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive integer identifier, as a string or a number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(RecordId::new)
                    .ok_or_else(|| E::custom(InvalidRecordId(v.to_string())))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
                RecordId::new(v).ok_or_else(|| E::custom(InvalidRecordId(v.to_string())))
            }
        }

        deserializer.deserialize_any(RecordIdVisitor)
    }
}
