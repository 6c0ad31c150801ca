//! Constructors for optional fields.
//!
//! Resource and request fields are `Option<T>`: `None` is never sent and
//! stays `None` when the server omits the key. Fields that can be cleared
//! are `Option<Option<T>>` serialized through [`nullable`], where
//! `Some(None)` is sent as an explicit JSON `null`.

use chrono::{DateTime, Utc};

use crate::dates::{Date, Time, Timestamp};

pub fn bool(value: bool) -> Option<bool> {
    Some(value)
}

pub fn int(value: i32) -> Option<i32> {
    Some(value)
}

pub fn int64(value: i64) -> Option<i64> {
    Some(value)
}

pub fn float64(value: f64) -> Option<f64> {
    Some(value)
}

pub fn string(value: impl Into<String>) -> Option<String> {
    Some(value.into())
}

pub fn date(value: Date) -> Option<Date> {
    Some(value)
}

pub fn time(value: Time) -> Option<Time> {
    Some(value)
}

pub fn timestamp(value: DateTime<Utc>) -> Option<Timestamp> {
    Some(Timestamp::from(value))
}

/// Value for a clearable field.
pub fn set<T>(value: T) -> Option<Option<T>> {
    Some(Some(value))
}

/// Explicit `null` for a clearable field.
pub fn null<T>() -> Option<Option<T>> {
    Some(None)
}

/// Serde adapter for `Option<Option<T>>` fields; pair it with
/// `default` and `skip_serializing_if = "Option::is_none"`.
pub mod nullable {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(Some(inner)) => inner.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
