//! Serde helpers for the persisted record format.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Deserializes an optional field whose key must be present.
///
/// `null` reads as `None`; a missing key is reported as a missing field instead of
/// silently defaulting, so a record written without a documented key is rejected.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

pub(crate) fn screening_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = bool::deserialize(deserializer)?;
    if !flag {
        return Err(D::Error::custom(
            "expected `is_initial_sp_screening = true` for an initial-screening record",
        ));
    }
    Ok(flag)
}

pub(crate) fn post_screening_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = bool::deserialize(deserializer)?;
    if flag {
        return Err(D::Error::custom(
            "expected `is_initial_sp_screening = false` for a post-screening record",
        ));
    }
    Ok(flag)
}
