//! Deserializer for lists the service may send as `null` when empty.

use serde::{Deserialize, Deserializer};

/// Read a list that is either an array or `null`. Pair with
/// `#[serde(default)]` so a missing key reads as empty too.
pub(crate) fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
