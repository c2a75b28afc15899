//! JSON serialization wrapper functions for item types.
//!
//! Every model type derives `Serialize`/`Deserialize`, so JSON export is
//! a thin layer over `serde_json`. XML remains the canonical wire form.
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Deserialize an item from a JSON string.
///
/// # Examples
///
/// ```ignore
/// use hvt_serde::json::from_json_str;
/// use hvt_things::items::Weight;
///
/// let weight: Weight = from_json_str(json)?;
/// ```
pub fn from_json_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    Ok(serde_json::from_str(s)?)
}

/// Serialize an item to a JSON string.
pub fn to_json_string<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_string(value)?)
}

/// Serialize an item to a pretty-printed JSON string.
pub fn to_json_string_pretty<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_string_pretty(value)?)
}

/// Serialize an item to a `serde_json::Value`.
pub fn to_json_value<T>(value: &T) -> Result<serde_json::Value>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_value(value)?)
}

/// Deserialize an item from a `serde_json::Value`.
pub fn from_json_value<T>(value: serde_json::Value) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    Ok(serde_json::from_value(value)?)
}
