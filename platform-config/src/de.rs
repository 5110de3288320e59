//! Serde helpers for values that may arrive as strings.
//!
//! Environment variables and `.env` files only produce strings, while JSON
//! and TOML files carry typed scalars. These helpers accept either.

use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Text(String),
}

impl<T> Lenient<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn into_value<E: serde::de::Error>(self) -> Result<T, E> {
        match self {
            Lenient::Value(value) => Ok(value),
            Lenient::Text(text) => text.trim().parse().map_err(E::custom),
        }
    }
}

/// Deserialize `T` from its native form or from a string.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    Lenient::<T>::deserialize(deserializer)?.into_value()
}

/// Like [`lenient`], for optional fields. Empty strings map to `None`.
pub fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    match Option::<Lenient<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(value) => value.into_value().map(Some),
    }
}
