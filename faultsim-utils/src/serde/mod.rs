//! Utility module for serde of dataset fields.

use std::{fmt::Display, str::FromStr};

use serde::{de::Error, Deserialize, Deserializer};

/// Characters that may decorate a field in the dataset, e.g. `'3'`.
const QUOTES: [char; 2] = ['\'', '"'];

/// Strip whitespace and any surrounding quote characters from a raw field.
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|c| QUOTES.contains(&c)).trim()
}

/// Deserialize a value that may be wrapped in quote characters, e.g. `'3'` or `"3"`.
pub fn deserialize_quoted<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let buf = String::deserialize(deserializer)?;
    strip_quotes(&buf)
        .parse()
        .map_err(|e| D::Error::custom(format!("cannot parse `{buf}`: {e}")))
}

/// Deserialize a (possibly quoted) value, falling back to `T::default()` if the field is empty.
pub fn deserialize_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    let buf = String::deserialize(deserializer)?;
    let stripped = strip_quotes(&buf);
    if stripped.is_empty() {
        return Ok(T::default());
    }
    stripped
        .parse()
        .map_err(|e| D::Error::custom(format!("cannot parse `{buf}`: {e}")))
}
