//! Lenient field decoding for server payloads.
//!
//! The venue server is not consistent about scalar encodings (ids arrive
//! as numbers or strings, party sizes occasionally as strings), so
//! snapshot fields go through these helpers instead of strict serde.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Decode any JSON scalar into `T` via its text form.
///
/// `null`, blank strings, and values `T` cannot parse become `None`.
pub(crate) fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<Scalar>::deserialize(de)?;
    Ok(raw
        .map(Scalar::into_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok()))
}

/// Customer field: either the display name or a nested `{ "name": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CustomerField {
    Name(String),
    Object { name: Option<String> },
}

pub(crate) fn customer<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<CustomerField>::deserialize(de)?;
    Ok(raw
        .and_then(|c| match c {
            CustomerField::Name(n) => Some(n),
            CustomerField::Object { name } => name,
        })
        .filter(|n| !n.trim().is_empty()))
}
