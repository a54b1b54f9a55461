//! Lenient decoding for scalars coming out of the conferencing bridge.
//!
//! The tool endpoints forward values produced from XML, so booleans and
//! counts arrive either as JSON scalars or as strings (`"true"`, `"3"`).

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Int(n) => Some(*n != 0),
            Scalar::Float(f) => Some(*f != 0.0),
            Scalar::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Bool(_) => None,
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) => Some(*f as i64),
            Scalar::Str(s) => s.trim().parse().ok(),
        }
    }
}

pub fn opt_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<Scalar> = Option::deserialize(d)?;
    Ok(v.and_then(|s| s.as_bool()))
}

pub fn bool_or_false<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_bool(d)?.unwrap_or(false))
}

pub fn opt_i64<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<Scalar> = Option::deserialize(d)?;
    Ok(v.and_then(|s| s.as_i64()))
}

pub fn i64_or_zero<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_i64(d)?.unwrap_or(0))
}

/// Negative and unparsable counts decode as zero.
pub fn u32_or_zero<'de, D>(d: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_i64(d)?
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0))
}

pub fn u64_or_zero<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_i64(d)?
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0))
}
