//! Lenient deserializers for values that usually arrive as strings.
//!
//! Environment variables are always text, so numeric and boolean fields need
//! to accept their string spelling as well as the native type. These helpers
//! are public so that application schemas can reuse them:
//!
//! ```rust,ignore
//! #[derive(Default, Serialize, Deserialize)]
//! struct GameSettings {
//!     #[serde(default, deserialize_with = "talon_config::de::number")]
//!     max_players: u32,
//! }
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;

struct NumberVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for NumberVisitor<T>
where
    T: TryFrom<u64> + TryFrom<i64> + FromStr,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        T::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        T::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.trim()
            .parse::<T>()
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

/// Accepts an integer or a string holding one, e.g. `3306` or `"3306"`.
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + TryFrom<i64> + FromStr,
{
    deserializer.deserialize_any(NumberVisitor(PhantomData))
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean or one of \"true\", \"false\", \"1\", \"0\", \"yes\", \"no\"")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        match v {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(Unexpected::Signed(v), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
        }
    }
}

/// Accepts a boolean or its common string spellings (`"true"`, `"0"`, `"yes"`, ...).
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlagVisitor)
}

/// A string that may also have been written as a bare number.
struct Text(String);

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TextVisitor;

        impl<'de> Visitor<'de> for TextVisitor {
            type Value = Text;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Text, E> {
                Ok(Text(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Text, E> {
                Ok(Text(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }
        }

        deserializer.deserialize_any(TextVisitor)
    }
}

/// Trims surrounding whitespace from credentials and identifiers.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Text::deserialize(deserializer).map(|text| text.0.trim().to_owned())
}

/// Optional trimmed string; blank values collapse to `None`.
///
/// Discord snowflakes are 64-bit integers, so they are kept as strings to
/// survive formats that would otherwise round them.
pub fn optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Text>::deserialize(deserializer)?;
    Ok(value
        .map(|text| text.0.trim().to_owned())
        .filter(|text| !text.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "number")]
        port: u16,
        #[serde(deserialize_with = "flag")]
        enabled: bool,
        #[serde(deserialize_with = "trimmed")]
        token: String,
        #[serde(default, deserialize_with = "optional_trimmed")]
        guild: Option<String>,
    }

    #[test]
    fn test_coerces_string_spellings() {
        let sample: Sample = serde_json::from_value(json!({
            "port": "3306",
            "enabled": "TRUE",
            "token": "  secret \n",
            "guild": 123456789012345678u64,
        }))
        .unwrap();

        assert_eq!(sample.port, 3306);
        assert!(sample.enabled);
        assert_eq!(sample.token, "secret");
        assert_eq!(sample.guild.as_deref(), Some("123456789012345678"));
    }

    #[test]
    fn test_native_values_pass_through() {
        let sample: Sample = serde_json::from_value(json!({
            "port": 5432,
            "enabled": false,
            "token": "abc",
        }))
        .unwrap();

        assert_eq!(sample.port, 5432);
        assert!(!sample.enabled);
        assert_eq!(sample.guild, None);
    }

    #[test]
    fn test_rejects_garbage() {
        let port = serde_json::from_value::<Sample>(json!({
            "port": "not-a-port", "enabled": true, "token": "abc",
        }));
        assert!(port.is_err());

        let out_of_range = serde_json::from_value::<Sample>(json!({
            "port": 70000, "enabled": true, "token": "abc",
        }));
        assert!(out_of_range.is_err());

        let flag = serde_json::from_value::<Sample>(json!({
            "port": 1, "enabled": "maybe", "token": "abc",
        }));
        assert!(flag.is_err());
    }

    #[test]
    fn test_blank_optional_is_none() {
        let sample: Sample = serde_json::from_value(json!({
            "port": 1, "enabled": true, "token": "abc", "guild": "   ",
        }))
        .unwrap();
        assert_eq!(sample.guild, None);
    }
}
