//! Numeric form inputs.
//!
//! The segment editor binds numeric fields straight to text inputs, so the
//! document can carry `""`, `"12"`, or `12` for the same field. `NumericInput`
//! keeps the raw text and answers the only question validation asks: is there
//! a usable number here?

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw numeric field as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumericInput(Option<String>);

impl NumericInput {
    /// An input the user never touched.
    #[must_use]
    pub fn empty() -> Self {
        Self(None)
    }

    /// Wrap raw text exactly as entered.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Some(raw.into()))
    }

    /// The raw text, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Parsed value. Blank, non-numeric, and non-finite text yield `None`.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        let trimmed = self.0.as_deref()?.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.value().is_some()
    }

    /// True when nothing but whitespace was entered.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.as_deref().is_none_or(|raw| raw.trim().is_empty())
    }
}

impl From<u64> for NumericInput {
    fn from(value: u64) -> Self {
        Self::new(value.to_string())
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::new(value.to_string())
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or(""))
    }
}

impl Serialize for NumericInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(raw) = self.0.as_deref() else {
            return serializer.serialize_none();
        };
        let trimmed = raw.trim();
        if let Ok(int) = trimmed.parse::<i64>() {
            return serializer.serialize_i64(int);
        }
        match self.value() {
            Some(float) => serializer.serialize_f64(float),
            None => serializer.serialize_str(raw),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Number(serde_json::Number),
    Text(String),
}

impl<'de> Deserialize<'de> for NumericInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawInput>::deserialize(deserializer)?;
        Ok(match raw {
            None => Self(None),
            Some(RawInput::Number(n)) => Self(Some(n.to_string())),
            Some(RawInput::Text(text)) => Self(Some(text)),
        })
    }
}

#[cfg(test)]
#[path = "input_test.rs"]
mod tests;
