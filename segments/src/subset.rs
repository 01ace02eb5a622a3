//! Subset restriction: keep a percentage or a fixed count of matches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SegmentError;
use crate::input::NumericInput;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsetKind {
    Percent,
    Count,
}

impl fmt::Display for SubsetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Percent => "percent",
            Self::Count => "count",
        })
    }
}

/// Order in which matches are taken when a subset is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsetSort {
    #[default]
    Random,
    RecentlyEngaged,
    RecentlyAdded,
    Oldest,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subset {
    #[serde(rename = "type")]
    pub kind: SubsetKind,
    #[serde(default)]
    pub value: NumericInput,
    #[serde(default)]
    pub sort: SubsetSort,
}

impl Subset {
    #[must_use]
    pub fn percent(value: impl Into<NumericInput>) -> Self {
        Self { kind: SubsetKind::Percent, value: value.into(), sort: SubsetSort::default() }
    }

    #[must_use]
    pub fn count(value: impl Into<NumericInput>) -> Self {
        Self { kind: SubsetKind::Count, value: value.into(), sort: SubsetSort::default() }
    }

    #[must_use]
    pub fn sorted_by(mut self, sort: SubsetSort) -> Self {
        self.sort = sort;
        self
    }

    /// The entered number, once it satisfies the range rule for its kind.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::MissingSubsetValue`] when no number was entered,
    /// [`SegmentError::PercentOutOfRange`] for a percentage outside `0..=100`,
    /// and [`SegmentError::InvalidCount`] for a negative or fractional count.
    pub fn check(&self) -> Result<f64, SegmentError> {
        let value = self.value.value().ok_or(SegmentError::MissingSubsetValue)?;
        match self.kind {
            SubsetKind::Percent if !(0.0..=100.0).contains(&value) => Err(SegmentError::PercentOutOfRange(value)),
            SubsetKind::Count if value < 0.0 || value.fract() != 0.0 => Err(SegmentError::InvalidCount(value)),
            _ => Ok(value),
        }
    }

    /// Number of contacts kept out of `total` matches.
    ///
    /// Percentages round down; a count larger than `total` keeps everything.
    ///
    /// # Errors
    ///
    /// See [`Subset::check`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn limit(&self, total: u64) -> Result<u64, SegmentError> {
        let value = self.check()?;
        Ok(match self.kind {
            SubsetKind::Percent => ((total as f64) * value / 100.0).floor() as u64,
            SubsetKind::Count => (value as u64).min(total),
        })
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SubsetKind::Percent => write!(f, "{}%", self.value),
            SubsetKind::Count => write!(f, "first {}", self.value),
        }
    }
}

#[cfg(test)]
#[path = "subset_test.rs"]
mod tests;
