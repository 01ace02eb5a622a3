//! Segment rule model and structural validator.
//!
//! This crate owns the segment document shared by the portal client and the
//! command line. A segment is a recursive boolean tree (`and`/`or`/`nor`)
//! over leaf predicates on contact properties, list membership, and
//! engagement history. The client never evaluates the tree against contacts;
//! it only checks that the document is complete enough to submit.

mod input;
mod model;
mod rule;
mod subset;
mod validate;

pub use input::NumericInput;
pub use model::{Logic, RuleNode, Segment, SegmentGroup};
pub use rule::{
    DATE_OPERATORS, EngagementType, FieldKind, InfoRule, ListRule, Membership, NUMBER_OPERATORS, Operator,
    PeriodUnit, ResponseOp, ResponseRule, TAG_OPERATORS, TEXT_OPERATORS, Timeframe, operators_for,
};
pub use subset::{Subset, SubsetKind, SubsetSort};
pub use validate::{RulePath, ValidationError, is_valid, validate};

/// Errors raised while loading or resolving a segment document.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    /// The document is not valid segment JSON.
    #[error("invalid segment JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The subset has no usable numeric value.
    #[error("subset value is missing")]
    MissingSubsetValue,
    /// A percent subset outside `0..=100`.
    #[error("percent subset must be between 0 and 100, got {0}")]
    PercentOutOfRange(f64),
    /// A count subset that is negative or fractional.
    #[error("count subset must be a non-negative integer, got {0}")]
    InvalidCount(f64),
    /// The document failed structural validation.
    #[error("segment failed validation: {0}")]
    Invalid(#[from] ValidationError),
}
