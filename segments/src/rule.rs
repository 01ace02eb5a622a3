//! Leaf predicates of a segment tree.
//!
//! Three shapes exist: `info` tests a contact property or custom field,
//! `lists` tests list membership, and `responses` tests engagement history
//! against broadcasts.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::input::NumericInput;

// =============================================================================
// INFO RULES
// =============================================================================

/// Data type of a contact property. Decides which operators apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Tag,
}

/// Comparison applied by an `info` rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsSet,
    NotSet,
    Gt,
    Gte,
    Lt,
    Lte,
    Before,
    After,
    On,
    WithinLastDays,
    Has,
    NotHas,
}

pub const TEXT_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::NotContains,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::IsSet,
    Operator::NotSet,
];

pub const NUMBER_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Gt,
    Operator::Gte,
    Operator::Lt,
    Operator::Lte,
    Operator::IsSet,
    Operator::NotSet,
];

pub const DATE_OPERATORS: &[Operator] = &[
    Operator::Before,
    Operator::After,
    Operator::On,
    Operator::WithinLastDays,
    Operator::IsSet,
    Operator::NotSet,
];

pub const TAG_OPERATORS: &[Operator] = &[Operator::Has, Operator::NotHas];

/// Operators offered for a field of the given kind, in menu order.
#[must_use]
pub fn operators_for(kind: FieldKind) -> &'static [Operator] {
    match kind {
        FieldKind::Text => TEXT_OPERATORS,
        FieldKind::Number => NUMBER_OPERATORS,
        FieldKind::Date => DATE_OPERATORS,
        FieldKind::Tag => TAG_OPERATORS,
    }
}

impl Operator {
    #[must_use]
    pub fn applies_to(self, kind: FieldKind) -> bool {
        operators_for(kind).contains(&self)
    }

    /// `isset`/`notset` test presence only and take no operand.
    #[must_use]
    pub fn needs_value(self) -> bool {
        !matches!(self, Self::IsSet | Self::NotSet)
    }

    /// Wire name, as the API spells it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notequals",
            Self::Contains => "contains",
            Self::NotContains => "notcontains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::IsSet => "isset",
            Self::NotSet => "notset",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Before => "before",
            Self::After => "after",
            Self::On => "on",
            Self::WithinLastDays => "withinlastdays",
            Self::Has => "has",
            Self::NotHas => "nothas",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tests a contact property or custom field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoRule {
    pub field: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl fmt::Display for InfoRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.operator)?;
        match &self.value {
            Some(value) if self.operator.needs_value() => write!(f, " {value}"),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// LIST RULES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    In,
    NotIn,
}

/// Tests membership in a contact list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRule {
    #[serde(default)]
    pub list_id: String,
    pub membership: Membership,
}

impl fmt::Display for ListRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.membership {
            Membership::In => write!(f, "in list {}", self.list_id),
            Membership::NotIn => write!(f, "not in list {}", self.list_id),
        }
    }
}

// =============================================================================
// RESPONSE RULES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementType {
    Opened,
    Clicked,
    Delivered,
    Unsubscribed,
    Bounced,
    Complained,
}

impl fmt::Display for EngagementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Opened => "opened",
            Self::Clicked => "clicked",
            Self::Delivered => "delivered",
            Self::Unsubscribed => "unsubscribed",
            Self::Bounced => "bounced",
            Self::Complained => "complained",
        })
    }
}

/// How engagement events are tested: at least one, none, or an exact count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseOp {
    Any,
    None,
    Count,
}

/// Whether the rule looks at all history or a trailing window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Anytime,
    Last,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    #[default]
    Days,
    Hours,
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Days => "days",
            Self::Hours => "hours",
        })
    }
}

/// Tests engagement history, optionally scoped to one broadcast and a
/// trailing time window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRule {
    pub engagement_type: EngagementType,
    pub op: ResponseOp,
    #[serde(default, skip_serializing_if = "NumericInput::is_blank")]
    pub count: NumericInput,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default, skip_serializing_if = "NumericInput::is_blank")]
    pub period: NumericInput,
    #[serde(default)]
    pub period_unit: PeriodUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_id: Option<String>,
}

impl ResponseRule {
    /// A rule matching any engagement of `engagement_type` over all history.
    #[must_use]
    pub fn any(engagement_type: EngagementType) -> Self {
        Self {
            engagement_type,
            op: ResponseOp::Any,
            count: NumericInput::empty(),
            timeframe: Timeframe::Anytime,
            period: NumericInput::empty(),
            period_unit: PeriodUnit::Days,
            broadcast_id: None,
        }
    }

    /// Restrict to the trailing `period` units.
    #[must_use]
    pub fn within(mut self, period: impl Into<NumericInput>, unit: PeriodUnit) -> Self {
        self.timeframe = Timeframe::Last;
        self.period = period.into();
        self.period_unit = unit;
        self
    }

    /// Require an exact number of occurrences.
    #[must_use]
    pub fn counting(mut self, count: impl Into<NumericInput>) -> Self {
        self.op = ResponseOp::Count;
        self.count = count.into();
        self
    }

    #[must_use]
    pub fn is_windowed(&self) -> bool {
        self.timeframe == Timeframe::Last
    }

    #[must_use]
    pub fn is_counting(&self) -> bool {
        self.op == ResponseOp::Count
    }
}

impl fmt::Display for ResponseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            ResponseOp::Any => write!(f, "{} any", self.engagement_type)?,
            ResponseOp::None => write!(f, "{} none", self.engagement_type)?,
            ResponseOp::Count => write!(f, "{} count {}", self.engagement_type, self.count)?,
        }
        if let Some(broadcast_id) = &self.broadcast_id {
            write!(f, " broadcast {broadcast_id}")?;
        }
        if self.is_windowed() {
            write!(f, " within last {} {}", self.period, self.period_unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "rule_test.rs"]
mod tests;
