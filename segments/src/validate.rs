//! Structural validation of segment documents.
//!
//! DESIGN
//! ======
//! A depth-first fold over the tree that stops at the first gap. It answers
//! "is this complete enough to submit?", never "which contacts match?".
//! Validity of a group is the conjunction of its children's validity,
//! whatever the group's own `logic` is.
//!
//! Only the inputs the editing form cannot enforce on its own are checked:
//! the subset value and the numeric qualifiers of `responses` rules. `info`
//! and `lists` leaves always pass here.

use std::fmt;

use crate::model::{RuleNode, Segment, SegmentGroup};
use crate::rule::{EngagementType, ResponseRule};
use crate::subset::SubsetKind;

/// Position of a node as child indices from the root group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RulePath(pub Vec<usize>);

impl fmt::Display for RulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rules")?;
        for (depth, index) in self.0.iter().enumerate() {
            if depth > 0 {
                f.write_str(".rules")?;
            }
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

/// First structural gap found in a segment.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("segment has no rules")]
    EmptyRules,
    #[error("{kind} subset has no value")]
    MissingSubsetValue { kind: SubsetKind },
    #[error("group at {path} has no rules")]
    EmptyGroup { path: RulePath },
    #[error("rule at {path} counts {engagement} events but has no count")]
    MissingCount { path: RulePath, engagement: EngagementType },
    #[error("rule at {path} looks back over a time window but has no period")]
    MissingPeriod { path: RulePath },
}

/// Check that `segment` is complete enough to submit.
///
/// # Errors
///
/// Returns the first [`ValidationError`] met in depth-first order.
pub fn validate(segment: &Segment) -> Result<(), ValidationError> {
    if segment.rules.rules.is_empty() {
        return Err(ValidationError::EmptyRules);
    }

    if let Some(subset) = &segment.subset {
        if !subset.value.is_present() {
            return Err(ValidationError::MissingSubsetValue { kind: subset.kind });
        }
    }

    let mut path = Vec::new();
    validate_group(&segment.rules, &mut path)
}

/// Pure predicate form of [`validate`].
#[must_use]
pub fn is_valid(segment: &Segment) -> bool {
    validate(segment).is_ok()
}

fn validate_group(group: &SegmentGroup, path: &mut Vec<usize>) -> Result<(), ValidationError> {
    if group.rules.is_empty() {
        return Err(ValidationError::EmptyGroup { path: RulePath(path.clone()) });
    }

    for (index, node) in group.rules.iter().enumerate() {
        path.push(index);
        validate_node(node, path)?;
        path.pop();
    }
    Ok(())
}

fn validate_node(node: &RuleNode, path: &mut Vec<usize>) -> Result<(), ValidationError> {
    match node {
        RuleNode::Group(group) => validate_group(group, path),
        RuleNode::Responses(rule) => validate_response(rule, path),
        RuleNode::Info(_) | RuleNode::Lists(_) => Ok(()),
    }
}

fn validate_response(rule: &ResponseRule, path: &[usize]) -> Result<(), ValidationError> {
    if rule.is_windowed() && !rule.period.is_present() {
        return Err(ValidationError::MissingPeriod { path: RulePath(path.to_vec()) });
    }
    if rule.is_counting() && !rule.count.is_present() {
        return Err(ValidationError::MissingCount { path: RulePath(path.to_vec()), engagement: rule.engagement_type });
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
