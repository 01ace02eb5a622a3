//! Segment document: the aggregate root and its recursive rule tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SegmentError;
use crate::rule::{InfoRule, ListRule, ResponseRule};
use crate::subset::Subset;

/// Boolean combinator of a group. `nor` matches when none of the children do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    And,
    Or,
    Nor,
}

/// One node of the tree: a leaf predicate or a nested group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleNode {
    Info(InfoRule),
    Lists(ListRule),
    Responses(ResponseRule),
    Group(SegmentGroup),
}

impl RuleNode {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Group(_))
    }
}

impl From<InfoRule> for RuleNode {
    fn from(rule: InfoRule) -> Self {
        Self::Info(rule)
    }
}

impl From<ListRule> for RuleNode {
    fn from(rule: ListRule) -> Self {
        Self::Lists(rule)
    }
}

impl From<ResponseRule> for RuleNode {
    fn from(rule: ResponseRule) -> Self {
        Self::Responses(rule)
    }
}

impl From<SegmentGroup> for RuleNode {
    fn from(group: SegmentGroup) -> Self {
        Self::Group(group)
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info(rule) => fmt::Display::fmt(rule, f),
            Self::Lists(rule) => fmt::Display::fmt(rule, f),
            Self::Responses(rule) => fmt::Display::fmt(rule, f),
            Self::Group(group) => fmt::Display::fmt(group, f),
        }
    }
}

/// Internal node combining child rules with one [`Logic`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentGroup {
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub rules: Vec<RuleNode>,
}

impl SegmentGroup {
    #[must_use]
    pub fn new(logic: Logic) -> Self {
        Self { logic, rules: Vec::new() }
    }

    /// Builder-style append.
    #[must_use]
    pub fn with(mut self, node: impl Into<RuleNode>) -> Self {
        self.rules.push(node.into());
        self
    }

    pub fn push(&mut self, node: impl Into<RuleNode>) {
        self.rules.push(node.into());
    }

    /// All leaf predicates, depth-first in document order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&RuleNode> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.rules
            .iter()
            .map(|node| match node {
                RuleNode::Group(group) => group.leaf_count(),
                _ => 1,
            })
            .sum()
    }

    /// Nesting depth; a group of leaves has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .rules
            .iter()
            .filter_map(|node| match node {
                RuleNode::Group(group) => Some(group.depth()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

fn collect_leaves<'a>(group: &'a SegmentGroup, out: &mut Vec<&'a RuleNode>) {
    for node in &group.rules {
        match node {
            RuleNode::Group(child) => collect_leaves(child, out),
            leaf => out.push(leaf),
        }
    }
}

impl fmt::Display for SegmentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joiner = match self.logic {
            Logic::And => " AND ",
            Logic::Or | Logic::Nor => " OR ",
        };
        if self.logic == Logic::Nor {
            f.write_str("NOT ")?;
        }
        f.write_str("(")?;
        for (i, node) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(joiner)?;
            }
            write!(f, "{node}")?;
        }
        f.write_str(")")
    }
}

/// A saved, named contact filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub rules: SegmentGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<Subset>,
}

impl Segment {
    #[must_use]
    pub fn new(name: impl Into<String>, rules: SegmentGroup) -> Self {
        Self { id: None, name: name.into(), rules, subset: None }
    }

    /// Parse a segment document.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Json`] when the text is not a segment document.
    pub fn from_json(text: &str) -> Result<Self, SegmentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the document as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SegmentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.rules)?;
        if let Some(subset) = &self.subset {
            write!(f, " [{subset}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
