//! Info-kind taxonomy: the fact categories stored against an entity
//!
//! Every kind serializes to the same string the graph store uses as the
//! relation type name, so `InfoKind::TimeStart` is stored as `:TIME_START`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of fact attached to an entity or action node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfoKind {
    /// Plain literal value ("the intercom code is 1234")
    #[serde(rename = "VAL")]
    Val,
    /// Location, itself a noun-phrase entity
    #[serde(rename = "LOC")]
    Loc,
    #[serde(rename = "TIME_POINT")]
    TimePoint,
    #[serde(rename = "TIME_START")]
    TimeStart,
    #[serde(rename = "TIME_END")]
    TimeEnd,
    #[serde(rename = "TIME_RANGE")]
    TimeRange,
    #[serde(rename = "TIME_DURATION")]
    TimeDuration,
    /// Subject performed an action (structural, action records only)
    #[serde(rename = "ACTION")]
    Action,
    /// Direct object of an action (structural, action records only)
    #[serde(rename = "CE")]
    Ce,
}

/// How a fact of a given kind hangs off its owner node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachStrategy {
    /// A fresh `Literal {value}` node behind a kind-labeled edge
    Literal,
    /// A compiled noun-phrase sub-entity behind a kind-labeled edge
    SubEntity,
    /// Part of the action-record skeleton, never set directly
    Structural,
}

impl AttachStrategy {
    /// Property of the fact target that carries the readable answer.
    pub fn answer_property(&self) -> &'static str {
        match self {
            AttachStrategy::Literal => "value",
            AttachStrategy::SubEntity | AttachStrategy::Structural => "name",
        }
    }
}

impl InfoKind {
    /// All kinds, in wire-vocabulary order
    pub const ALL: [InfoKind; 9] = [
        InfoKind::Val,
        InfoKind::Loc,
        InfoKind::TimePoint,
        InfoKind::TimeStart,
        InfoKind::TimeEnd,
        InfoKind::TimeRange,
        InfoKind::TimeDuration,
        InfoKind::Action,
        InfoKind::Ce,
    ];

    /// Stable label, identical to the relation type in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoKind::Val => "VAL",
            InfoKind::Loc => "LOC",
            InfoKind::TimePoint => "TIME_POINT",
            InfoKind::TimeStart => "TIME_START",
            InfoKind::TimeEnd => "TIME_END",
            InfoKind::TimeRange => "TIME_RANGE",
            InfoKind::TimeDuration => "TIME_DURATION",
            InfoKind::Action => "ACTION",
            InfoKind::Ce => "CE",
        }
    }

    /// Parse a label. Exact match only: the label doubles as a relation type.
    pub fn from_str(s: &str) -> Option<Self> {
        InfoKind::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    pub fn attach_strategy(&self) -> AttachStrategy {
        match self {
            InfoKind::Loc => AttachStrategy::SubEntity,
            InfoKind::Action | InfoKind::Ce => AttachStrategy::Structural,
            _ => AttachStrategy::Literal,
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(
            self,
            InfoKind::TimePoint
                | InfoKind::TimeStart
                | InfoKind::TimeEnd
                | InfoKind::TimeRange
                | InfoKind::TimeDuration
        )
    }
}

impl Default for InfoKind {
    fn default() -> Self {
        InfoKind::Val
    }
}

impl fmt::Display for InfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
