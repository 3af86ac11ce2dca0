//! Node labels and relation types of the memory graph
//!
//! Structural relations shape entities (`IS_A`, `SPEC`, `HAS`); fact
//! relations point from an entity or action node to the node holding the fact.

use crate::schema::info_kind::InfoKind;
use std::fmt;

/// Node label in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeLabel {
    /// A concept, keyed by lemma
    Class,
    /// One concrete referent of a class, keyed by composite name
    Instance,
    /// Leaf holding one literal string
    Literal,
    /// An action performed by a subject
    Action,
}

impl NodeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Class => "Class",
            NodeLabel::Instance => "Instance",
            NodeLabel::Literal => "Literal",
            NodeLabel::Action => "Action",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relation type in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// instance -> class
    IsA,
    /// instance -> descriptive specifier
    Spec,
    /// possessor -> possessed
    Has,
    /// owner -> fact holder
    Fact(InfoKind),
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::IsA => "IS_A",
            Relation::Spec => "SPEC",
            Relation::Has => "HAS",
            Relation::Fact(kind) => kind.as_str(),
        }
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, Relation::Fact(_))
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
