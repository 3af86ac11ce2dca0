//! Structured graph patterns
//!
//! A [`Pattern`] is an ordered list of node and edge elements with bound
//! literal properties. It is plain data: stores either interpret it
//! directly ([`MemoryGraph`](crate::store::MemoryGraph)) or render it into
//! a parameterized query ([`cypher`](crate::compiler::cypher)). User text
//! only ever appears as property values, never in labels or relation types.

use crate::schema::{NodeLabel, Relation};
use std::collections::HashMap;
use std::fmt;

/// Pattern variable, unique within one compile invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Whether a compile writes new structure or looks up existing structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileMode {
    Create,
    Match,
}

/// What the store does with a node element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOp {
    /// Always a fresh node
    Create,
    /// Reuse a node with the same label and properties, or create it
    Merge,
    /// Bind to an existing node
    Match,
}

/// What the store does with an edge element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeOp {
    Create,
    Match,
}

impl From<CompileMode> for EdgeOp {
    fn from(mode: CompileMode) -> Self {
        match mode {
            CompileMode::Create => EdgeOp::Create,
            CompileMode::Match => EdgeOp::Match,
        }
    }
}

/// Property key/value pair; keys are fixed schema names
pub type Property = (&'static str, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePattern {
    pub var: VarId,
    /// `None` matches a node of any label
    pub label: Option<NodeLabel>,
    pub op: NodeOp,
    pub properties: Vec<Property>,
}

impl NodePattern {
    pub fn new(var: VarId, label: NodeLabel, op: NodeOp) -> Self {
        Self {
            var,
            label: Some(label),
            op,
            properties: Vec::new(),
        }
    }

    /// Any node, bound only through its edges
    pub fn any(var: VarId) -> Self {
        Self {
            var,
            label: None,
            op: NodeOp::Match,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.properties.push((key, value.into()));
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePattern {
    /// Only needed when the edge is referenced later (ordering)
    pub var: Option<VarId>,
    pub from: VarId,
    pub relation: Relation,
    pub to: VarId,
    pub op: EdgeOp,
    pub properties: Vec<Property>,
}

impl EdgePattern {
    pub fn new(from: VarId, relation: Relation, to: VarId, op: EdgeOp) -> Self {
        Self {
            var: None,
            from,
            relation,
            to,
            op,
            properties: Vec::new(),
        }
    }

    pub fn bound_to(mut self, var: VarId) -> Self {
        self.var = Some(var);
        self
    }

    pub fn with_property(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.properties.push((key, value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternElement {
    Node(NodePattern),
    Edge(EdgePattern),
}

/// Ordered node/edge elements; later elements may reference earlier variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    elements: Vec<PatternElement>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(&mut self, node: NodePattern) {
        self.elements.push(PatternElement::Node(node));
    }

    pub fn push_edge(&mut self, edge: EdgePattern) {
        self.elements.push(PatternElement::Edge(edge));
    }

    pub fn extend(&mut self, other: Pattern) {
        self.elements.extend(other.elements);
    }

    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodePattern> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Node(n) => Some(n),
            PatternElement::Edge(_) => None,
        })
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgePattern> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Edge(edge) => Some(edge),
            PatternElement::Node(_) => None,
        })
    }

    pub fn node(&self, var: VarId) -> Option<&NodePattern> {
        self.nodes().find(|n| n.var == var)
    }

    /// Same pattern with variables renumbered by first appearance.
    ///
    /// Two patterns with equal shapes differ at most in variable ids.
    pub fn shape(&self) -> Pattern {
        let mut slots: HashMap<VarId, VarId> = HashMap::new();
        let mut slot = |var: VarId| -> VarId {
            let next = VarId(slots.len());
            *slots.entry(var).or_insert(next)
        };

        let elements = self
            .elements
            .iter()
            .map(|element| match element {
                PatternElement::Node(node) => PatternElement::Node(NodePattern {
                    var: slot(node.var),
                    ..node.clone()
                }),
                PatternElement::Edge(edge) => {
                    let from = slot(edge.from);
                    let to = slot(edge.to);
                    PatternElement::Edge(EdgePattern {
                        var: edge.var.map(&mut slot),
                        from,
                        to,
                        ..edge.clone()
                    })
                }
            })
            .collect();

        Pattern { elements }
    }
}
