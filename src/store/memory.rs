//! In-process graph store
//!
//! Interprets patterns directly against an adjacency list guarded by an
//! async `RwLock`. Writes hold the lock for the whole pattern, so a write is
//! all-or-nothing. Reads enumerate bindings by backtracking over the pattern
//! elements in order.

use crate::compiler::{EdgeOp, EdgePattern, NodeOp, NodePattern, Pattern, PatternElement, VarId};
use crate::error::{KnowledgeError, Result};
use crate::schema::{NodeLabel, Relation};
use crate::store::{GraphStore, ReadRequest};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNode {
    pub label: NodeLabel,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEdge {
    pub from: usize,
    pub relation: Relation,
    pub to: usize,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct GraphData {
    nodes: Vec<MemoryNode>,
    /// Insertion order doubles as recency
    edges: Vec<MemoryEdge>,
}

#[derive(Debug, Clone, Default)]
struct Binding {
    nodes: HashMap<VarId, usize>,
    edges: HashMap<VarId, usize>,
}

/// Shared in-memory graph; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    data: Arc<RwLock<GraphData>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn node_count(&self) -> usize {
        self.data.read().await.nodes.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.data.read().await.edges.len()
    }

    /// Snapshot of all nodes carrying `label`
    pub async fn nodes_with_label(&self, label: NodeLabel) -> Vec<MemoryNode> {
        let data = self.data.read().await;
        data.nodes.iter().filter(|n| n.label == label).cloned().collect()
    }

    /// Snapshot of all edges of `relation`
    pub async fn edges_of(&self, relation: Relation) -> Vec<MemoryEdge> {
        let data = self.data.read().await;
        data.edges
            .iter()
            .filter(|e| e.relation == relation)
            .cloned()
            .collect()
    }

    /// Node by index, as referenced from [`MemoryEdge`]
    pub async fn node(&self, index: usize) -> Option<MemoryNode> {
        self.data.read().await.nodes.get(index).cloned()
    }
}

fn to_map(properties: &[(&'static str, String)]) -> BTreeMap<String, String> {
    properties
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn has_properties(actual: &BTreeMap<String, String>, wanted: &[(&'static str, String)]) -> bool {
    wanted
        .iter()
        .all(|(key, value)| actual.get(*key) == Some(value))
}

fn node_fits(node: &MemoryNode, pattern: &NodePattern) -> bool {
    pattern.label.map_or(true, |label| label == node.label)
        && has_properties(&node.properties, &pattern.properties)
}

fn is_match(element: &PatternElement) -> bool {
    match element {
        PatternElement::Node(node) => node.op == NodeOp::Match,
        PatternElement::Edge(edge) => edge.op == EdgeOp::Match,
    }
}

fn endpoint_fits(binding: &Binding, var: VarId, index: usize) -> bool {
    binding.nodes.get(&var).map_or(true, |bound| *bound == index)
}

impl GraphData {
    /// Reject patterns this store cannot apply before touching any data.
    fn validate_write(pattern: &Pattern) -> Result<()> {
        let mut declared = HashSet::new();
        for element in pattern.elements() {
            match element {
                PatternElement::Node(node) if node.op == NodeOp::Match => {
                    return Err(KnowledgeError::Query(format!(
                        "write pattern cannot match node {}",
                        node.var
                    )));
                }
                PatternElement::Node(node) => {
                    declared.insert(node.var);
                }
                PatternElement::Edge(edge) => {
                    if edge.op == EdgeOp::Match {
                        return Err(KnowledgeError::Query(format!(
                            "write pattern cannot match edge {}-[:{}]->{}",
                            edge.from, edge.relation, edge.to
                        )));
                    }
                    if !declared.contains(&edge.from) || !declared.contains(&edge.to) {
                        return Err(KnowledgeError::Query(format!(
                            "edge {}-[:{}]->{} references an undeclared node",
                            edge.from, edge.relation, edge.to
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, pattern: &Pattern) {
        let mut bound: HashMap<VarId, usize> = HashMap::new();

        for element in pattern.elements() {
            match element {
                PatternElement::Node(node) => {
                    let existing = match node.op {
                        NodeOp::Merge => self.nodes.iter().position(|n| node_fits(n, node)),
                        _ => None,
                    };
                    let index = existing.unwrap_or_else(|| {
                        self.nodes.push(MemoryNode {
                            label: node.label.unwrap_or(NodeLabel::Literal),
                            properties: to_map(&node.properties),
                        });
                        self.nodes.len() - 1
                    });
                    bound.insert(node.var, index);
                }
                PatternElement::Edge(edge) => {
                    self.edges.push(MemoryEdge {
                        from: bound[&edge.from],
                        relation: edge.relation,
                        to: bound[&edge.to],
                        properties: to_map(&edge.properties),
                    });
                }
            }
        }
    }

    fn search(&self, elements: &[PatternElement], binding: Binding, out: &mut Vec<Binding>) {
        let Some((first, rest)) = elements.split_first() else {
            out.push(binding);
            return;
        };

        match first {
            PatternElement::Node(node) => {
                if let Some(&index) = binding.nodes.get(&node.var) {
                    if node_fits(&self.nodes[index], node) {
                        self.search(rest, binding, out);
                    }
                    return;
                }
                for (index, candidate) in self.nodes.iter().enumerate() {
                    if node_fits(candidate, node) {
                        let mut next = binding.clone();
                        next.nodes.insert(node.var, index);
                        self.search(rest, next, out);
                    }
                }
            }
            PatternElement::Edge(edge) => {
                for (index, candidate) in self.edges.iter().enumerate() {
                    if !self.edge_fits(&binding, candidate, edge) {
                        continue;
                    }
                    let mut next = binding.clone();
                    next.nodes.insert(edge.from, candidate.from);
                    next.nodes.insert(edge.to, candidate.to);
                    if let Some(var) = edge.var {
                        next.edges.insert(var, index);
                    }
                    self.search(rest, next, out);
                }
            }
        }
    }

    fn edge_fits(&self, binding: &Binding, candidate: &MemoryEdge, edge: &EdgePattern) -> bool {
        candidate.relation == edge.relation
            && has_properties(&candidate.properties, &edge.properties)
            && endpoint_fits(binding, edge.from, candidate.from)
            && endpoint_fits(binding, edge.to, candidate.to)
            // a self-loop pattern needs a self-loop edge
            && (edge.from != edge.to || candidate.from == candidate.to)
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn write(&self, pattern: &Pattern) -> Result<()> {
        GraphData::validate_write(pattern)?;

        let mut data = self.data.write().await;
        data.apply(pattern);
        debug!(
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            "Applied pattern to memory graph"
        );
        Ok(())
    }

    async fn read(&self, request: &ReadRequest) -> Result<Vec<String>> {
        if !request.pattern.elements().iter().all(is_match) {
            return Err(KnowledgeError::Query(
                "read pattern contains write elements".to_string(),
            ));
        }

        let data = self.data.read().await;
        let mut bindings = Vec::new();
        data.search(request.pattern.elements(), Binding::default(), &mut bindings);

        let mut rows: Vec<(usize, Option<usize>)> = Vec::new();
        for binding in &bindings {
            let target = *binding.nodes.get(&request.target).ok_or_else(|| {
                KnowledgeError::Query(format!("target {} is not bound by the pattern", request.target))
            })?;
            let edge = match request.newest_by {
                Some(var) => Some(*binding.edges.get(&var).ok_or_else(|| {
                    KnowledgeError::Query(format!("ordering edge {} is not bound by the pattern", var))
                })?),
                None => None,
            };
            if !rows.contains(&(target, edge)) {
                rows.push((target, edge));
            }
        }

        if request.newest_by.is_some() {
            // same ordering as `created_at DESC`: later edges were stored later
            rows.sort_by(|a, b| b.1.cmp(&a.1));
        }

        let answers: Vec<String> = rows
            .into_iter()
            .filter_map(|(target, _)| data.nodes[target].properties.get(request.property).cloned())
            .take(request.limit.unwrap_or(usize::MAX))
            .collect();

        debug!(
            bindings = bindings.len(),
            answers = answers.len(),
            "Evaluated read against memory graph"
        );
        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, CompileMode};
    use crate::schema::{NounPhrase, SpecifierTag};

    fn my_keys() -> NounPhrase {
        NounPhrase::new("cheile")
            .with_lemma("cheie")
            .with_specifier(SpecifierTag::Whose, NounPhrase::new("mele").with_lemma("eu"))
    }

    #[tokio::test]
    async fn test_class_nodes_are_merged() {
        let graph = MemoryGraph::new();

        for _ in 0..2 {
            let compiled = compile(&my_keys(), CompileMode::Create).unwrap();
            graph.write(&compiled.pattern).await.unwrap();
        }

        // two instances, but one class node per lemma
        assert_eq!(graph.nodes_with_label(NodeLabel::Instance).await.len(), 2);
        assert_eq!(graph.nodes_with_label(NodeLabel::Class).await.len(), 2);
        assert_eq!(graph.edges_of(Relation::Has).await.len(), 2);
    }

    #[tokio::test]
    async fn test_match_finds_stored_instance() {
        let graph = MemoryGraph::new();
        let created = compile(&my_keys(), CompileMode::Create).unwrap();
        graph.write(&created.pattern).await.unwrap();

        let matched = compile(&my_keys(), CompileMode::Match).unwrap();
        let request = ReadRequest {
            pattern: matched.pattern,
            target: matched.root,
            property: "name",
            newest_by: None,
            limit: None,
        };

        assert_eq!(graph.read(&request).await.unwrap(), vec!["cheile eu".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_sub_pattern_yields_no_rows() {
        let graph = MemoryGraph::new();
        let created = compile(&my_keys(), CompileMode::Create).unwrap();
        graph.write(&created.pattern).await.unwrap();

        // "cheile tale": same class, different possessor
        let yours = NounPhrase::new("cheile")
            .with_lemma("cheie")
            .with_specifier(SpecifierTag::Whose, NounPhrase::new("tale").with_lemma("tu"));
        let matched = compile(&yours, CompileMode::Match).unwrap();
        let request = ReadRequest {
            pattern: matched.pattern,
            target: matched.root,
            property: "name",
            newest_by: None,
            limit: None,
        };

        assert!(graph.read(&request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_write_leaves_graph_untouched() {
        let graph = MemoryGraph::new();
        let mut pattern = compile(&my_keys(), CompileMode::Create).unwrap().pattern;
        pattern.push_edge(EdgePattern::new(VarId(0), Relation::Spec, VarId(99), EdgeOp::Create));

        assert!(graph.write(&pattern).await.is_err());
        assert_eq!(graph.node_count().await, 0);
        assert_eq!(graph.edge_count().await, 0);
    }

    #[tokio::test]
    async fn test_read_rejects_create_pattern() {
        let graph = MemoryGraph::new();
        let created = compile(&my_keys(), CompileMode::Create).unwrap();
        let request = ReadRequest {
            pattern: created.pattern,
            target: created.root,
            property: "name",
            newest_by: None,
            limit: None,
        };

        assert!(matches!(graph.read(&request).await, Err(KnowledgeError::Query(_))));
    }
}
