//! Rendering patterns into parameterized Cypher
//!
//! Labels, relation types and property keys come from schema enums and
//! constants. Every property value becomes a `$pN` parameter.

use crate::compiler::facts::CREATED_AT;
use crate::compiler::pattern::{
    EdgeOp, EdgePattern, NodeOp, NodePattern, Pattern, PatternElement, Property, VarId,
};
use crate::error::{KnowledgeError, Result};
use crate::store::ReadRequest;
use neo4rs::{query, Query};
use std::collections::HashSet;

/// Column holding the answer of a read
pub const ANSWER: &str = "answer";

/// Cypher text plus its bound parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CypherStatement {
    pub text: String,
    pub params: Vec<(String, String)>,
}

impl CypherStatement {
    pub fn to_query(&self) -> Query {
        self.params
            .iter()
            .fold(query(&self.text), |q, (key, value)| q.param(key, value.clone()))
    }
}

#[derive(Default)]
struct Renderer {
    clauses: Vec<String>,
    params: Vec<(String, String)>,
}

impl Renderer {
    fn bind(&mut self, value: &str) -> String {
        let name = format!("p{}", self.params.len());
        self.params.push((name.clone(), value.to_string()));
        format!("${}", name)
    }

    fn properties(&mut self, properties: &[Property]) -> String {
        if properties.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = properties
            .iter()
            .map(|(key, value)| format!("{}: {}", key, self.bind(value)))
            .collect();
        format!(" {{{}}}", pairs.join(", "))
    }

    fn node_body(&mut self, node: &NodePattern) -> String {
        let label = node.label.map(|l| format!(":{}", l)).unwrap_or_default();
        let props = self.properties(&node.properties);
        format!("{}{}{}", node.var, label, props)
    }

    fn node(&mut self, node: &NodePattern) {
        let keyword = match node.op {
            NodeOp::Create => "CREATE",
            NodeOp::Merge => "MERGE",
            NodeOp::Match => "MATCH",
        };
        let body = self.node_body(node);
        self.clauses.push(format!("{} ({})", keyword, body));
    }

    /// Spell out a node's label and properties the first time a read mentions it
    fn endpoint(&mut self, pattern: &Pattern, var: VarId, declared: &mut HashSet<VarId>) -> String {
        if !declared.insert(var) {
            return var.to_string();
        }
        match pattern.node(var) {
            Some(node) => self.node_body(node),
            None => var.to_string(),
        }
    }

    fn match_edge(&mut self, pattern: &Pattern, edge: &EdgePattern, declared: &mut HashSet<VarId>) {
        let from = self.endpoint(pattern, edge.from, declared);
        let var = edge.var.map(|v| v.to_string()).unwrap_or_default();
        let props = self.properties(&edge.properties);
        let to = self.endpoint(pattern, edge.to, declared);
        self.clauses.push(format!(
            "MATCH ({})-[{}:{}{}]->({})",
            from, var, edge.relation, props, to
        ));
    }

    fn edge(&mut self, edge: &EdgePattern) {
        let keyword = match edge.op {
            EdgeOp::Create => "CREATE",
            EdgeOp::Match => "MATCH",
        };
        let var = edge.var.map(|v| v.to_string()).unwrap_or_default();
        let props = self.properties(&edge.properties);
        self.clauses.push(format!(
            "{} ({})-[{}:{}{}]->({})",
            keyword, edge.from, var, edge.relation, props, edge.to
        ));
    }

    fn finish(self) -> CypherStatement {
        CypherStatement {
            text: self.clauses.join("\n"),
            params: self.params,
        }
    }
}

/// Render a creation pattern as one write statement.
pub fn render_write(pattern: &Pattern) -> Result<CypherStatement> {
    let mut renderer = Renderer::default();

    for element in pattern.elements() {
        match element {
            PatternElement::Node(node) if node.op == NodeOp::Match => {
                return Err(KnowledgeError::Query(format!(
                    "write pattern cannot match node {}",
                    node.var
                )))
            }
            PatternElement::Edge(edge) if edge.op == EdgeOp::Match => {
                return Err(KnowledgeError::Query(format!(
                    "write pattern cannot match edge {}-[:{}]->{}",
                    edge.from, edge.relation, edge.to
                )))
            }
            PatternElement::Node(node) => renderer.node(node),
            PatternElement::Edge(edge) => renderer.edge(edge),
        }
    }

    Ok(renderer.finish())
}

/// Render a match pattern plus projection as one read statement.
///
/// Nodes are folded into the first edge that touches them, so every `MATCH`
/// is anchored on a labeled, keyed node or on a variable bound earlier.
pub fn render_read(request: &ReadRequest) -> Result<CypherStatement> {
    let pattern = &request.pattern;

    for element in pattern.elements() {
        match element {
            PatternElement::Node(node) if node.op != NodeOp::Match => {
                return Err(KnowledgeError::Query(format!(
                    "read pattern cannot write node {}",
                    node.var
                )))
            }
            PatternElement::Edge(edge) if edge.op != EdgeOp::Match => {
                return Err(KnowledgeError::Query(format!(
                    "read pattern cannot write edge {}-[:{}]->{}",
                    edge.from, edge.relation, edge.to
                )))
            }
            _ => {}
        }
    }

    let linked: HashSet<VarId> = pattern.edges().flat_map(|e| [e.from, e.to]).collect();
    let mut declared = HashSet::new();
    let mut renderer = Renderer::default();

    for element in pattern.elements() {
        match element {
            PatternElement::Node(node) if !linked.contains(&node.var) => {
                declared.insert(node.var);
                renderer.node(node);
            }
            PatternElement::Node(_) => {}
            PatternElement::Edge(edge) => renderer.match_edge(pattern, edge, &mut declared),
        }
    }

    match request.newest_by {
        Some(edge) => {
            renderer
                .clauses
                .push(format!("WITH DISTINCT {}, {}", request.target, edge));
            renderer.clauses.push(format!(
                "RETURN {}.{} AS {}",
                request.target, request.property, ANSWER
            ));
            renderer
                .clauses
                .push(format!("ORDER BY {}.{} DESC", edge, CREATED_AT));
        }
        None => {
            renderer.clauses.push(format!("WITH DISTINCT {}", request.target));
            renderer.clauses.push(format!(
                "RETURN {}.{} AS {}",
                request.target, request.property, ANSWER
            ));
        }
    }

    if let Some(limit) = request.limit {
        renderer.clauses.push(format!("LIMIT {}", limit));
    }

    Ok(renderer.finish())
}
