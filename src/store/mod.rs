//! Graph stores that execute compiled patterns
//!
//! A store only needs two primitives: apply a creation pattern atomically,
//! and evaluate a match pattern into answer strings. [`MemoryGraph`] keeps
//! the graph in process; [`Neo4jClient`](crate::Neo4jClient) talks bolt.

pub mod memory;
pub mod neo4j;

pub use memory::{MemoryEdge, MemoryGraph, MemoryNode};

use crate::compiler::{Pattern, VarId};
use crate::error::Result;
use async_trait::async_trait;

/// A match pattern and what to return from each binding
#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub pattern: Pattern,
    /// Node whose property is the answer
    pub target: VarId,
    pub property: &'static str,
    /// Fact edge to sort by, newest first
    pub newest_by: Option<VarId>,
    pub limit: Option<usize>,
}

/// Backend able to create and match graph patterns
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Apply a creation pattern. Either every element is written or none is.
    async fn write(&self, pattern: &Pattern) -> Result<()>;

    /// Evaluate a match pattern. Zero matches is an empty vector, not an error.
    async fn read(&self, request: &ReadRequest) -> Result<Vec<String>>;
}

#[async_trait]
impl<S: GraphStore + ?Sized> GraphStore for std::sync::Arc<S> {
    async fn write(&self, pattern: &Pattern) -> Result<()> {
        (**self).write(pattern).await
    }

    async fn read(&self, request: &ReadRequest) -> Result<Vec<String>> {
        (**self).read(request).await
    }
}
