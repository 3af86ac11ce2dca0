//! # Recall Knowledge Graph (recall-kg)
//!
//! Conversational memory on top of a property graph. Noun phrases coming
//! out of a semantic-role parser are compiled into graph patterns, stored as
//! facts and read back as plain answers.
//!
//! ## Features
//!
//! - Noun-phrase compiler with class/instance modelling and composite names
//! - Nine info-kinds (value, location, time facts, actions) with per-kind attachment
//! - Parameterized Cypher rendering, one transaction per write
//! - Deadlines on every store call and retries on transport faults
//! - In-memory graph store for tests and offline use
//! - Health checks with degraded state detection
//!
//! ## Remembering a location
//!
//! ```no_run
//! use recall_kg::{InfoKind, KnowledgeBase, Neo4jClient, NounPhrase, SpecifierTag, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StoreConfig::from_env()?;
//!     let strict = config.strict_tags;
//!     let client = Neo4jClient::connect(config).await?;
//!     let kb = KnowledgeBase::new(client).with_strict_tags(strict);
//!
//!     // "cheile mele sunt pe masă"
//!     let keys = NounPhrase::new("cheile")
//!         .with_specifier(SpecifierTag::Whose, NounPhrase::new("mele"));
//!     kb.set_value(&keys, NounPhrase::new("masă"), InfoKind::Loc).await?;
//!
//!     // "unde sunt cheile mele?"
//!     println!("{}", kb.get_value(&keys, InfoKind::Loc).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Health checks
//!
//! ```no_run
//! use recall_kg::Neo4jClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Neo4jClient::new(
//!         "bolt://localhost:7687",
//!         "neo4j",
//!         "password",
//!         "neo4j"
//!     ).await?;
//!
//!     let report = client.health_check_with_retry().await;
//!     if report.status.is_operational() {
//!         println!("Database is operational ({}ms)", report.response_time_ms);
//!     }
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod connection;
pub mod error;
pub mod knowledge;
pub mod schema;
pub mod store;

// Re-export main types for convenience
pub use compiler::{compile, CompileContext, CompileMode, Compiled, FactValue, Pattern};
pub use config::{StoreConfig, StoreConfigBuilder};
pub use connection::{HealthReport, HealthStatus, Neo4jClient};
pub use error::{KnowledgeError, Result};
pub use knowledge::{ActionRecord, KnowledgeBase, TimeFact, UNKNOWN};
pub use schema::{AttachStrategy, InfoKind, NodeLabel, NounPhrase, Relation, Specifier, SpecifierTag};
pub use store::{GraphStore, MemoryGraph, ReadRequest};
