//! Neo4j conversation demo
//!
//! Stores a few facts in Neo4j and prints the compiled Cypher along the way.
//!
//! Usage:
//!   cargo run --example neo4j_demo
//!
//! Environment variables (a .env file is read too):
//!   NEO4J_URI, NEO4J_USER, NEO4J_PASSWORD, NEO4J_DATABASE
//!   RECALL_QUERY_TIMEOUT_MS, RECALL_MAX_RETRIES, RECALL_RETRY_DELAY_MS, RECALL_STRICT_TAGS

use recall_kg::compiler::cypher;
use recall_kg::{compile, CompileMode, InfoKind, KnowledgeBase, Neo4jClient, NounPhrase, SpecifierTag, StoreConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,recall_kg=debug".into()))
        .init();

    let config = StoreConfig::from_env()?;
    let strict_tags = config.strict_tags;
    let client = Neo4jClient::connect(config).await?;

    let report = client.health_check_with_retry().await;
    if !report.status.is_operational() {
        warn!("Neo4j is not operational: {:?}", report.error);
        return Ok(());
    }

    let watch = NounPhrase::new("ceasul")
        .with_lemma("ceas")
        .with_specifier(SpecifierTag::Whose, NounPhrase::new("meu").with_lemma("eu"));

    let compiled = compile(&watch, CompileMode::Create)?;
    let statement = cypher::render_write(&compiled.pattern)?;
    info!("Phrase '{}' compiles to:\n{}", compiled.name, statement.text);

    let kb = KnowledgeBase::new(client).with_strict_tags(strict_tags);
    kb.set_value(&watch, NounPhrase::new("noptieră"), InfoKind::Loc).await?;

    info!("Where is my watch? {}", kb.get_value(&watch, InfoKind::Loc).await?);
    info!("Every place it has been: {:?}", kb.get_values(&watch, InfoKind::Loc).await?);

    Ok(())
}
