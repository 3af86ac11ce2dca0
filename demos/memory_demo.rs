//! In-memory conversation demo
//!
//! Replays a short conversation against the in-memory graph store, no
//! database needed.
//!
//! Usage:
//!   cargo run --example memory_demo

use recall_kg::{
    ActionRecord, InfoKind, KnowledgeBase, MemoryGraph, NodeLabel, NounPhrase, SpecifierTag,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let graph = MemoryGraph::new();
    let kb = KnowledgeBase::new(graph.clone());

    let keys = NounPhrase::new("cheile")
        .with_lemma("cheie")
        .with_specifier(SpecifierTag::Whose, NounPhrase::new("mele").with_lemma("eu"));
    let intercom = NounPhrase::new("interfonului").with_lemma("interfon");

    info!("> Cheile mele sunt pe masă.");
    kb.set_value(&keys, NounPhrase::new("masă"), InfoKind::Loc).await?;

    info!("> Codul interfonului este 1234.");
    kb.set_value(&intercom, "1234", InfoKind::Val).await?;

    info!("> Ana a plecat la gară ieri.");
    let ana_left = ActionRecord::new(NounPhrase::new("Ana"), "pleca")
        .at(NounPhrase::new("gară"))
        .when("ieri", InfoKind::TimePoint);
    kb.store_action(&ana_left).await?;

    info!("> Unde sunt cheile mele?");
    info!("< {}", kb.get_value(&keys, InfoKind::Loc).await?);

    info!("> Care este codul interfonului?");
    info!("< {}", kb.get_value(&intercom, InfoKind::Val).await?);

    info!("> Când a plecat Ana?");
    info!("< {}", kb.get_action_time(&ana_left, InfoKind::TimePoint).await?);

    info!("> Când se termină?");
    info!("< {}", kb.get_action_time(&ana_left, InfoKind::TimeEnd).await?);

    info!(
        "Graph holds {} nodes ({} classes, {} instances) and {} edges",
        graph.node_count().await,
        graph.nodes_with_label(NodeLabel::Class).await.len(),
        graph.nodes_with_label(NodeLabel::Instance).await.len(),
        graph.edge_count().await
    );

    Ok(())
}
