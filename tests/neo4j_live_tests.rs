//! Tests against a live Neo4j instance
//!
//! Run with: cargo test -- --ignored
//! Connection details come from the NEO4J_* environment variables.

use recall_kg::compiler::{NodeOp, NodePattern, Pattern, VarId};
use recall_kg::{
    ActionRecord, GraphStore, HealthStatus, InfoKind, KnowledgeBase, KnowledgeError, Neo4jClient,
    NodeLabel, NounPhrase, SpecifierTag, StoreConfig, UNKNOWN,
};
use uuid::Uuid;

async fn connect() -> Neo4jClient {
    let config = StoreConfig::from_env().expect("Invalid NEO4J_* configuration");
    Neo4jClient::connect(config)
        .await
        .expect("Failed to connect to Neo4j")
}

// Unique lemma so repeated runs do not see each other's facts
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

#[tokio::test]
#[ignore] // Requires running Neo4j instance
async fn test_health_check() {
    let client = connect().await;

    assert!(client.health_check().await.unwrap());

    let report = client.health_check_with_retry().await;
    assert!(report.status.is_operational());
    assert_ne!(report.status, HealthStatus::Unhealthy);
    assert_eq!(report.attempts, 1);
}

#[tokio::test]
#[ignore]
async fn test_location_round_trip() {
    let kb = KnowledgeBase::new(connect().await);
    let owner = unique("eu");
    let keys = NounPhrase::new("cheile")
        .with_specifier(SpecifierTag::Whose, NounPhrase::new("mele").with_lemma(owner.as_str()));

    assert_eq!(kb.get_value(&keys, InfoKind::Loc).await.unwrap(), UNKNOWN);

    kb.set_value(&keys, NounPhrase::new("masă"), InfoKind::Loc).await.unwrap();
    kb.set_value(&keys, NounPhrase::new("raft"), InfoKind::Loc).await.unwrap();

    assert_eq!(kb.get_value(&keys, InfoKind::Loc).await.unwrap(), "raft");
    assert_eq!(
        kb.get_values(&keys, InfoKind::Loc).await.unwrap(),
        vec!["raft", "masă"]
    );
    assert_eq!(kb.get_value(&keys, InfoKind::Val).await.unwrap(), UNKNOWN);
}

#[tokio::test]
#[ignore]
async fn test_action_time_round_trip() {
    let kb = KnowledgeBase::new(connect().await);
    let subject = NounPhrase::new(unique("Ana"));
    let record = ActionRecord::new(subject, "pleca")
        .with_direct_object(NounPhrase::new("trenul"))
        .when("ieri", InfoKind::TimePoint);

    kb.store_action(&record).await.unwrap();

    assert_eq!(
        kb.get_action_time(&record, InfoKind::TimePoint).await.unwrap(),
        "ieri"
    );
    assert_eq!(
        kb.get_action_time(&record, InfoKind::TimeEnd).await.unwrap(),
        UNKNOWN
    );
}

#[tokio::test]
#[ignore]
async fn test_failed_write_leaves_connection_usable() {
    let config = StoreConfig {
        max_connections: 1,
        ..StoreConfig::from_env().expect("Invalid NEO4J_* configuration")
    };
    let client = Neo4jClient::connect(config)
        .await
        .expect("Failed to connect to Neo4j");

    // the server refuses a statement declaring the same variable twice
    let mut broken = Pattern::new();
    broken.push_node(NodePattern::new(VarId(0), NodeLabel::Literal, NodeOp::Create).with_property("value", "a"));
    broken.push_node(NodePattern::new(VarId(0), NodeLabel::Literal, NodeOp::Create).with_property("value", "b"));

    let err = client.write(&broken).await.unwrap_err();
    assert!(matches!(err, KnowledgeError::Query(_)), "unexpected error: {}", err);

    // the only pooled connection must be free of the failed transaction
    let kb = KnowledgeBase::new(client);
    let code = NounPhrase::new(unique("cod"));
    kb.set_value(&code, "4321", InfoKind::Val).await.unwrap();
    assert_eq!(kb.get_value(&code, InfoKind::Val).await.unwrap(), "4321");
}
