//! Failure behaviour of the bolt-backed store
//!
//! None of these need a running Neo4j instance.

use recall_kg::{
    HealthStatus, InfoKind, KnowledgeBase, KnowledgeError, Neo4jClient, NounPhrase, StoreConfig,
};
use std::time::Duration;

fn unreachable_config() -> StoreConfig {
    StoreConfig::builder()
        .uri("bolt://localhost:9999")
        .query_timeout(Duration::from_millis(500))
        .max_retries(1)
        .retry_delay(Duration::from_millis(10))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_wrong_scheme_rejected() {
    let result = Neo4jClient::new("http://localhost:7687", "neo4j", "password", "neo4j").await;

    match result {
        Err(KnowledgeError::Config(message)) => assert!(message.contains("http://")),
        Err(other) => panic!("expected a config error, got {}", other),
        Ok(_) => panic!("connection with wrong scheme should fail"),
    }
}

#[tokio::test]
async fn test_unreachable_store_reports_error() {
    // neo4rs may connect lazily, so the failure can surface on first use
    let client = match Neo4jClient::connect(unreachable_config()).await {
        Ok(client) => client,
        Err(error) => {
            assert!(error.is_retryable(), "unexpected error: {}", error);
            return;
        }
    };

    let report = client.health_check_with_retry().await;
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert!(report.error.is_some());

    let kb = KnowledgeBase::new(client);
    let keys = NounPhrase::new("cheile");

    let err = kb.set_value(&keys, "x", InfoKind::Val).await.unwrap_err();
    assert!(err.is_retryable(), "unexpected error: {}", err);

    let err = kb.get_value(&keys, InfoKind::Val).await.unwrap_err();
    assert!(err.is_retryable(), "unexpected error: {}", err);
}
