//! Health Check Demo Application
//!
//! Usage:
//!   cargo run --example health_check_demo
//!
//! Environment variables:
//!   NEO4J_URI      - Neo4j connection URI (default: bolt://localhost:7687)
//!   NEO4J_USER     - Neo4j username (default: neo4j)
//!   NEO4J_PASSWORD - Neo4j password (default: password)
//!   NEO4J_DATABASE - Neo4j database name (default: neo4j)

use recall_kg::{Neo4jClient, StoreConfig};
use std::time::Duration;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("=== Neo4j Health Check Demo ===");

    let config = StoreConfig::from_env()?;
    let client = Neo4jClient::connect(config.clone()).await?;

    info!("--- Simple Health Check (RETURN 1) ---");
    match client.health_check().await {
        Ok(healthy) => info!("✓ Simple health check passed: {}", healthy),
        Err(e) => info!("✗ Simple health check failed: {}", e),
    }

    info!("--- Health Check with Retry ---");
    let report = client.health_check_with_retry().await;
    info!("Status: {:?}", report.status);
    info!("Response time: {}ms", report.response_time_ms);
    info!("Attempts: {}", report.attempts);
    if let Some(error) = &report.error {
        info!("Error: {}", error);
    }

    info!("--- Strict Degraded Threshold (1ms) ---");
    let strict = StoreConfig {
        degraded_threshold: Duration::from_millis(1),
        ..config
    };
    let strict_client = Neo4jClient::connect(strict).await?;
    let report = strict_client.health_check_with_retry().await;
    info!(
        "Status: {:?} (operational: {})",
        report.status,
        report.status.is_operational()
    );

    Ok(())
}
