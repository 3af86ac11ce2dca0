//! Neo4j connection management
//!
//! [`Neo4jClient`] owns the bolt connection pool and wraps every server call
//! in a deadline. Transport faults are retried with jittered backoff; other
//! failures surface immediately. Health checks let callers probe
//! reachability before driving the knowledge facade.

use crate::config::StoreConfig;
use crate::error::{KnowledgeError, Result};
use chrono::{DateTime, Utc};
use neo4rs::{query, ConfigBuilder, Graph};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Store is reachable and responsive
    Healthy,
    /// Store is reachable but slower than the degraded threshold
    Degraded,
    /// Store is unreachable or erroring
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy or degraded (operational)
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

/// Outcome of a health probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Response time of the last attempt in milliseconds
    pub response_time_ms: u64,
    /// Attempts made, including the first
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
    /// Error message of the last attempt (if unhealthy)
    pub error: Option<String>,
}

impl HealthReport {
    fn new(status: HealthStatus, response_time_ms: u64, attempts: u32, error: Option<String>) -> Self {
        Self {
            status,
            response_time_ms,
            attempts,
            timestamp: Utc::now(),
            error,
        }
    }
}

/// Neo4j client with connection pooling, deadlines and retries
pub struct Neo4jClient {
    graph: Graph,
    config: StoreConfig,
}

impl Neo4jClient {
    /// Connect with default timeouts and retries
    ///
    /// # Example
    /// ```no_run
    /// use recall_kg::Neo4jClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = Neo4jClient::new(
    ///         "bolt://localhost:7687",
    ///         "neo4j",
    ///         "password",
    ///         "neo4j"
    ///     ).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(uri: &str, user: &str, password: &str, database: &str) -> Result<Self> {
        let config = StoreConfig::builder()
            .uri(uri)
            .credentials(user, password)
            .database(database)
            .build()?;
        Self::connect(config).await
    }

    /// Connect using a full configuration
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "Connecting to Neo4j at {} (database: {})",
            config.uri, config.database
        );

        let driver_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .fetch_size(config.fetch_size)
            .max_connections(config.max_connections)
            .build()
            .map_err(|e| KnowledgeError::Config(e.to_string()))?;

        let graph = match tokio::time::timeout(config.query_timeout, Graph::connect(driver_config)).await {
            Ok(Ok(graph)) => graph,
            Ok(Err(e)) => return Err(KnowledgeError::StoreUnreachable(e.to_string())),
            Err(_) => {
                return Err(KnowledgeError::Timeout {
                    timeout_ms: config.query_timeout.as_millis() as u64,
                    context: "connect".to_string(),
                })
            }
        };

        info!("Successfully connected to Neo4j");
        Ok(Self { graph, config })
    }

    /// Simple health check using RETURN 1
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Executing health check (RETURN 1)");
        self.deadline("health check", self.graph.run(query("RETURN 1")))
            .await?;
        Ok(true)
    }

    /// Health check with the configured retry policy.
    ///
    /// Never fails: errors are reported as [`HealthStatus::Unhealthy`].
    pub async fn health_check_with_retry(&self) -> HealthReport {
        let mut attempts = 0;

        loop {
            attempts += 1;
            let start = Instant::now();
            let outcome = self.health_check().await;
            let elapsed = start.elapsed();
            let elapsed_ms = elapsed.as_millis() as u64;

            match outcome {
                Ok(_) => {
                    let status = if elapsed > self.config.degraded_threshold {
                        HealthStatus::Degraded
                    } else {
                        HealthStatus::Healthy
                    };
                    return HealthReport::new(status, elapsed_ms, attempts, None);
                }
                Err(e) if e.is_retryable() && attempts <= self.config.max_retries => {
                    let delay = self.config.retry_delay_for(attempts);
                    warn!(
                        "Health check failed (attempt {}/{}), retrying after {:?}: {}",
                        attempts,
                        self.config.max_retries + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!("Health check failed: {}", e);
                    return HealthReport::new(
                        HealthStatus::Unhealthy,
                        elapsed_ms,
                        attempts,
                        Some(e.to_string()),
                    );
                }
            }
        }
    }

    /// Run `fut` under the configured query timeout
    pub(crate) async fn deadline<T, Fut>(&self, context: &str, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = std::result::Result<T, neo4rs::Error>>,
    {
        match tokio::time::timeout(self.config.query_timeout, fut).await {
            Ok(outcome) => outcome.map_err(|e| KnowledgeError::from_driver(context, e)),
            Err(_) => Err(KnowledgeError::Timeout {
                timeout_ms: self.config.query_timeout.as_millis() as u64,
                context: context.to_string(),
            }),
        }
    }

    /// Run `op` until it succeeds, fails fatally, or retries run out
    pub(crate) async fn with_retry<T, F, Fut>(&self, context: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying after {:?}: {}",
                        context,
                        attempt,
                        self.config.max_retries + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!("{} failed: {}", context, e);
                    return Err(e);
                }
            }
        }
    }

    /// Get a reference to the underlying neo4rs Graph instance
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}
