//! Store connection and behaviour configuration
//!
//! Values come from code (builder), or from the environment via
//! [`StoreConfig::from_env`], which also loads a `.env` file if present.
//!
//! | Variable | Default |
//! |---|---|
//! | `NEO4J_URI` | `bolt://localhost:7687` |
//! | `NEO4J_USER` | `neo4j` |
//! | `NEO4J_PASSWORD` | `password` |
//! | `NEO4J_DATABASE` | `neo4j` |
//! | `RECALL_QUERY_TIMEOUT_MS` | `5000` |
//! | `RECALL_MAX_RETRIES` | `2` |
//! | `RECALL_RETRY_DELAY_MS` | `200` |
//! | `RECALL_STRICT_TAGS` | `false` |

use crate::error::{KnowledgeError, Result};
use std::time::Duration;

const SCHEMES: [&str; 6] = ["bolt", "bolt+s", "bolt+ssc", "neo4j", "neo4j+s", "neo4j+ssc"];

/// Configuration for the graph store and the knowledge facade
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Bolt URI (e.g., "bolt://localhost:7687")
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Connection pool size
    pub max_connections: usize,
    /// Rows fetched per round trip
    pub fetch_size: usize,
    /// Deadline for each store call
    pub query_timeout: Duration,
    /// Retries after a transport failure; 0 disables retrying
    pub max_retries: u32,
    /// Base delay between retries
    pub retry_delay: Duration,
    /// Random variation of the retry delay (0.0 - 1.0)
    pub retry_jitter: f64,
    /// Health checks slower than this report `Degraded`
    pub degraded_threshold: Duration,
    /// Fail on unrecognized specifier tags instead of dropping them
    pub strict_tags: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
            database: "neo4j".to_string(),
            max_connections: 16,
            fetch_size: 500,
            query_timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_delay: Duration::from_millis(200),
            retry_jitter: 0.25,
            degraded_threshold: Duration::from_millis(1000),
            strict_tags: false,
        }
    }
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Load from the process environment, after reading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(uri) = lookup("NEO4J_URI") {
            config.uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USER") {
            config.user = user;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            config.password = password;
        }
        if let Some(database) = lookup("NEO4J_DATABASE") {
            config.database = database;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "RECALL_QUERY_TIMEOUT_MS")? {
            config.query_timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_var::<u32>(&lookup, "RECALL_MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "RECALL_RETRY_DELAY_MS")? {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(strict) = parse_var::<bool>(&lookup, "RECALL_STRICT_TAGS")? {
            config.strict_tags = strict;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let scheme = self.uri.split("://").next().unwrap_or_default();
        if !self.uri.contains("://") || !SCHEMES.contains(&scheme) {
            return Err(KnowledgeError::Config(format!(
                "uri '{}' is not a bolt or neo4j uri",
                self.uri
            )));
        }
        if self.max_connections == 0 {
            return Err(KnowledgeError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        if self.query_timeout.is_zero() {
            return Err(KnowledgeError::Config(
                "query_timeout must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry_jitter) {
            return Err(KnowledgeError::Config(
                "retry_jitter must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (1-based), with jitter applied
    pub fn retry_delay_for(&self, attempt: u32) -> Duration {
        let scaled = self
            .retry_delay
            .checked_mul(attempt.max(1))
            .unwrap_or(Duration::MAX);
        if self.retry_jitter == 0.0 {
            return scaled;
        }

        let base = scaled.as_secs_f64();
        let spread = base * self.retry_jitter;
        let jitter = (rand::random::<f64>() * 2.0 - 1.0) * spread;
        Duration::try_from_secs_f64((base + jitter).max(0.0)).unwrap_or(Duration::MAX)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| KnowledgeError::Config(format!("{} has invalid value '{}'", key, raw))),
    }
}

/// Builder for [`StoreConfig`]
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    uri: Option<String>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    max_connections: Option<usize>,
    query_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    retry_jitter: Option<f64>,
    degraded_threshold: Option<Duration>,
    strict_tags: Option<bool>,
}

impl StoreConfigBuilder {
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set user and password together
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn retry_jitter(mut self, jitter: f64) -> Self {
        self.retry_jitter = Some(jitter);
        self
    }

    pub fn degraded_threshold(mut self, threshold: Duration) -> Self {
        self.degraded_threshold = Some(threshold);
        self
    }

    pub fn strict_tags(mut self, strict: bool) -> Self {
        self.strict_tags = Some(strict);
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<StoreConfig> {
        let defaults = StoreConfig::default();

        let config = StoreConfig {
            uri: self.uri.unwrap_or(defaults.uri),
            user: self.user.unwrap_or(defaults.user),
            password: self.password.unwrap_or(defaults.password),
            database: self.database.unwrap_or(defaults.database),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
            fetch_size: defaults.fetch_size,
            query_timeout: self.query_timeout.unwrap_or(defaults.query_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_delay: self.retry_delay.unwrap_or(defaults.retry_delay),
            retry_jitter: self.retry_jitter.unwrap_or(defaults.retry_jitter),
            degraded_threshold: self
                .degraded_threshold
                .unwrap_or(defaults.degraded_threshold),
            strict_tags: self.strict_tags.unwrap_or(defaults.strict_tags),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.query_timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 2);
        assert!(!config.strict_tags);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();
        config.uri = "localhost:7687".to_string();
        assert!(config.validate().is_err());
        config.uri = "http://localhost:7687".to_string();
        assert!(config.validate().is_err());
        config.uri = "neo4j+s://graph.example:7687".to_string();
        assert!(config.validate().is_ok());

        let mut config = StoreConfig::default();
        config.query_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = StoreConfig::default();
        config.retry_jitter = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::builder()
            .uri("bolt://graph:7687")
            .credentials("bot", "secret")
            .query_timeout(Duration::from_millis(750))
            .max_retries(0)
            .strict_tags(true)
            .build()
            .unwrap();

        assert_eq!(config.uri, "bolt://graph:7687");
        assert_eq!(config.user, "bot");
        assert_eq!(config.password, "secret");
        assert_eq!(config.database, "neo4j");
        assert_eq!(config.query_timeout, Duration::from_millis(750));
        assert_eq!(config.max_retries, 0);
        assert!(config.strict_tags);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("NEO4J_URI", "bolt://db:7687"),
            ("RECALL_QUERY_TIMEOUT_MS", "1500"),
            ("RECALL_STRICT_TAGS", "true"),
        ]
        .into_iter()
        .collect();

        let config = StoreConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.uri, "bolt://db:7687");
        assert_eq!(config.query_timeout, Duration::from_millis(1500));
        assert!(config.strict_tags);
        assert_eq!(config.user, "neo4j");
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = StoreConfig::from_lookup(|k| {
            (k == "RECALL_MAX_RETRIES").then(|| "many".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("RECALL_MAX_RETRIES"));
    }

    #[test]
    fn test_retry_delay_with_jitter() {
        let config = StoreConfig {
            retry_delay: Duration::from_millis(100),
            retry_jitter: 0.2,
            ..Default::default()
        };

        for attempt in 1..=3 {
            let delay = config.retry_delay_for(attempt).as_secs_f64();
            let base = 0.1 * f64::from(attempt);
            assert!(delay >= base * 0.8 - 1e-9);
            assert!(delay <= base * 1.2 + 1e-9);
        }

        let fixed = StoreConfig {
            retry_jitter: 0.0,
            ..config
        };
        assert_eq!(fixed.retry_delay_for(2), Duration::from_millis(200));
    }

    #[test]
    fn test_retry_delay_saturates() {
        let config = StoreConfig::from_lookup(|k| {
            (k == "RECALL_RETRY_DELAY_MS").then(|| u64::MAX.to_string())
        })
        .unwrap();

        assert!(config.retry_delay_for(3) >= config.retry_delay);

        let fixed = StoreConfig {
            retry_jitter: 0.0,
            ..config
        };
        assert_eq!(fixed.retry_delay_for(3), Duration::MAX);
    }
}
