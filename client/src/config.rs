use std::time::Duration;

use solana_sdk::commitment_config::CommitmentConfig;

/// Backoff applied to indexer reads only. Submissions are never retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub num_retries: u32,
    pub delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            num_retries: 10,
            delay_ms: 100,
            max_delay_ms: 2_000,
        }
    }
}

/// External service endpoints and submission settings.
///
/// Everything here is supplied by the embedding application; the library
/// hardcodes no endpoints, keys or demo values.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub indexer_url: String,
    pub indexer_api_key: Option<String>,
    pub commitment: CommitmentConfig,
    pub confirm_timeout: Duration,
    pub indexer_retry: RetryConfig,
}

impl ClientConfig {
    pub fn new(rpc_url: String, indexer_url: String) -> Self {
        Self {
            rpc_url,
            indexer_url,
            indexer_api_key: None,
            commitment: CommitmentConfig::confirmed(),
            confirm_timeout: Duration::from_secs(60),
            indexer_retry: RetryConfig::default(),
        }
    }
}
