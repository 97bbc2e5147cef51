//! HTTP implementation of the [`Indexer`] trait against a DAS-style
//! JSON-RPC endpoint.

use std::{fmt::Debug, time::Duration};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::{error, warn};

use super::{
    Asset, AssetPage, AssetProof, GetAssetsByOwnerOptions, Indexer, IndexerError,
};
use crate::config::RetryConfig;

#[derive(Serialize, Debug)]
struct RpcRequest<T> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'static str,
    params: T,
}

impl<T> RpcRequest<T> {
    fn new(method: &'static str, params: T) -> Self {
        Self {
            jsonrpc: "2.0",
            id: "bubblegum-client",
            method,
            params,
        }
    }
}

#[derive(Deserialize, Debug)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Serialize, Debug)]
struct GetAssetParams {
    id: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AssetSorting {
    sort_by: super::AssetSortBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_direction: Option<super::AssetSortDirection>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GetAssetsByOwnerParams {
    owner_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_by: Option<AssetSorting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<String>,
}

/// Indexer client over a DAS-compatible JSON-RPC endpoint.
///
/// Read calls are retried with exponential backoff on transport failures
/// only; a decoded response is never retried, so staleness decisions stay
/// with the caller.
pub struct DasIndexer {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl Debug for DasIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DasIndexer")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DasIndexer {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn retry<F, Fut, T>(&self, mut operation: F) -> Result<T, IndexerError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, IndexerError>>,
    {
        let mut attempts = 0;
        let mut delay_ms = self.retry.delay_ms;

        loop {
            attempts += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let retryable = matches!(e, IndexerError::Transport(_));
                    if retryable && attempts < self.retry.num_retries {
                        warn!(
                            "indexer call failed (attempt {attempts}/{}), retrying in {delay_ms}ms: {e}",
                            self.retry.num_retries
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = std::cmp::min(delay_ms * 2, self.retry.max_delay_ms);
                    } else {
                        if retryable {
                            error!("indexer call failed after {attempts} attempts: {e}");
                        }
                        return Err(e);
                    }
                }
            }
        }
    }

    async fn post<P, T>(&self, method: &'static str, params: P) -> Result<RpcResponse<T>, IndexerError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(&self.base_url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api-key", key.as_str())]);
        }
        let response = request
            .json(&RpcRequest::new(method, params))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<RpcResponse<T>>().await?)
    }
}

fn is_not_found(error: &RpcErrorObject) -> bool {
    error.message.to_ascii_lowercase().contains("not found")
}

#[async_trait::async_trait]
impl Indexer for DasIndexer {
    async fn get_asset(&self, asset_id: &Pubkey) -> Result<Option<Asset>, IndexerError> {
        self.retry(|| async {
            let response: RpcResponse<Asset> = self
                .post(
                    "getAsset",
                    GetAssetParams {
                        id: asset_id.to_string(),
                    },
                )
                .await?;
            match response.error {
                Some(error) if is_not_found(&error) => Ok(None),
                Some(error) => Err(IndexerError::Rpc {
                    code: error.code,
                    message: error.message,
                }),
                None => Ok(response.result),
            }
        })
        .await
    }

    async fn get_asset_proof(&self, asset_id: &Pubkey) -> Result<AssetProof, IndexerError> {
        self.retry(|| async {
            let response: RpcResponse<AssetProof> = self
                .post(
                    "getAssetProof",
                    GetAssetParams {
                        id: asset_id.to_string(),
                    },
                )
                .await?;
            if let Some(error) = response.error {
                return Err(IndexerError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            let proof = response.result.ok_or(IndexerError::MissingResult {
                context: "getAssetProof",
            })?;
            if proof.proof.is_empty() {
                return Err(IndexerError::EmptyProof {
                    asset_id: *asset_id,
                });
            }
            Ok(proof)
        })
        .await
    }

    async fn get_assets_by_owner(
        &self,
        owner: &Pubkey,
        options: GetAssetsByOwnerOptions,
    ) -> Result<AssetPage, IndexerError> {
        self.retry(|| async {
            let params = GetAssetsByOwnerParams {
                owner_address: owner.to_string(),
                sort_by: options.sort_by.map(|sort_by| AssetSorting {
                    sort_by,
                    sort_direction: options.sort_direction,
                }),
                limit: options.limit,
                page: options.page,
                before: options.before.clone(),
                after: options.after.clone(),
            };
            let response: RpcResponse<AssetPage> =
                self.post("getAssetsByOwner", params).await?;
            if let Some(error) = response.error {
                return Err(IndexerError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            response.result.ok_or(IndexerError::MissingResult {
                context: "getAssetsByOwner",
            })
        })
        .await
    }
}
