//! Read access to the external indexer that mirrors compressed asset
//! state and Merkle proofs.
//!
//! The indexer may lag the chain. Callers must re-fetch both the asset and
//! its proof immediately before constructing a mutating instruction; a
//! proof fetched before an intervening tree mutation produces a root the
//! program rejects. Proofs are never cached across operations.

use std::fmt::Debug;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

pub mod das;
mod types;

pub use das::DasIndexer;
pub use types::{
    Asset, AssetCompression, AssetContent, AssetCreator, AssetGrouping, AssetOwnership, AssetPage,
    AssetProof, AssetRoyalty, AssetSortBy, AssetSortDirection, AssetSupply, AssetUses,
    ContentMetadata, GetAssetsByOwnerOptions,
};

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("indexer transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("indexer rpc error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("failed to decode indexer response: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("indexer field {field} is not valid base58: `{value}`")]
    Base58 {
        field: &'static str,
        value: String,
    },

    /// The indexer has no proof for an asset expected to exist, either
    /// because it has not caught up or because the asset was never minted.
    #[error("indexer returned an empty proof for asset {asset_id}")]
    EmptyProof { asset_id: Pubkey },

    #[error("indexer returned no result for {context}")]
    MissingResult { context: &'static str },

    #[error("malformed indexer response: {0}")]
    Malformed(String),
}

/// Indexer RPC interface consumed by the lifecycle client.
///
/// `get_asset` returns `Ok(None)` on not-found; operations that need the
/// asset treat that as fatal. `get_asset_proof` distinguishes an empty
/// proof sequence (`IndexerError::EmptyProof`) from transport failures so
/// callers never build an instruction from a proof that proves nothing.
#[async_trait]
pub trait Indexer: Send + Sync + Debug + 'static {
    async fn get_asset(&self, asset_id: &Pubkey) -> Result<Option<Asset>, IndexerError>;

    async fn get_asset_proof(&self, asset_id: &Pubkey) -> Result<AssetProof, IndexerError>;

    async fn get_assets_by_owner(
        &self,
        owner: &Pubkey,
        options: GetAssetsByOwnerOptions,
    ) -> Result<AssetPage, IndexerError>;
}
