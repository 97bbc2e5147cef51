use solana_sdk::{program_error::ProgramError, pubkey::Pubkey};
use thiserror::Error;

use crate::{indexer::IndexerError, rpc::RpcError, state::LeafState};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("indexer error: {0}")]
    Indexer(#[from] IndexerError),

    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    #[error("serialization error: {0}")]
    Serialization(#[from] std::io::Error),

    #[error("program error: {0}")]
    Program(#[from] ProgramError),

    #[error("asset {asset_id} not found by the indexer")]
    AssetNotFound { asset_id: Pubkey },

    /// The operation requires the leaf in a different lifecycle state.
    /// Raised before submission, from the indexer record and the voucher
    /// account.
    #[error("asset {asset_id} is {actual}, operation requires {expected}")]
    InvalidLeafState {
        asset_id: Pubkey,
        expected: LeafState,
        actual: LeafState,
    },

    #[error("{authority} is neither owner nor delegate of asset {asset_id}")]
    NotLeafAuthority { asset_id: Pubkey, authority: Pubkey },

    #[error("tree {tree} has no config account")]
    TreeNotFound { tree: Pubkey },
}
