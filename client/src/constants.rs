//! Program ids and derivation seeds for the external programs this client
//! builds instructions against. The seeds are part of the cross-program
//! address-derivation contract and must match the on-chain programs byte
//! for byte.

/// Metaplex Bubblegum, the compressed-NFT program.
pub mod bubblegum {
    solana_sdk::declare_id!("BGUMAp9Gq7iTEuizy4pqaxsTyUCBK68MDfK752saRPUY");
}

/// SPL account compression, owner of the concurrent Merkle tree accounts.
pub mod compression {
    solana_sdk::declare_id!("cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK");
}

/// SPL no-op program, used as the changelog wrapper.
pub mod noop {
    solana_sdk::declare_id!("noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV");
}

/// Metaplex token metadata program.
pub mod token_metadata {
    solana_sdk::declare_id!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");
}

pub const ASSET_PREFIX: &[u8] = b"asset";
pub const VOUCHER_PREFIX: &[u8] = b"voucher";
pub const METADATA_PREFIX: &[u8] = b"metadata";
pub const EDITION_PREFIX: &[u8] = b"edition";
pub const COLLECTION_CPI_PREFIX: &[u8] = b"collection_cpi";
