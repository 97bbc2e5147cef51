//! Client-side views of the on-chain accounts this protocol reads.
//!
//! The tree itself is never held locally; these types only decode enough
//! of the external programs' account layouts to size allocations, derive
//! nonces and discover the canopy depth.

use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

/// Serialized size of the concurrent-Merkle-tree account header
/// (account type + version tag + v1 header data).
pub const TREE_HEADER_SIZE_V1: usize = 2 + 54;

/// Tree config account held behind the tree-authority PDA.
///
/// Anchor account: callers skip the 8-byte discriminator before
/// deserializing. `num_minted` is the authoritative nonce counter and is
/// read from chain, never from the indexer.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    pub tree_creator: Pubkey,
    pub tree_delegate: Pubkey,
    pub total_mint_capacity: u64,
    pub num_minted: u64,
    pub is_public: bool,
}

/// The fixed shape of a concurrent Merkle tree, set at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSpec {
    pub max_depth: u32,
    pub max_buffer_size: u32,
    pub canopy_depth: u32,
}

#[derive(BorshSerialize, BorshDeserialize, Debug)]
struct TreeHeaderV1 {
    account_type: u8,
    version: u8,
    max_buffer_size: u32,
    max_depth: u32,
    authority: [u8; 32],
    creation_slot: u64,
    padding: [u8; 6],
}

/// Size of the tree body: sequence number, active index and buffer size,
/// followed by `max_buffer_size` changelogs and the rightmost path, each
/// `40 + 32 * max_depth` bytes.
fn tree_body_size(max_depth: u32, max_buffer_size: u32) -> usize {
    let node_path = 40 + 32 * max_depth as usize;
    24 + (max_buffer_size as usize + 1) * node_path
}

/// Bytes occupied by a canopy caching the top `canopy_depth` levels.
fn canopy_size(canopy_depth: u32) -> usize {
    if canopy_depth == 0 {
        0
    } else {
        ((1usize << (canopy_depth + 1)) - 2) * 32
    }
}

/// Exact account size the compression program expects for a tree of the
/// given shape. Allocating any other size fails tree creation.
pub fn tree_account_size(max_depth: u32, max_buffer_size: u32, canopy_depth: u32) -> usize {
    TREE_HEADER_SIZE_V1 + tree_body_size(max_depth, max_buffer_size) + canopy_size(canopy_depth)
}

impl TreeSpec {
    /// Recovers the tree shape from the raw tree account.
    ///
    /// Depth and buffer size come from the header; the canopy depth is not
    /// stored and is recovered from the account length, which must land
    /// exactly on a valid canopy size.
    pub fn from_account_data(data: &[u8]) -> Result<Self, io::Error> {
        let header = TreeHeaderV1::deserialize(&mut data.get(..TREE_HEADER_SIZE_V1).ok_or_else(
            || io::Error::new(io::ErrorKind::InvalidData, "tree account shorter than header"),
        )?)?;

        let body = tree_body_size(header.max_depth, header.max_buffer_size);
        let canopy_bytes = data
            .len()
            .checked_sub(TREE_HEADER_SIZE_V1 + body)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "tree account shorter than body")
            })?;

        let mut canopy_depth = 0;
        while canopy_size(canopy_depth) < canopy_bytes {
            canopy_depth += 1;
        }
        if canopy_size(canopy_depth) != canopy_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("tree account has {canopy_bytes} trailing bytes, not a canopy size"),
            ));
        }

        Ok(Self {
            max_depth: header.max_depth,
            max_buffer_size: header.max_buffer_size,
            canopy_depth,
        })
    }
}

/// Lifecycle state of a leaf, reconstructed from the indexer record and
/// the voucher account.
///
/// `Active --transfer--> Active`, `Active --redeem--> Redeemed`,
/// `Redeemed --decompress--> Decompressed`; there is no transition out of
/// `Decompressed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafState {
    /// Leaf lives in the tree.
    Active,
    /// Leaf was removed by redeem; a voucher account exists.
    Redeemed,
    /// Voucher was consumed; the asset is a standard token now.
    Decompressed,
}

impl std::fmt::Display for LeafState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeafState::Active => "active",
            LeafState::Redeemed => "redeemed",
            LeafState::Decompressed => "decompressed",
        };
        write!(f, "{s}")
    }
}
