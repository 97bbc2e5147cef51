//! Builders for the state-transition instructions of the compressed-NFT
//! program, plus the token-metadata instructions needed to bootstrap a
//! collection.
//!
//! Account order and payload layout are the external programs' wire
//! contract; discriminators for the anchor-style program are the first 8
//! bytes of sha256 of `"global:<instruction>"`.

use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::hash::Hasher;

mod collection;
mod create_tree;
mod decompress;
mod mint;
mod redeem;
mod transfer;

pub use collection::{
    create_master_edition_v3, create_metadata_account_v3, set_collection_size,
    CreateMasterEditionParams, CreateMetadataAccountParams, SetCollectionSizeParams,
};
pub use create_tree::{allocate_tree_account, create_tree, CreateTreeParams};
pub use decompress::{decompress_v1, DecompressParams};
pub use mint::{mint_to_collection_v1, mint_v1, MintParams, MintToCollectionParams};
pub use redeem::{redeem, RedeemParams};
pub use transfer::{transfer, TransferParams};

/// Proof-bearing payload shared by transfer and redeem: the leaf triple
/// plus the nonce/index pair identifying the leaf.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafArgs {
    pub root: [u8; 32],
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
    pub nonce: u64,
    pub index: u32,
}

pub(crate) fn sighash(name: &str) -> [u8; 8] {
    let mut hasher = Hasher::default();
    hasher.hash(format!("global:{name}").as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hasher.result().as_ref()[..8]);
    discriminator
}

pub(crate) fn anchor_data<T: BorshSerialize>(name: &str, args: &T) -> Result<Vec<u8>, io::Error> {
    let mut data = sighash(name).to_vec();
    args.serialize(&mut data)?;
    Ok(data)
}
