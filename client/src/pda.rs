//! Deterministic address derivation for the compressed-NFT protocol.
//!
//! Pure functions, no I/O. Every derivation here mirrors a PDA the
//! external programs derive on-chain; a deviation produces an address the
//! program rejects as a constraint violation.

use solana_sdk::pubkey::Pubkey;

use crate::constants::{
    bubblegum, token_metadata, ASSET_PREFIX, COLLECTION_CPI_PREFIX, EDITION_PREFIX,
    METADATA_PREFIX, VOUCHER_PREFIX,
};

/// Identity of the compressed asset at `leaf_index` of `tree`.
pub fn asset_id(tree: &Pubkey, leaf_index: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[ASSET_PREFIX, tree.as_ref(), &leaf_index.to_le_bytes()],
        &bubblegum::id(),
    )
    .0
}

/// Authority PDA holding the tree config account.
pub fn tree_authority(tree: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[tree.as_ref()], &bubblegum::id()).0
}

/// Voucher account created by redeem and consumed by decompress.
pub fn voucher(tree: &Pubkey, leaf_index: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[VOUCHER_PREFIX, tree.as_ref(), &leaf_index.to_le_bytes()],
        &bubblegum::id(),
    )
    .0
}

/// Token-metadata account for `mint`.
pub fn metadata_account(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[METADATA_PREFIX, token_metadata::id().as_ref(), mint.as_ref()],
        &token_metadata::id(),
    )
    .0
}

/// Master-edition account for `mint`.
pub fn master_edition_account(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            METADATA_PREFIX,
            token_metadata::id().as_ref(),
            mint.as_ref(),
            EDITION_PREFIX,
        ],
        &token_metadata::id(),
    )
    .0
}

/// Signer PDA the compressed-NFT program uses when CPI-ing into the
/// token-metadata program for collection operations.
pub fn collection_cpi_signer() -> Pubkey {
    Pubkey::find_program_address(&[COLLECTION_CPI_PREFIX], &bubblegum::id()).0
}

/// Mint authority of the standard-token mint created by decompress.
/// The mint address is the asset id itself.
pub fn mint_authority(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[mint.as_ref()], &bubblegum::id()).0
}
