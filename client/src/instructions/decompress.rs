use std::io;

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};

use super::anchor_data;
use crate::{
    constants::{bubblegum, noop, token_metadata},
    pda,
    types::MetadataArgs,
};

/// Inputs for decompressing a redeemed leaf into a standard token.
///
/// Operates on the voucher, not the tree, so no proof is needed. The mint
/// address is the asset id; the metadata must match what was committed
/// into the leaf or the program rejects the voucher.
#[derive(Debug, Clone)]
pub struct DecompressParams {
    pub tree: Pubkey,
    /// Leaf index of the redeemed leaf; locates the voucher.
    pub nonce: u64,
    pub leaf_owner: Pubkey,
    /// The standard-token mint to create, equal to the asset id.
    pub mint: Pubkey,
    pub metadata: MetadataArgs,
}

#[derive(BorshSerialize)]
struct DecompressV1Args {
    metadata: MetadataArgs,
}

pub fn decompress_v1(params: DecompressParams) -> Result<Instruction, io::Error> {
    let voucher = pda::voucher(&params.tree, params.nonce);
    let token_account = spl_associated_token_account::get_associated_token_address(
        &params.leaf_owner,
        &params.mint,
    );
    let mint_authority = pda::mint_authority(&params.mint);
    let metadata_account = pda::metadata_account(&params.mint);
    let master_edition = pda::master_edition_account(&params.mint);

    let data = anchor_data(
        "decompress_v1",
        &DecompressV1Args {
            metadata: params.metadata,
        },
    )?;

    let accounts = vec![
        AccountMeta::new(voucher, false),
        AccountMeta::new(params.leaf_owner, true),
        AccountMeta::new(token_account, false),
        AccountMeta::new(params.mint, false),
        AccountMeta::new(mint_authority, false),
        AccountMeta::new(metadata_account, false),
        AccountMeta::new(master_edition, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
        AccountMeta::new_readonly(token_metadata::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        AccountMeta::new_readonly(noop::id(), false),
    ];

    Ok(Instruction {
        program_id: bubblegum::id(),
        accounts,
        data,
    })
}
