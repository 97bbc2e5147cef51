use std::io;

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use super::anchor_data;
use crate::{
    constants::{bubblegum, compression, noop, token_metadata},
    pda,
    types::{Collection, MetadataArgs},
};

/// Inputs for appending a new leaf to a tree.
///
/// Only the tree creator or its delegate may mint unless the tree was
/// created public; the program enforces this against `tree_delegate`.
#[derive(Debug, Clone)]
pub struct MintParams {
    pub tree: Pubkey,
    pub payer: Pubkey,
    pub tree_delegate: Pubkey,
    pub leaf_owner: Pubkey,
    pub leaf_delegate: Pubkey,
    pub metadata: MetadataArgs,
}

#[derive(BorshSerialize)]
struct MintV1Args {
    message: MetadataArgs,
}

pub fn mint_v1(params: MintParams) -> Result<Instruction, io::Error> {
    let tree_authority = pda::tree_authority(&params.tree);
    let data = anchor_data(
        "mint_v1",
        &MintV1Args {
            message: params.metadata,
        },
    )?;

    let accounts = vec![
        AccountMeta::new(tree_authority, false),
        AccountMeta::new_readonly(params.leaf_owner, false),
        AccountMeta::new_readonly(params.leaf_delegate, false),
        AccountMeta::new(params.tree, false),
        AccountMeta::new(params.payer, true),
        AccountMeta::new_readonly(params.tree_delegate, true),
        AccountMeta::new_readonly(noop::id(), false),
        AccountMeta::new_readonly(compression::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: bubblegum::id(),
        accounts,
        data,
    })
}

/// Inputs for minting a leaf directly into a verified-collection flow.
#[derive(Debug, Clone)]
pub struct MintToCollectionParams {
    pub tree: Pubkey,
    pub payer: Pubkey,
    pub tree_delegate: Pubkey,
    pub leaf_owner: Pubkey,
    pub leaf_delegate: Pubkey,
    /// Authority over the collection metadata; must sign.
    pub collection_authority: Pubkey,
    /// Delegate-record PDA when the authority acts through one; the
    /// program id itself marks "none".
    pub collection_authority_record: Option<Pubkey>,
    pub collection_mint: Pubkey,
    pub metadata: MetadataArgs,
}

#[derive(BorshSerialize)]
struct MintToCollectionV1Args {
    metadata_args: MetadataArgs,
}

pub fn mint_to_collection_v1(params: MintToCollectionParams) -> Result<Instruction, io::Error> {
    let tree_authority = pda::tree_authority(&params.tree);
    let collection_metadata = pda::metadata_account(&params.collection_mint);
    let collection_edition = pda::master_edition_account(&params.collection_mint);

    // The program sets `verified` itself through the collection-CPI
    // signer; a mint request must always carry it unverified.
    let mut metadata = params.metadata;
    metadata.collection = Some(Collection {
        verified: false,
        key: params.collection_mint,
    });

    let data = anchor_data(
        "mint_to_collection_v1",
        &MintToCollectionV1Args {
            metadata_args: metadata,
        },
    )?;

    let accounts = vec![
        AccountMeta::new(tree_authority, false),
        AccountMeta::new_readonly(params.leaf_owner, false),
        AccountMeta::new_readonly(params.leaf_delegate, false),
        AccountMeta::new(params.tree, false),
        AccountMeta::new(params.payer, true),
        AccountMeta::new_readonly(params.tree_delegate, true),
        AccountMeta::new_readonly(params.collection_authority, true),
        AccountMeta::new_readonly(
            params.collection_authority_record.unwrap_or_else(bubblegum::id),
            false,
        ),
        AccountMeta::new_readonly(params.collection_mint, false),
        AccountMeta::new(collection_metadata, false),
        AccountMeta::new_readonly(collection_edition, false),
        AccountMeta::new_readonly(pda::collection_cpi_signer(), false),
        AccountMeta::new_readonly(noop::id(), false),
        AccountMeta::new_readonly(compression::id(), false),
        AccountMeta::new_readonly(token_metadata::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: bubblegum::id(),
        accounts,
        data,
    })
}
