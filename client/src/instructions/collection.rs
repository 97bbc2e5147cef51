//! Token-metadata instructions for bootstrapping a collection NFT before
//! minting compressed assets into it.
//!
//! The token-metadata program predates anchor; its instructions are a
//! borsh enum selected by a one-byte discriminant.

use std::io;

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};

use crate::{
    constants::token_metadata,
    pda,
    types::{CollectionDetails, DataV2},
};

const CREATE_MASTER_EDITION_V3: u8 = 17;
const CREATE_METADATA_ACCOUNT_V3: u8 = 33;
const SET_COLLECTION_SIZE: u8 = 34;

fn token_metadata_data<T: BorshSerialize>(discriminant: u8, args: &T) -> Result<Vec<u8>, io::Error> {
    let mut data = vec![discriminant];
    args.serialize(&mut data)?;
    Ok(data)
}

#[derive(Debug, Clone)]
pub struct CreateMetadataAccountParams {
    pub mint: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    pub update_authority: Pubkey,
    pub data: DataV2,
    pub is_mutable: bool,
    pub collection_details: Option<CollectionDetails>,
}

#[derive(BorshSerialize)]
struct CreateMetadataAccountArgsV3 {
    data: DataV2,
    is_mutable: bool,
    collection_details: Option<CollectionDetails>,
}

pub fn create_metadata_account_v3(
    params: CreateMetadataAccountParams,
) -> Result<Instruction, io::Error> {
    let metadata = pda::metadata_account(&params.mint);
    let data = token_metadata_data(
        CREATE_METADATA_ACCOUNT_V3,
        &CreateMetadataAccountArgsV3 {
            data: params.data,
            is_mutable: params.is_mutable,
            collection_details: params.collection_details,
        },
    )?;

    let accounts = vec![
        AccountMeta::new(metadata, false),
        AccountMeta::new_readonly(params.mint, false),
        AccountMeta::new_readonly(params.mint_authority, true),
        AccountMeta::new(params.payer, true),
        AccountMeta::new_readonly(params.update_authority, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    Ok(Instruction {
        program_id: token_metadata::id(),
        accounts,
        data,
    })
}

#[derive(Debug, Clone)]
pub struct CreateMasterEditionParams {
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    /// `Some(0)` forbids printing editions, the usual choice for a
    /// collection parent.
    pub max_supply: Option<u64>,
}

#[derive(BorshSerialize)]
struct CreateMasterEditionArgs {
    max_supply: Option<u64>,
}

pub fn create_master_edition_v3(
    params: CreateMasterEditionParams,
) -> Result<Instruction, io::Error> {
    let edition = pda::master_edition_account(&params.mint);
    let metadata = pda::metadata_account(&params.mint);
    let data = token_metadata_data(
        CREATE_MASTER_EDITION_V3,
        &CreateMasterEditionArgs {
            max_supply: params.max_supply,
        },
    )?;

    let accounts = vec![
        AccountMeta::new(edition, false),
        AccountMeta::new(params.mint, false),
        AccountMeta::new_readonly(params.update_authority, true),
        AccountMeta::new_readonly(params.mint_authority, true),
        AccountMeta::new(params.payer, true),
        AccountMeta::new(metadata, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    Ok(Instruction {
        program_id: token_metadata::id(),
        accounts,
        data,
    })
}

#[derive(Debug, Clone)]
pub struct SetCollectionSizeParams {
    pub collection_mint: Pubkey,
    pub collection_authority: Pubkey,
    pub size: u64,
}

#[derive(BorshSerialize)]
struct SetCollectionSizeArgs {
    size: u64,
}

pub fn set_collection_size(params: SetCollectionSizeParams) -> Result<Instruction, io::Error> {
    let collection_metadata = pda::metadata_account(&params.collection_mint);
    let data = token_metadata_data(
        SET_COLLECTION_SIZE,
        &SetCollectionSizeArgs { size: params.size },
    )?;

    let accounts = vec![
        AccountMeta::new(collection_metadata, false),
        AccountMeta::new(params.collection_authority, true),
        AccountMeta::new_readonly(params.collection_mint, false),
    ];

    Ok(Instruction {
        program_id: token_metadata::id(),
        accounts,
        data,
    })
}
