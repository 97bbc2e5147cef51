use std::io;

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_instruction, system_program,
};

use super::anchor_data;
use crate::{
    constants::{bubblegum, compression, noop},
    pda,
    state::tree_account_size,
};

/// Inputs for creating a new concurrent Merkle tree owned by the
/// compressed-NFT program.
#[derive(Debug, Clone)]
pub struct CreateTreeParams {
    /// Address of the new tree account; its keypair must co-sign the
    /// allocation.
    pub tree: Pubkey,
    pub payer: Pubkey,
    pub tree_creator: Pubkey,
    pub max_depth: u32,
    pub max_buffer_size: u32,
    /// Whether anyone may mint into the tree, or only the creator and
    /// its delegate.
    pub public: Option<bool>,
}

#[derive(BorshSerialize)]
struct CreateTreeArgs {
    max_depth: u32,
    max_buffer_size: u32,
    public: Option<bool>,
}

/// System-program allocation of the tree account. The size must be exactly
/// what the compression program expects for the shape or initialization
/// fails.
pub fn allocate_tree_account(
    tree: &Pubkey,
    payer: &Pubkey,
    lamports: u64,
    max_depth: u32,
    max_buffer_size: u32,
    canopy_depth: u32,
) -> Instruction {
    let space = tree_account_size(max_depth, max_buffer_size, canopy_depth);
    system_instruction::create_account(payer, tree, lamports, space as u64, &compression::id())
}

pub fn create_tree(params: CreateTreeParams) -> Result<Instruction, io::Error> {
    let tree_authority = pda::tree_authority(&params.tree);
    let data = anchor_data(
        "create_tree",
        &CreateTreeArgs {
            max_depth: params.max_depth,
            max_buffer_size: params.max_buffer_size,
            public: params.public,
        },
    )?;

    let accounts = vec![
        AccountMeta::new(tree_authority, false),
        AccountMeta::new(params.tree, false),
        AccountMeta::new(params.payer, true),
        AccountMeta::new_readonly(params.tree_creator, true),
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
