use std::io;

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use super::{anchor_data, LeafArgs};
use crate::{
    constants::{bubblegum, compression, noop},
    pda,
};

/// Inputs for transferring a leaf to a new owner.
///
/// Exactly one of `leaf_owner`/`leaf_delegate` authorizes the transfer and
/// must sign; `delegate_signs` selects which. The proof path must already
/// be truncated to the tree's canopy depth.
#[derive(Debug, Clone)]
pub struct TransferParams {
    pub tree: Pubkey,
    pub leaf_owner: Pubkey,
    pub leaf_delegate: Pubkey,
    pub new_leaf_owner: Pubkey,
    pub delegate_signs: bool,
    pub args: LeafArgs,
    pub proof_path: Vec<AccountMeta>,
}

pub fn transfer(params: TransferParams) -> Result<Instruction, io::Error> {
    let tree_authority = pda::tree_authority(&params.tree);
    let data = anchor_data("transfer", &params.args)?;

    let mut accounts = vec![
        AccountMeta::new_readonly(tree_authority, false),
        AccountMeta::new_readonly(params.leaf_owner, !params.delegate_signs),
        AccountMeta::new_readonly(params.leaf_delegate, params.delegate_signs),
        AccountMeta::new_readonly(params.new_leaf_owner, false),
        AccountMeta::new(params.tree, false),
        AccountMeta::new_readonly(noop::id(), false),
        AccountMeta::new_readonly(compression::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(params.proof_path);

    Ok(Instruction {
        program_id: bubblegum::id(),
        accounts,
        data,
    })
}
