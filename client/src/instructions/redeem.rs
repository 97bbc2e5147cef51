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

/// Inputs for removing a leaf from the tree into a voucher.
///
/// Redeem asserts inclusion, so it carries the same proof path as
/// transfer. It is not idempotent: a second redeem of the same leaf fails
/// because the voucher already exists.
#[derive(Debug, Clone)]
pub struct RedeemParams {
    pub tree: Pubkey,
    pub leaf_owner: Pubkey,
    pub leaf_delegate: Pubkey,
    pub args: LeafArgs,
    pub proof_path: Vec<AccountMeta>,
}

pub fn redeem(params: RedeemParams) -> Result<Instruction, io::Error> {
    let tree_authority = pda::tree_authority(&params.tree);
    let voucher = pda::voucher(&params.tree, params.args.nonce);
    let data = anchor_data("redeem", &params.args)?;

    let mut accounts = vec![
        AccountMeta::new(tree_authority, false),
        AccountMeta::new(params.leaf_owner, true),
        AccountMeta::new_readonly(params.leaf_delegate, false),
        AccountMeta::new(params.tree, false),
        AccountMeta::new(voucher, false),
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
