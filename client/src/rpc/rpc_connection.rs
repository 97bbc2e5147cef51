use std::fmt::Debug;

use async_trait::async_trait;
use borsh::BorshDeserialize;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, instruction::Instruction,
    pubkey::Pubkey, signature::Keypair, signature::Signature, transaction::Transaction,
};

use crate::rpc::errors::RpcError;

/// Chain access consumed by the lifecycle client.
///
/// One `send_and_confirm_transaction` call submits its instructions as a
/// single atomic unit and blocks until the configured commitment is
/// reached or the confirmation timeout elapses. Submission is never
/// retried here: several transitions (mint, redeem) are not idempotent,
/// and a failed submission usually means the proof inputs changed under
/// the caller.
#[async_trait]
pub trait ChainClient: Send + Sync + Debug + 'static {
    fn payer(&self) -> &Keypair;

    fn commitment(&self) -> CommitmentConfig;

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcError>;

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    async fn send_and_confirm_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError>;

    async fn create_and_send_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &[&Keypair],
    ) -> Result<Signature, RpcError> {
        let blockhash = self.get_latest_blockhash().await?;
        let transaction =
            Transaction::new_signed_with_payer(instructions, Some(payer), signers, blockhash);
        self.send_and_confirm_transaction(transaction).await
    }

    /// Reads an anchor account, skipping the 8-byte discriminator.
    async fn get_anchor_account<T: BorshDeserialize>(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<T>, RpcError> {
        match self.get_account(pubkey).await? {
            Some(account) => {
                let data = account.data.get(8..).ok_or_else(|| {
                    RpcError::CustomError(format!("account {pubkey} too short for discriminator"))
                })?;
                let data = T::deserialize(&mut &data[..]).map_err(RpcError::from)?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }
}
