use std::{
    fmt::{Debug, Formatter},
    time::Duration,
};

use async_trait::async_trait;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_client::RpcClient,
    rpc_config::RpcSendTransactionConfig,
    rpc_request::{RpcError as RpcRequestError, RpcResponseErrorData},
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Keypair, signature::Signature, transaction::Transaction,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::rpc::{errors::RpcError, rpc_connection::ChainClient};

/// [`ChainClient`] over a Solana JSON-RPC node.
pub struct SolanaRpcConnection {
    pub client: RpcClient,
    pub payer: Keypair,
    confirm_timeout: Duration,
}

impl Debug for SolanaRpcConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolanaRpcConnection {{ url: {:?} }}",
            self.client.url()
        )
    }
}

impl SolanaRpcConnection {
    pub fn new<U: ToString>(
        url: U,
        commitment: Option<CommitmentConfig>,
        payer: Keypair,
    ) -> Self {
        let commitment = commitment.unwrap_or_else(CommitmentConfig::confirmed);
        let client = RpcClient::new_with_commitment(url.to_string(), commitment);
        Self {
            client,
            payer,
            confirm_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_confirm_timeout(mut self, confirm_timeout: Duration) -> Self {
        self.confirm_timeout = confirm_timeout;
        self
    }

    /// Pulls preflight simulation logs out of a send failure so the
    /// caller sees the on-chain rejection reason, not a generic message.
    fn submission_error(err: ClientError) -> RpcError {
        let logs = match err.kind() {
            ClientErrorKind::RpcError(RpcRequestError::RpcResponseError {
                data: RpcResponseErrorData::SendTransactionPreflightFailure(result),
                ..
            }) => result.logs.clone().unwrap_or_default(),
            _ => Vec::new(),
        };
        RpcError::SubmissionError {
            message: err.to_string(),
            logs,
        }
    }
}

#[async_trait]
impl ChainClient for SolanaRpcConnection {
    fn payer(&self) -> &Keypair {
        &self.payer
    }

    fn commitment(&self) -> CommitmentConfig {
        self.client.commitment()
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcError> {
        self.client
            .get_account_with_commitment(address, self.client.commitment())
            .map(|response| response.value)
            .map_err(RpcError::from)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .map_err(RpcError::from)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        self.client
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .map(|(blockhash, _)| blockhash)
            .map_err(RpcError::from)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError> {
        let signature = self
            .client
            .send_transaction_with_config(
                &transaction,
                RpcSendTransactionConfig {
                    preflight_commitment: Some(self.client.commitment().commitment),
                    ..Default::default()
                },
            )
            .map_err(Self::submission_error)?;
        debug!("submitted transaction {signature}");

        let started = Instant::now();
        loop {
            let statuses = self
                .client
                .get_signature_statuses(&[signature])
                .map_err(RpcError::from)?;
            if let Some(status) = statuses.value.first().and_then(|status| status.clone()) {
                if let Some(err) = status.err {
                    return Err(RpcError::from(err));
                }
                if status.satisfies_commitment(self.client.commitment()) {
                    return Ok(signature);
                }
            }
            if started.elapsed() >= self.confirm_timeout {
                warn!("transaction {signature} not confirmed after {:?}", self.confirm_timeout);
                return Err(RpcError::ConfirmationTimeout { signature });
            }
            sleep(Duration::from_millis(500)).await;
        }
    }
}
