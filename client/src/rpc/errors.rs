use std::io;

use solana_client::client_error::ClientError;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::TransactionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("TransactionError: {0}")]
    TransactionError(#[from] Box<TransactionError>),

    #[error("ClientError: {0}")]
    ClientError(#[from] Box<ClientError>),

    #[error("IoError: {0}")]
    IoError(#[from] Box<io::Error>),

    /// Simulation or network failure during submission. Carries the
    /// program logs so the root cause (including a stale proof root
    /// rejected on-chain) is never swallowed.
    #[error("transaction submission failed: {message}")]
    SubmissionError { message: String, logs: Vec<String> },

    /// Confirmation did not reach the configured commitment before the
    /// timeout. The outcome is unknown; callers must re-query chain state
    /// before resubmitting a non-idempotent operation.
    #[error("confirmation timed out for transaction {signature}")]
    ConfirmationTimeout { signature: Signature },

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("Error: `{0}`")]
    CustomError(String),
}

impl From<TransactionError> for RpcError {
    fn from(err: TransactionError) -> Self {
        RpcError::TransactionError(Box::new(err))
    }
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        RpcError::ClientError(Box::new(err))
    }
}

impl From<io::Error> for RpcError {
    fn from(err: io::Error) -> Self {
        RpcError::IoError(Box::new(err))
    }
}
