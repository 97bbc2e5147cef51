pub mod errors;
pub mod rpc_connection;
pub mod solana_rpc;

pub use errors::RpcError;
pub use rpc_connection::ChainClient;
pub use solana_rpc::SolanaRpcConnection;
