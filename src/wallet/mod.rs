use std::sync::Arc;

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::Provider,
    transports::http::{Client, Http},
};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

mod rpc;
mod signer;

pub use rpc::RpcWallet;
pub use signer::{signer_from_key, signer_from_keystore};

pub type HttpProvider = Arc<dyn Provider<Http<Client>, Ethereum>>;

/// Capability surface of the holder's wallet: transports, the signing
/// account, and network control. The session manager is the only component
/// that drives account/network requests against it.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Read-only transport to the active network.
    fn read_provider(&self) -> HttpProvider;

    /// Signer-bound transport for state-mutating calls; errors when no
    /// signer is loaded.
    fn signing_provider(&self) -> Result<HttpProvider>;

    /// Address of the loaded signer, if any.
    fn address(&self) -> Option<Address>;

    /// Chain id of the active network.
    async fn chain_id(&self) -> Result<u64>;

    /// Moves the wallet onto the required chain, or fails.
    async fn switch_chain(&self, required: u64) -> Result<()>;

    /// Chain-change notifications. May fire at any time; observers must
    /// treat a change as a preemptive reset signal.
    fn subscribe_chain_changes(&self) -> watch::Receiver<u64>;
}
