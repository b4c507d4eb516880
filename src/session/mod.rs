use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::wallet::WalletProvider;

/// Snapshot of the wallet connection, published on every transition.
/// Created empty at startup; mutated only by connect/disconnect and by
/// chain-change notifications; reset to empty on disconnect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub address: Option<Address>,
    pub connecting: bool,
    pub error: Option<ClientError>,
    /// Set when the active chain differs from the required one; drives the
    /// network prompt.
    pub wrong_network: bool,
}

impl WalletSession {
    /// A session the synchronizer may issue contract calls for.
    pub fn is_connected(&self) -> bool {
        self.address.is_some() && !self.wrong_network
    }
}

/// Owns the wallet session state. The only component that talks to the
/// wallet capability directly.
pub struct SessionManager {
    provider: Option<Arc<dyn WalletProvider>>,
    required_chain: u64,
    state: watch::Sender<WalletSession>,
}

impl SessionManager {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, required_chain: u64) -> Self {
        let (state, _) = watch::channel(WalletSession::default());
        SessionManager {
            provider,
            required_chain,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletSession> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WalletSession {
        self.state.borrow().clone()
    }

    /// Requests the wallet capability and validates the active network,
    /// attempting a network switch on mismatch. The resulting state is both
    /// published and returned.
    pub async fn connect(&self) -> Result<Address, ClientError> {
        let Some(provider) = self.provider.clone() else {
            let err = ClientError::ProviderMissing;
            self.state.send_replace(WalletSession {
                error: Some(err.clone()),
                ..Default::default()
            });
            return Err(err);
        };

        self.state.send_modify(|s| {
            s.connecting = true;
            s.error = None;
            s.wrong_network = false;
        });

        match self.establish(provider.as_ref()).await {
            Ok(address) => {
                info!(%address, "wallet connected");
                self.state.send_replace(WalletSession {
                    address: Some(address),
                    ..Default::default()
                });
                Ok(address)
            }
            Err(err) => {
                self.state.send_replace(WalletSession {
                    error: Some(err.clone()),
                    wrong_network: err == ClientError::WrongNetwork,
                    ..Default::default()
                });
                Err(err)
            }
        }
    }

    async fn establish(&self, provider: &dyn WalletProvider) -> Result<Address, ClientError> {
        let chain = provider.chain_id().await.map_err(|err| {
            warn!(%err, "chain id lookup failed");
            ClientError::ConnectFailed
        })?;

        if chain != self.required_chain {
            debug!(
                "active chain 0x{:x}, required 0x{:x}, requesting switch",
                chain, self.required_chain
            );
            provider.switch_chain(self.required_chain).await.map_err(|err| {
                warn!(%err, "network switch failed");
                ClientError::WrongNetwork
            })?;
        }

        provider.address().ok_or(ClientError::ProviderMissing)
    }

    /// Purely local reset; no provider call.
    pub fn disconnect(&self) {
        self.state.send_replace(WalletSession::default());
    }

    /// Observes chain-change notifications for the manager's lifetime. Any
    /// move away from the required chain resets the session, regardless of
    /// in-flight operations.
    pub async fn run_chain_watcher(self: Arc<Self>) {
        let Some(provider) = self.provider.clone() else {
            return;
        };
        let mut chain_rx = provider.subscribe_chain_changes();
        while chain_rx.changed().await.is_ok() {
            let chain = *chain_rx.borrow_and_update();
            if chain != self.required_chain {
                warn!("network changed to chain 0x{:x}, resetting session", chain);
                self.state.send_replace(WalletSession {
                    error: Some(ClientError::WrongNetwork),
                    wrong_network: true,
                    ..Default::default()
                });
            }
        }
    }
}
