use std::sync::{Arc, RwLock};

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{HttpProvider, WalletProvider};
use crate::config::Config;

struct Endpoint {
    url: String,
    read: HttpProvider,
    signed: Option<HttpProvider>,
}

/// Wallet capability backed by HTTP RPC endpoints and an optional local
/// signer. "Switching network" repoints to a configured endpoint that
/// serves the requested chain.
pub struct RpcWallet {
    signer: Option<PrivateKeySigner>,
    endpoints: IndexMap<String, String>,
    active: RwLock<Endpoint>,
    chain_tx: watch::Sender<u64>,
}

impl RpcWallet {
    pub fn new(config: &Config, signer: Option<PrivateKeySigner>) -> Result<Self> {
        let active = build_endpoint(&config.rpc_url, signer.as_ref())?;
        let (chain_tx, _) = watch::channel(0);
        Ok(RpcWallet {
            signer,
            endpoints: config.rpc_endpoints.clone(),
            active: RwLock::new(active),
            chain_tx,
        })
    }

    pub fn endpoint_names(&self) -> Vec<String> {
        self.endpoints.keys().cloned().collect()
    }

    pub fn endpoints(&self) -> &IndexMap<String, String> {
        &self.endpoints
    }

    pub fn active_url(&self) -> String {
        self.active.read().unwrap().url.clone()
    }

    /// Repoints to a named endpoint and publishes the resulting chain id on
    /// the chain-change channel.
    pub async fn use_endpoint(&self, name: &str) -> Result<u64> {
        let url = self
            .endpoints
            .get(name)
            .ok_or(anyhow!("unknown endpoint {}", name))?
            .clone();
        self.repoint(&url)?;
        let chain = self.read_provider().get_chain_id().await?;
        self.chain_tx.send_replace(chain);
        Ok(chain)
    }

    fn repoint(&self, url: &str) -> Result<()> {
        let endpoint = build_endpoint(url, self.signer.as_ref())?;
        *self.active.write().unwrap() = endpoint;
        info!(%url, "rpc endpoint changed");
        Ok(())
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    fn read_provider(&self) -> HttpProvider {
        self.active.read().unwrap().read.clone()
    }

    fn signing_provider(&self) -> Result<HttpProvider> {
        self.active
            .read()
            .unwrap()
            .signed
            .clone()
            .ok_or(anyhow!("no signer loaded"))
    }

    fn address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.read_provider().get_chain_id().await?)
    }

    async fn switch_chain(&self, required: u64) -> Result<()> {
        let probes = self.endpoints.iter().map(|(name, url)| {
            let name = name.clone();
            let url = url.clone();
            async move {
                let probed = probe_chain_id(&url).await;
                (name, url, probed)
            }
        });
        for (name, url, probed) in join_all(probes).await {
            match probed {
                Ok(chain) if chain == required => {
                    debug!(endpoint = %name, "endpoint serves chain 0x{:x}", required);
                    self.repoint(&url)?;
                    self.chain_tx.send_replace(required);
                    return Ok(());
                }
                Ok(_) => {}
                Err(err) => debug!(endpoint = %name, %err, "endpoint probe failed"),
            }
        }
        bail!("no configured endpoint serves chain 0x{:x}", required)
    }

    fn subscribe_chain_changes(&self) -> watch::Receiver<u64> {
        self.chain_tx.subscribe()
    }
}

fn build_endpoint(url: &str, signer: Option<&PrivateKeySigner>) -> Result<Endpoint> {
    let rpc_url: url::Url = url.parse()?;
    let read: HttpProvider = Arc::new(ProviderBuilder::new().on_http(rpc_url.clone()));
    let signed = signer.map(|signer| {
        let wallet = EthereumWallet::from(signer.clone());
        Arc::new(ProviderBuilder::new().wallet(wallet).on_http(rpc_url.clone())) as HttpProvider
    });
    Ok(Endpoint {
        url: url.to_string(),
        read,
        signed,
    })
}

async fn probe_chain_id(url: &str) -> Result<u64> {
    let rpc_url: url::Url = url.parse()?;
    let provider = ProviderBuilder::new().on_http(rpc_url);
    Ok(provider.get_chain_id().await?)
}
