use std::sync::Arc;
use std::time::Duration;

use alloy::{
    contract::{ContractInstance, Interface},
    dyn_abi::DynSolValue,
    network::TransactionBuilder,
    primitives::{Address, U256},
    providers::{PendingTransactionBuilder, Provider},
    rpc::types::{Filter, TransactionInput, TransactionRequest},
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::abi::{ABI, PROJECT_ADDED_TOPIC, RECK_SCORE_INCREASED_TOPIC};
use super::{CallMode, ContractGateway, ContractHandle, ProjectRow, ProjectRows};
use crate::error::ClientError;
use crate::session::WalletSession;
use crate::wallet::{HttpProvider, WalletProvider};

const RECEIPT_TIMEOUT_SECS: u64 = 30;

/// Gateway over HTTP RPC. Read handles borrow the wallet's read transport;
/// signed handles require a connected, correctly-networked session.
pub struct RpcGateway {
    wallet: Arc<dyn WalletProvider>,
    address: Address,
}

impl RpcGateway {
    pub fn new(wallet: Arc<dyn WalletProvider>, address: Address) -> Self {
        RpcGateway { wallet, address }
    }
}

#[async_trait]
impl ContractGateway for RpcGateway {
    async fn handle(
        &self,
        session: &WalletSession,
        mode: CallMode,
    ) -> Result<Box<dyn ContractHandle>, ClientError> {
        if session.wrong_network {
            return Err(ClientError::WrongNetwork);
        }
        let handle = match mode {
            CallMode::Call => RpcHandle {
                provider: self.wallet.read_provider(),
                address: self.address,
                from: None,
            },
            CallMode::Send => {
                let from = session.address.ok_or(ClientError::ProviderMissing)?;
                let provider = self.wallet.signing_provider().map_err(|err| {
                    warn!(%err, "signing transport unavailable");
                    ClientError::ProviderMissing
                })?;
                RpcHandle {
                    provider,
                    address: self.address,
                    from: Some(from),
                }
            }
        };
        Ok(Box::new(handle))
    }
}

struct RpcHandle {
    provider: HttpProvider,
    address: Address,
    from: Option<Address>,
}

impl RpcHandle {
    async fn call(&self, name: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        let interface = Interface::new(ABI.clone());
        let contract = ContractInstance::new(self.address, self.provider.root().clone(), interface);
        let func = contract.function(name, args)?;
        Ok(func.call().await?)
    }

    async fn send(&self, name: &str, args: &[DynSolValue]) -> Result<()> {
        let from = self.from.ok_or(anyhow!("read-only handle cannot send"))?;
        let interface = Interface::new(ABI.clone());
        let contract = ContractInstance::new(self.address, self.provider.root().clone(), interface);
        let func = contract.function(name, args)?;
        let input = TransactionInput::new(func.calldata().clone());

        let tx_req = TransactionRequest::default()
            .with_to(self.address)
            .with_from(from)
            .input(input);
        let pending = self.provider.send_transaction(tx_req).await?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, function = name, "transaction submitted");

        let receipt = PendingTransactionBuilder::new(self.provider.root(), tx_hash)
            .with_required_confirmations(1)
            .with_timeout(Some(Duration::from_secs(RECEIPT_TIMEOUT_SECS)))
            .get_receipt()
            .await?;
        if !receipt.status() {
            bail!("transaction {} reverted", tx_hash);
        }
        Ok(())
    }
}

#[async_trait]
impl ContractHandle for RpcHandle {
    async fn get_all_projects(&self) -> Result<ProjectRows> {
        let values = self.call("getAllProjects", &[]).await?;
        let [names, descriptions, icon_urls, project_urls, reck_scores]: [DynSolValue; 5] = values
            .try_into()
            .map_err(|_| anyhow!("getAllProjects returned unexpected arity"))?;
        Ok(ProjectRows {
            names: string_column(names)?,
            descriptions: string_column(descriptions)?,
            icon_urls: string_column(icon_urls)?,
            project_urls: string_column(project_urls)?,
            reck_scores: uint_column(reck_scores)?,
        })
    }

    async fn get_project(&self, project_id: u64) -> Result<ProjectRow> {
        let args = [DynSolValue::Uint(U256::from(project_id), 256)];
        let values = self.call("getProject", &args).await?;
        let [name, description, icon_url, project_url, reck_score]: [DynSolValue; 5] = values
            .try_into()
            .map_err(|_| anyhow!("getProject returned unexpected arity"))?;
        Ok(ProjectRow {
            name: as_string(name)?,
            description: as_string(description)?,
            icon_url: as_string(icon_url)?,
            project_url: as_string(project_url)?,
            reck_score: as_uint(reck_score)?,
        })
    }

    async fn get_total_projects(&self) -> Result<u64> {
        let values = self.call("getTotalProjects", &[]).await?;
        let total = values
            .into_iter()
            .next()
            .ok_or(anyhow!("getTotalProjects returned nothing"))?;
        Ok(u64::try_from(as_uint(total)?).map_err(|_| anyhow!("project count overflows u64"))?)
    }

    async fn add_project(&self, name: &str, description: &str) -> Result<()> {
        let args = [
            DynSolValue::String(name.to_string()),
            DynSolValue::String(description.to_string()),
        ];
        self.send("addProject", &args).await
    }

    async fn increase_reck_score(&self, project_id: u64) -> Result<()> {
        let args = [DynSolValue::Uint(U256::from(project_id), 256)];
        self.send("increaseReckScore", &args).await
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn project_events(&self, from_block: u64) -> Result<Vec<u64>> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(vec![*PROJECT_ADDED_TOPIC, *RECK_SCORE_INCREASED_TOPIC])
            .from_block(from_block);
        let logs = self.provider.get_logs(&filter).await?;
        Ok(logs.into_iter().filter_map(|log| log.block_number).collect())
    }
}

fn string_column(value: DynSolValue) -> Result<Vec<String>> {
    match value {
        DynSolValue::Array(items) => items.into_iter().map(as_string).collect(),
        _ => bail!("expected a string array column"),
    }
}

fn uint_column(value: DynSolValue) -> Result<Vec<U256>> {
    match value {
        DynSolValue::Array(items) => items.into_iter().map(as_uint).collect(),
        _ => bail!("expected a uint array column"),
    }
}

fn as_string(value: DynSolValue) -> Result<String> {
    match value {
        DynSolValue::String(s) => Ok(s),
        _ => bail!("expected a string value"),
    }
}

fn as_uint(value: DynSolValue) -> Result<U256> {
    match value {
        DynSolValue::Uint(n, _) => Ok(n),
        _ => bail!("expected a uint value"),
    }
}
