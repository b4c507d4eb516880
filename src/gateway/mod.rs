use alloy::primitives::U256;
use anyhow::Result;
use async_trait::async_trait;

use crate::error::ClientError;
use crate::session::WalletSession;

mod abi;
mod rpc;

pub use abi::{ABI, PROJECT_ADDED_TOPIC, RECKOMETER_ABI, RECK_SCORE_INCREASED_TOPIC};
pub use rpc::RpcGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Call,
    Send,
}

impl std::fmt::Display for CallMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallMode::Call => write!(f, "call"),
            CallMode::Send => write!(f, "send"),
        }
    }
}

/// Column-major project data exactly as the contract returns it: five
/// positionally-aligned sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRows {
    pub names: Vec<String>,
    pub descriptions: Vec<String>,
    pub icon_urls: Vec<String>,
    pub project_urls: Vec<String>,
    pub reck_scores: Vec<U256>,
}

/// One project's five fields, as returned by `getProject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRow {
    pub name: String,
    pub description: String,
    pub icon_url: String,
    pub project_url: String,
    pub reck_score: U256,
}

/// A contract handle bound to one transport. Write operations submit, await
/// the receipt and fail on reverted status before returning.
#[async_trait]
pub trait ContractHandle: Send + Sync {
    async fn get_all_projects(&self) -> Result<ProjectRows>;
    async fn get_project(&self, project_id: u64) -> Result<ProjectRow>;
    async fn get_total_projects(&self) -> Result<u64>;
    async fn add_project(&self, name: &str, description: &str) -> Result<()>;
    async fn increase_reck_score(&self, project_id: u64) -> Result<()>;
    async fn block_number(&self) -> Result<u64>;
    /// Block numbers carrying project events at or after `from_block`.
    async fn project_events(&self, from_block: u64) -> Result<Vec<u64>>;
}

/// Binds the current wallet session to contract handles. A fresh handle is
/// built per logical operation; nothing is cached across calls.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    async fn handle(
        &self,
        session: &WalletSession,
        mode: CallMode,
    ) -> Result<Box<dyn ContractHandle>, ClientError>;
}

/// Stand-in used when no wallet capability was loaded at startup.
pub struct DisconnectedGateway;

#[async_trait]
impl ContractGateway for DisconnectedGateway {
    async fn handle(
        &self,
        _session: &WalletSession,
        _mode: CallMode,
    ) -> Result<Box<dyn ContractHandle>, ClientError> {
        Err(ClientError::ProviderMissing)
    }
}
