use std::path::PathBuf;

use alloy::primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

const DEFAULT_RPC_URL: &str = "http://localhost:8545";
const DEFAULT_CONTRACT_ADDRESS: &str = "0xcf135943612437354966E77cCb07873f0e570745";
const CONFIG_FILE: &str = "~/.reckometer.json";

/// Chain the Reckometer contract is deployed on (TEN testnet).
pub const REQUIRED_CHAIN_ID: u64 = 0x1bb;

/// Where holders go to join the required network when their wallet is
/// pointed elsewhere.
pub const NETWORK_GATEWAY_URL: &str = "https://testnet.ten.xyz";

/// Optional dotfile with the same knobs as the CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigFile {
    pub rpc_url: Option<String>,
    pub rpc_endpoints: IndexMap<String, String>,
    pub contract: Option<String>,
    pub chain_id: Option<String>,
    pub gateway_url: Option<String>,
}

pub fn config_file_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(CONFIG_FILE).as_ref())
}

pub fn load_config_file() -> Result<ConfigFile> {
    let path = config_file_path();
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub rpc_endpoints: IndexMap<String, String>,
    pub required_chain: u64,
    pub contract_address: Address,
    pub gateway_url: String,
    pub debug: bool,
}

impl Config {
    pub fn new(
        rpc_url: Option<String>,
        rpc_endpoints: Option<&str>,
        contract: Option<&str>,
        chain_id: Option<&str>,
        debug: bool,
        file: ConfigFile,
    ) -> Result<Self> {
        let mut endpoints = file.rpc_endpoints.clone();
        if let Some(spec) = rpc_endpoints {
            for (name, endpoint_url) in parse_endpoints(spec)? {
                endpoints.insert(name, endpoint_url);
            }
        }
        for (name, endpoint_url) in endpoints.iter() {
            Url::parse(endpoint_url)
                .map_err(|e| anyhow!("invalid url for endpoint {}: {}", name, e))?;
        }

        let rpc_url = rpc_url
            .or(file.rpc_url)
            .or(endpoints.get("ten").cloned())
            .unwrap_or(DEFAULT_RPC_URL.to_string());

        let required_chain = chain_id
            .map(str::to_string)
            .or(file.chain_id)
            .map(|raw| parse_chain_id(&raw))
            .transpose()?
            .unwrap_or(REQUIRED_CHAIN_ID);

        let contract_address = contract
            .map(str::to_string)
            .or(file.contract)
            .unwrap_or(DEFAULT_CONTRACT_ADDRESS.to_string())
            .parse::<Address>()
            .map_err(|e| anyhow!("invalid contract address: {}", e))?;

        let gateway_url = file.gateway_url.unwrap_or(NETWORK_GATEWAY_URL.to_string());

        Ok(Self {
            rpc_url,
            rpc_endpoints: endpoints,
            required_chain,
            contract_address,
            gateway_url,
            debug,
        })
    }
}

/// Accepts both `0x1bb` and `443`.
pub fn parse_chain_id(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x") {
        Ok(u64::from_str_radix(hex, 16)?)
    } else {
        Ok(raw.parse()?)
    }
}

/// Parses `name=url,name=url` endpoint lists, keeping the given order.
pub fn parse_endpoints(spec: &str) -> Result<IndexMap<String, String>> {
    let mut endpoints = IndexMap::new();
    for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
        let (name, endpoint_url) = entry
            .split_once('=')
            .ok_or(anyhow!("expected name=url, got {}", entry))?;
        if name.trim().is_empty() {
            bail!("empty endpoint name in {}", entry);
        }
        endpoints.insert(name.trim().to_string(), endpoint_url.trim().to_string());
    }
    Ok(endpoints)
}
