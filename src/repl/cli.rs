use std::path::PathBuf;

use clap::Parser;

pub const RECKOMETER_VERSION: &str = env!("RECKOMETER_VERSION");

#[derive(Parser)]
#[command(version = RECKOMETER_VERSION, about = "Terminal client for the Reckometer project board", long_about = None)]
pub struct Cli {
    /// RPC URL of the required network
    #[arg(long, value_name = "URL", env = "RECKOMETER_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Named RPC endpoints, e.g. "ten=https://rpc.ten.xyz,local=http://localhost:8545"
    #[arg(long, value_name = "LIST", env = "RECKOMETER_RPC_ENDPOINTS")]
    pub rpc_endpoints: Option<String>,

    /// Reckometer contract address
    #[arg(long, value_name = "ADDRESS", env = "RECKOMETER_CONTRACT")]
    pub contract: Option<String>,

    /// Required chain id, hex or decimal
    #[arg(long, value_name = "CHAIN_ID", env = "RECKOMETER_CHAIN_ID")]
    pub chain_id: Option<String>,

    /// Hex-encoded private key to sign with
    #[arg(long, value_name = "KEY", env = "RECKOMETER_PRIVATE_KEY")]
    pub private_key: Option<String>,

    /// Prompt for a private key at startup
    #[arg(long)]
    pub ask_key: bool,

    /// Keystore file to decrypt for signing
    #[arg(long, value_name = "FILE", env = "RECKOMETER_KEYSTORE")]
    pub keystore: Option<PathBuf>,

    /// Seconds between opportunistic event polls, 0 to disable
    #[arg(long, value_name = "SECONDS", env = "RECKOMETER_POLL_INTERVAL", default_value_t = 15)]
    pub poll_interval: u64,

    /// Turn debugging information on
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// File where to store history
    #[arg(long, value_name = "FILE", env = "RECKOMETER_HISTORY_FILE")]
    pub history_file: Option<PathBuf>,
}
