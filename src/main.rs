use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reckometer::config::{self, Config};
use reckometer::gateway::{ContractGateway, DisconnectedGateway, RpcGateway};
use reckometer::repl::{Cli, Repl};
use reckometer::session::SessionManager;
use reckometer::sync::Synchronizer;
use reckometer::wallet::{signer_from_key, signer_from_keystore, RpcWallet, WalletProvider};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = config::load_config_file()?;
    let config = Config::new(
        cli.rpc_url.clone(),
        cli.rpc_endpoints.as_deref(),
        cli.contract.as_deref(),
        cli.chain_id.as_deref(),
        cli.debug,
        file,
    )?;

    let default_filter = if config.debug {
        "reckometer=debug"
    } else {
        "reckometer=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let signer = if let Some(key) = &cli.private_key {
        Some(signer_from_key(Some(key))?)
    } else if cli.ask_key {
        Some(signer_from_key(None)?)
    } else if let Some(path) = &cli.keystore {
        Some(signer_from_keystore(path, None)?)
    } else {
        None
    };

    let wallet = match signer {
        Some(signer) => Some(Arc::new(RpcWallet::new(&config, Some(signer))?)),
        None => None,
    };
    let provider: Option<Arc<dyn WalletProvider>> = match &wallet {
        Some(wallet) => Some(wallet.clone()),
        None => None,
    };

    let session = Arc::new(SessionManager::new(provider.clone(), config.required_chain));
    let gateway: Arc<dyn ContractGateway> = match provider {
        Some(provider) => Arc::new(RpcGateway::new(provider, config.contract_address)),
        None => Arc::new(DisconnectedGateway),
    };
    let sync = Arc::new(Synchronizer::new(gateway.clone(), session.subscribe()));

    tokio::spawn(session.clone().run_chain_watcher());
    tokio::spawn(sync.clone().run_session_watcher());
    if cli.poll_interval > 0 {
        tokio::spawn(
            sync.clone()
                .run_event_watcher(Duration::from_secs(cli.poll_interval)),
        );
    }

    let mut repl = Repl::create(session, sync.clone(), gateway, wallet, config, &cli)?;
    repl.run().await;
    sync.close();

    Ok(())
}
