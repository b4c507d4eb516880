use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;

use super::cli::{Cli, RECKOMETER_VERSION};
use super::config::history_file;
use super::helper::{create_editor, MyHelper};
use super::parsing::{parse_command, Command};
use crate::config::Config;
use crate::error::ClientError;
use crate::gateway::{CallMode, ContractGateway};
use crate::session::SessionManager;
use crate::sync::{Project, Synchronizer};
use crate::wallet::RpcWallet;

pub struct Repl {
    rl: Editor<MyHelper, FileHistory>,
    session: Arc<SessionManager>,
    sync: Arc<Synchronizer>,
    gateway: Arc<dyn ContractGateway>,
    wallet: Option<Arc<RpcWallet>>,
    config: Config,
    history_file: Option<PathBuf>,
}

impl Repl {
    pub fn create(
        session: Arc<SessionManager>,
        sync: Arc<Synchronizer>,
        gateway: Arc<dyn ContractGateway>,
        wallet: Option<Arc<RpcWallet>>,
        config: Config,
        cli: &Cli,
    ) -> Result<Self> {
        let endpoints = wallet
            .as_ref()
            .map(|w| w.endpoint_names())
            .unwrap_or_default();
        let rl = create_editor(endpoints)?;
        let history_file = cli.history_file.clone().or(history_file());
        Ok(Repl {
            rl,
            session,
            sync,
            gateway,
            wallet,
            config,
            history_file,
        })
    }

    pub async fn run(&mut self) {
        if let Some(history_file) = &self.history_file {
            let _ = self.rl.load_history(history_file);
        }
        println!(
            "{} | contract {} on chain 0x{:x}",
            RECKOMETER_VERSION, self.config.contract_address, self.config.required_chain
        );
        println!("Type `help` for commands.");

        self.run_repl().await;

        if let Some(history_file) = &self.history_file {
            let _ = self.rl.save_history(&history_file);
        }
    }

    async fn run_repl(&mut self) {
        loop {
            let p = "reck> ";
            self.rl
                .helper_mut()
                .expect("No helper")
                .set_prompt(&format!("\x1b[1;32m{p}\x1b[0m"));
            let readline = self.rl.readline(p);
            match readline {
                Ok(line) => {
                    if self.process_line(line.trim()).await {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }
    }

    /// Returns true when the loop should exit.
    async fn process_line(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        match parse_command(line) {
            Ok(Command::Quit) => true,
            Ok(command) => {
                if let Err(err) = self.dispatch(command).await {
                    println!("Error: {:#}", err);
                }
                false
            }
            Err(err) => {
                println!("Error: {:#}", err);
                false
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Connect => self.connect().await,
            Command::Disconnect => {
                self.session.disconnect();
                println!("Disconnected.");
                Ok(())
            }
            Command::Account => {
                self.print_account();
                Ok(())
            }
            Command::Projects { filter } => {
                self.print_projects(filter.as_deref());
                Ok(())
            }
            Command::Refresh => self.refresh().await,
            Command::Show { project_id } => self.show_project(project_id).await,
            Command::Total => self.show_total().await,
            Command::Add { name, description } => self.add_project(&name, &description).await,
            Command::Vote { project_id } => self.vote(project_id).await,
            Command::Network { endpoint } => self.network(endpoint.as_deref()).await,
            Command::Help => {
                print_help();
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    async fn connect(&self) -> Result<()> {
        match self.session.connect().await {
            Ok(address) => {
                println!("Connected as {}", address);
                let _ = self.sync.fetch_all().await;
                self.print_projects(None);
                Ok(())
            }
            Err(ClientError::WrongNetwork) => {
                self.print_network_prompt();
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn refresh(&self) -> Result<()> {
        self.sync.fetch_all().await?;
        self.print_projects(None);
        Ok(())
    }

    async fn add_project(&self, name: &str, description: &str) -> Result<()> {
        if self.sync.snapshot().submitting {
            bail!("a submission is already in flight");
        }
        match self.sync.add_project(name, description).await {
            Ok(()) => {
                println!("Project added.");
                self.print_projects(None);
                Ok(())
            }
            Err(ClientError::WrongNetwork) => {
                self.print_network_prompt();
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn vote(&self, project_id: u64) -> Result<()> {
        if self.sync.snapshot().submitting {
            bail!("a submission is already in flight");
        }
        match self.sync.vote_for_project(project_id).await {
            Ok(()) => {
                println!("Vote recorded.");
                self.print_projects(None);
                Ok(())
            }
            Err(ClientError::WrongNetwork) => {
                self.print_network_prompt();
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn show_project(&self, project_id: u64) -> Result<()> {
        let session = self.session.snapshot();
        let handle = self.gateway.handle(&session, CallMode::Call).await?;
        let row = handle.get_project(project_id).await?;
        println!("#{} {} ({} REKT)", project_id, row.name, row.reck_score);
        println!("  {}", row.description);
        if !row.project_url.is_empty() {
            println!("  {}", row.project_url);
        }
        if !row.icon_url.is_empty() {
            println!("  icon: {}", row.icon_url);
        }
        Ok(())
    }

    async fn show_total(&self) -> Result<()> {
        let session = self.session.snapshot();
        let handle = self.gateway.handle(&session, CallMode::Call).await?;
        println!("{} projects on the board.", handle.get_total_projects().await?);
        Ok(())
    }

    async fn network(&self, endpoint: Option<&str>) -> Result<()> {
        let Some(wallet) = &self.wallet else {
            bail!("no wallet loaded");
        };
        match endpoint {
            None => {
                println!("active: {}", wallet.active_url());
                for (name, url) in wallet.endpoints() {
                    println!("  {} = {}", name, url);
                }
                Ok(())
            }
            Some(name) => {
                let chain = wallet.use_endpoint(name).await?;
                println!("Switched to {} (chain 0x{:x}).", name, chain);
                if chain != self.config.required_chain {
                    self.print_network_prompt();
                }
                Ok(())
            }
        }
    }

    fn print_account(&self) {
        let session = self.session.snapshot();
        match session.address {
            Some(address) => println!("Connected as {}", address),
            None if session.connecting => println!("Connecting..."),
            None => println!("Not connected."),
        }
        if let Some(err) = &session.error {
            println!("! {}", err);
        }
        if session.wrong_network {
            self.print_network_prompt();
        }
    }

    fn print_projects(&self, filter: Option<&str>) {
        let state = self.sync.snapshot();
        if let Some(err) = &state.error {
            println!("! {}", err);
        }
        if state.loading {
            println!("(refreshing...)");
        }
        let projects: Vec<&Project> = match filter {
            Some(filter) => state.projects.iter().filter(|p| p.matches(filter)).collect(),
            None => state.projects.iter().collect(),
        };
        if projects.is_empty() {
            println!("No projects.");
            return;
        }
        println!("{:>4}  {:>4}  {:<24}  DESCRIPTION", "ID", "REKT", "NAME");
        for project in projects {
            let lines = wrap_description(&project.description);
            let (first, rest) = match lines.split_first() {
                Some((first, rest)) => (first.as_str(), rest),
                None => ("", &[][..]),
            };
            println!(
                "{:>4}  {:>4}  {:<24}  {}",
                project.id, project.reck_score, project.name, first
            );
            for line in rest {
                println!("{:38}{}", "", line);
            }
            if let Some(url) = &project.project_url {
                println!("{:38}{}", "", url);
            }
        }
    }

    fn print_network_prompt(&self) {
        println!("! Wrong network.");
        println!(
            "  Reckometer lives on chain 0x{:x}.",
            self.config.required_chain
        );
        println!(
            "  Join it through the gateway at {} and run `connect` again,",
            self.config.gateway_url
        );
        println!("  or configure an endpoint for it and run `network <name>`.");
    }
}

fn wrap_description(description: &str) -> Vec<String> {
    let width = textwrap::termwidth().saturating_sub(38).max(24);
    textwrap::wrap(description, width)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

fn print_help() {
    println!("Commands:");
    println!("  connect                     request the wallet and validate the network");
    println!("  disconnect                  forget the session (local only)");
    println!("  account                     show the connected address");
    println!("  projects [filter]           list projects, optionally filtered");
    println!("  show <id>                   one project's details");
    println!("  total                       number of projects on the board");
    println!("  add <name> <description>    submit a project (quote multi-word names)");
    println!("  vote <id>                   REKT a project");
    println!("  refresh                     refetch the project list");
    println!("  network [name]              list endpoints or switch to one");
    println!("  quit                        exit");
}
