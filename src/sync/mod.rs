use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{classify_write_error, ClientError};
use crate::gateway::{CallMode, ContractGateway};
use crate::session::WalletSession;

mod project;

pub use project::{collect_projects, Project, SyncState};

/// Reconciles the local project collection with the contract. The contract
/// is the sole source of truth: every successful fetch replaces the whole
/// collection, so overlapping fetches race freely and the last one wins.
pub struct Synchronizer {
    gateway: Arc<dyn ContractGateway>,
    session: watch::Receiver<WalletSession>,
    state: watch::Sender<SyncState>,
    closed: AtomicBool,
}

impl Synchronizer {
    pub fn new(gateway: Arc<dyn ContractGateway>, session: watch::Receiver<WalletSession>) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Synchronizer {
            gateway,
            session,
            state,
            closed: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// After this, in-flight operations still run to completion but none of
    /// their resolutions are applied.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn publish(&self, apply: impl FnOnce(&mut SyncState)) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        self.state.send_modify(apply);
    }

    /// Replaces the collection with a fresh snapshot from the contract.
    /// Without a wallet session this is a no-op yielding an empty collection
    /// and no error. Failures are recorded as `FetchFailed` and returned;
    /// there is no automatic retry.
    pub async fn fetch_all(&self) -> Result<(), ClientError> {
        let session = self.session.borrow().clone();
        if session.address.is_none() {
            self.publish(|s| {
                s.projects = Vec::new();
                s.loading = false;
                s.error = None;
            });
            return Ok(());
        }

        self.publish(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.do_fetch(&session).await {
            Ok(projects) => {
                debug!(count = projects.len(), "project collection replaced");
                self.publish(|s| {
                    s.projects = projects;
                    s.loading = false;
                });
                Ok(())
            }
            Err(err) => {
                self.publish(|s| {
                    s.loading = false;
                    s.error = Some(err.clone());
                });
                Err(err)
            }
        }
    }

    async fn do_fetch(&self, session: &WalletSession) -> Result<Vec<Project>, ClientError> {
        let handle = self.gateway.handle(session, CallMode::Call).await?;
        let rows = handle.get_all_projects().await.map_err(|err| {
            warn!(%err, "bulk project read failed");
            ClientError::FetchFailed
        })?;
        collect_projects(rows).map_err(|err| {
            warn!(%err, "malformed project data");
            ClientError::FetchFailed
        })
    }

    /// Submits a new project and resynchronizes once the transaction has
    /// confirmed. The error is recorded in state *and* returned, so callers
    /// can keep their own surface open on failure.
    pub async fn add_project(&self, name: &str, description: &str) -> Result<(), ClientError> {
        self.publish(|s| {
            s.submitting = true;
            s.error = None;
        });
        let result = self.do_add(name, description).await;
        self.publish(|s| s.submitting = false);
        if let Err(err) = &result {
            self.publish(|s| s.error = Some(err.clone()));
        }
        result
    }

    async fn do_add(&self, name: &str, description: &str) -> Result<(), ClientError> {
        let session = self.session.borrow().clone();
        let handle = self.gateway.handle(&session, CallMode::Send).await?;
        handle.add_project(name, description).await.map_err(|err| {
            warn!(%err, name, "addProject failed");
            classify_write_error(&err)
        })?;
        info!(name, "project added");
        self.fetch_all().await
    }

    /// Casts one vote. Idempotence and per-holder limits, if any, live in
    /// the contract: two awaited calls increment the score by exactly two.
    pub async fn vote_for_project(&self, project_id: u64) -> Result<(), ClientError> {
        self.publish(|s| {
            s.submitting = true;
            s.error = None;
        });
        let result = self.do_vote(project_id).await;
        self.publish(|s| s.submitting = false);
        if let Err(err) = &result {
            self.publish(|s| s.error = Some(err.clone()));
        }
        result
    }

    async fn do_vote(&self, project_id: u64) -> Result<(), ClientError> {
        let session = self.session.borrow().clone();
        let handle = self.gateway.handle(&session, CallMode::Send).await?;
        handle.increase_reck_score(project_id).await.map_err(|err| {
            warn!(%err, project_id, "increaseReckScore failed");
            classify_write_error(&err)
        })?;
        info!(project_id, "vote recorded");
        self.fetch_all().await
    }

    /// Resynchronizes whenever the wallet session transitions into a valid,
    /// correctly-networked state, and clears the collection when it leaves
    /// one. No timer-based refresh.
    pub async fn run_session_watcher(self: Arc<Self>) {
        let mut session_rx = self.session.clone();
        let mut was_connected = false;
        loop {
            let connected = session_rx.borrow_and_update().is_connected();
            if connected && !was_connected {
                if let Err(err) = self.fetch_all().await {
                    warn!(%err, "initial project fetch failed");
                }
            } else if !connected && was_connected {
                self.publish(|s| {
                    s.projects = Vec::new();
                    s.error = None;
                });
            }
            was_connected = connected;
            if session_rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Opportunistic refetch driven by contract events, polled from logs.
    pub async fn run_event_watcher(self: Arc<Self>, poll_interval: Duration) {
        let mut last_block: Option<u64> = None;
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.closed.load(Ordering::SeqCst) {
                break;
            }
            let session = self.session.borrow().clone();
            if !session.is_connected() {
                last_block = None;
                continue;
            }
            match self.poll_events(&session, &mut last_block).await {
                Ok(true) => {
                    debug!("project events seen, refetching");
                    let _ = self.fetch_all().await;
                }
                Ok(false) => {}
                Err(err) => debug!(%err, "event poll failed"),
            }
        }
    }

    async fn poll_events(
        &self,
        session: &WalletSession,
        last_block: &mut Option<u64>,
    ) -> anyhow::Result<bool> {
        let handle = self
            .gateway
            .handle(session, CallMode::Call)
            .await
            .map_err(anyhow::Error::new)?;
        let tip = handle.block_number().await?;
        let from_block = match *last_block {
            Some(block) => block + 1,
            None => {
                // First poll only establishes the watermark.
                *last_block = Some(tip);
                return Ok(false);
            }
        };
        if from_block > tip {
            return Ok(false);
        }
        let blocks = handle.project_events(from_block).await?;
        *last_block = Some(tip);
        Ok(!blocks.is_empty())
    }
}
