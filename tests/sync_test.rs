use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tokio::sync::{watch, Notify};

use reckometer::error::ClientError;
use reckometer::gateway::{CallMode, ContractGateway, ContractHandle, ProjectRow, ProjectRows};
use reckometer::session::WalletSession;
use reckometer::sync::Synchronizer;

#[derive(Default)]
struct MockContract {
    projects: Mutex<Vec<(String, String, u64)>>,
    fail_fetch: Mutex<Option<String>>,
    fail_write: Mutex<Option<String>>,
    misalign: Mutex<bool>,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockContract {
    fn with_projects(entries: &[(&str, &str, u64)]) -> Arc<Self> {
        let contract = MockContract::default();
        *contract.projects.lock().unwrap() = entries
            .iter()
            .map(|(n, d, s)| (n.to_string(), d.to_string(), *s))
            .collect();
        Arc::new(contract)
    }

    fn score_of(&self, name: &str) -> u64 {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, _, s)| *s)
            .unwrap()
    }
}

struct MockGateway {
    contract: Arc<MockContract>,
}

#[async_trait]
impl ContractGateway for MockGateway {
    async fn handle(
        &self,
        session: &WalletSession,
        mode: CallMode,
    ) -> Result<Box<dyn ContractHandle>, ClientError> {
        if session.wrong_network {
            return Err(ClientError::WrongNetwork);
        }
        if mode == CallMode::Send && session.address.is_none() {
            return Err(ClientError::ProviderMissing);
        }
        Ok(Box::new(MockHandle {
            contract: self.contract.clone(),
        }))
    }
}

struct MockHandle {
    contract: Arc<MockContract>,
}

#[async_trait]
impl ContractHandle for MockHandle {
    async fn get_all_projects(&self) -> Result<ProjectRows> {
        let gate = self.contract.fetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(msg) = self.contract.fail_fetch.lock().unwrap().clone() {
            bail!(msg);
        }
        let projects = self.contract.projects.lock().unwrap().clone();
        let mut rows = ProjectRows {
            names: projects.iter().map(|(n, _, _)| n.clone()).collect(),
            descriptions: projects.iter().map(|(_, d, _)| d.clone()).collect(),
            icon_urls: vec!["".to_string(); projects.len()],
            project_urls: vec!["".to_string(); projects.len()],
            reck_scores: projects.iter().map(|(_, _, s)| U256::from(*s)).collect(),
        };
        if *self.contract.misalign.lock().unwrap() {
            rows.reck_scores.pop();
        }
        Ok(rows)
    }

    async fn get_project(&self, project_id: u64) -> Result<ProjectRow> {
        let projects = self.contract.projects.lock().unwrap();
        let (name, description, score) = projects
            .get(project_id as usize - 1)
            .ok_or(anyhow!("no project {}", project_id))?
            .clone();
        Ok(ProjectRow {
            name,
            description,
            icon_url: "".to_string(),
            project_url: "".to_string(),
            reck_score: U256::from(score),
        })
    }

    async fn get_total_projects(&self) -> Result<u64> {
        Ok(self.contract.projects.lock().unwrap().len() as u64)
    }

    async fn add_project(&self, name: &str, description: &str) -> Result<()> {
        if let Some(msg) = self.contract.fail_write.lock().unwrap().clone() {
            bail!(msg);
        }
        self.contract
            .projects
            .lock()
            .unwrap()
            .push((name.to_string(), description.to_string(), 0));
        Ok(())
    }

    async fn increase_reck_score(&self, project_id: u64) -> Result<()> {
        if let Some(msg) = self.contract.fail_write.lock().unwrap().clone() {
            bail!(msg);
        }
        let mut projects = self.contract.projects.lock().unwrap();
        let entry = projects
            .get_mut(project_id as usize - 1)
            .ok_or(anyhow!("no project {}", project_id))?;
        entry.2 += 1;
        Ok(())
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(1)
    }

    async fn project_events(&self, _from_block: u64) -> Result<Vec<u64>> {
        Ok(Vec::new())
    }
}

fn _session(address: Option<Address>) -> (watch::Sender<WalletSession>, watch::Receiver<WalletSession>) {
    watch::channel(WalletSession {
        address,
        ..Default::default()
    })
}

fn _create_sync(contract: Arc<MockContract>, session: watch::Receiver<WalletSession>) -> Arc<Synchronizer> {
    Arc::new(Synchronizer::new(
        Arc::new(MockGateway { contract }),
        session,
    ))
}

fn _holder() -> Address {
    Address::repeat_byte(0x11)
}

async fn _wait_until(check: impl Fn() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_fetch_without_session_is_empty_and_clean() {
    let contract = MockContract::with_projects(&[("a", "x", 3)]);
    let (_tx, rx) = _session(None);
    let sync = _create_sync(contract, rx);

    sync.fetch_all().await.unwrap();

    let state = sync.snapshot();
    assert!(state.projects.is_empty());
    assert_eq!(state.error, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_fetch_sorts_descending_with_positional_ids() {
    let contract = MockContract::with_projects(&[("a", "x", 5), ("b", "x", 9), ("c", "x", 5), ("d", "x", 1)]);
    let (_tx, rx) = _session(Some(_holder()));
    let sync = _create_sync(contract, rx);

    sync.fetch_all().await.unwrap();

    let state = sync.snapshot();
    let names: Vec<_> = state.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a", "c", "d"]);
    let ids: Vec<_> = state.projects.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 1, 3, 4]);
    assert_eq!(state.error, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_add_then_refetch_roundtrip() {
    let contract = MockContract::with_projects(&[]);
    let (_tx, rx) = _session(Some(_holder()));
    let sync = _create_sync(contract, rx);

    sync.add_project("Foo", "Bar").await.unwrap();

    let state = sync.snapshot();
    assert!(!state.submitting);
    assert_eq!(state.error, None);
    let foo = state.projects.iter().find(|p| p.name == "Foo").unwrap();
    assert_eq!(foo.description, "Bar");
    assert_eq!(foo.reck_score, 0);
}

#[tokio::test]
async fn test_two_awaited_votes_increment_by_exactly_two() {
    let contract = MockContract::with_projects(&[("a", "x", 0)]);
    let (_tx, rx) = _session(Some(_holder()));
    let sync = _create_sync(contract.clone(), rx);

    sync.vote_for_project(1).await.unwrap();
    sync.vote_for_project(1).await.unwrap();

    assert_eq!(contract.score_of("a"), 2);
    let state = sync.snapshot();
    assert_eq!(state.projects[0].reck_score, 2);
    assert!(!state.submitting);
}

#[tokio::test]
async fn test_duplicate_add_leaves_collection_untouched() {
    let contract = MockContract::with_projects(&[("Existing", "x", 4)]);
    let (_tx, rx) = _session(Some(_holder()));
    let sync = _create_sync(contract.clone(), rx);
    sync.fetch_all().await.unwrap();
    let before = sync.snapshot().projects;

    *contract.fail_write.lock().unwrap() =
        Some("execution reverted: ProjectAlreadyExists(\"Existing\")".to_string());
    let err = sync.add_project("Existing", "x").await.unwrap_err();

    assert_eq!(err, ClientError::DuplicateProject);
    let state = sync.snapshot();
    assert!(!state.submitting);
    assert_eq!(state.error, Some(ClientError::DuplicateProject));
    assert_eq!(state.projects, before);
}

#[tokio::test]
async fn test_rejected_vote_is_classified() {
    let contract = MockContract::with_projects(&[("a", "x", 0)]);
    let (_tx, rx) = _session(Some(_holder()));
    let sync = _create_sync(contract.clone(), rx);

    *contract.fail_write.lock().unwrap() = Some("user rejected the request".to_string());
    let err = sync.vote_for_project(1).await.unwrap_err();

    assert_eq!(err, ClientError::TransactionRejected);
    assert_eq!(sync.snapshot().error, Some(ClientError::TransactionRejected));
    assert!(!sync.snapshot().submitting);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_collection() {
    let contract = MockContract::with_projects(&[("a", "x", 1)]);
    let (_tx, rx) = _session(Some(_holder()));
    let sync = _create_sync(contract.clone(), rx);
    sync.fetch_all().await.unwrap();

    *contract.fail_fetch.lock().unwrap() = Some("connection reset".to_string());
    let err = sync.fetch_all().await.unwrap_err();

    assert_eq!(err, ClientError::FetchFailed);
    let state = sync.snapshot();
    assert_eq!(state.error, Some(ClientError::FetchFailed));
    assert_eq!(state.projects.len(), 1);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_misaligned_columns_fail_the_fetch() {
    let contract = MockContract::with_projects(&[("a", "x", 1), ("b", "x", 2)]);
    *contract.misalign.lock().unwrap() = true;
    let (_tx, rx) = _session(Some(_holder()));
    let sync = _create_sync(contract, rx);

    let err = sync.fetch_all().await.unwrap_err();
    assert_eq!(err, ClientError::FetchFailed);
}

#[tokio::test]
async fn test_close_during_fetch_applies_nothing() {
    let contract = MockContract::with_projects(&[("a", "x", 1)]);
    let gate = Arc::new(Notify::new());
    *contract.fetch_gate.lock().unwrap() = Some(gate.clone());
    let (_tx, rx) = _session(Some(_holder()));
    let sync = _create_sync(contract, rx);

    let task = tokio::spawn({
        let sync = sync.clone();
        async move { sync.fetch_all().await }
    });
    {
        let sync = sync.clone();
        _wait_until(move || sync.snapshot().loading).await;
    }

    sync.close();
    let frozen = sync.snapshot();
    gate.notify_one();
    task.await.unwrap().unwrap();

    let state = sync.snapshot();
    assert_eq!(state, frozen);
    assert!(state.projects.is_empty());
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_session_transitions_drive_fetch_and_clear() {
    let contract = MockContract::with_projects(&[("a", "x", 1)]);
    let (tx, rx) = _session(None);
    let sync = _create_sync(contract, rx);
    tokio::spawn(sync.clone().run_session_watcher());

    tx.send_replace(WalletSession {
        address: Some(_holder()),
        ..Default::default()
    });
    {
        let sync = sync.clone();
        _wait_until(move || sync.snapshot().projects.len() == 1).await;
    }

    tx.send_replace(WalletSession::default());
    {
        let sync = sync.clone();
        _wait_until(move || sync.snapshot().projects.is_empty()).await;
    }
    assert_eq!(sync.snapshot().error, None);
}
