use thiserror::Error;

/// Everything that can go wrong between the UI and the contract, reduced to
/// the conditions the holder can act on. Remote failures are classified at
/// the session/synchronizer boundary; nothing here is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("no wallet signer loaded; restart with --private-key or --keystore")]
    ProviderMissing,
    #[error("wrong network; switch to the required chain and reconnect")]
    WrongNetwork,
    #[error("failed to connect wallet")]
    ConnectFailed,
    #[error("transaction rejected by the signer")]
    TransactionRejected,
    #[error("a project with this name already exists")]
    DuplicateProject,
    #[error("failed to fetch projects")]
    FetchFailed,
    #[error("failed to submit transaction")]
    WriteFailed,
}

/// Marker the contract reverts with on a name collision.
const DUPLICATE_MARKER: &str = "projectalreadyexists";
const REJECTION_MARKERS: &[&str] = &["rejected", "denied", "cancelled"];

/// Maps a transport-level write failure onto the taxonomy by inspecting the
/// formatted error chain, the same markers the contract and signers emit.
pub fn classify_write_error(err: &anyhow::Error) -> ClientError {
    let chain = format!("{:#}", err).to_lowercase();
    if chain.contains(DUPLICATE_MARKER) {
        ClientError::DuplicateProject
    } else if REJECTION_MARKERS.iter().any(|m| chain.contains(m)) {
        ClientError::TransactionRejected
    } else {
        ClientError::WriteFailed
    }
}
