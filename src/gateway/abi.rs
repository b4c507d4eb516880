use alloy::{
    json_abi::JsonAbi,
    primitives::{keccak256, B256},
};
use lazy_static::lazy_static;

/// Human-readable interface of the Reckometer contract.
pub const RECKOMETER_ABI: &[&str] = &[
    "function getAllProjects() view returns (string[], string[], string[], string[], uint256[])",
    "function getProject(uint256 projectId) view returns (string, string, string, string, uint256)",
    "function addProject(string name, string description)",
    "function increaseReckScore(uint256 projectId)",
    "function getTotalProjects() view returns (uint256)",
    "event ProjectAdded(uint256 indexed projectId)",
    "event ReckScoreIncreased(uint256 indexed projectId)",
];

lazy_static! {
    pub static ref ABI: JsonAbi =
        JsonAbi::parse(RECKOMETER_ABI.iter().copied()).expect("reckometer abi");
    pub static ref PROJECT_ADDED_TOPIC: B256 = keccak256(b"ProjectAdded(uint256)");
    pub static ref RECK_SCORE_INCREASED_TOPIC: B256 = keccak256(b"ReckScoreIncreased(uint256)");
}
