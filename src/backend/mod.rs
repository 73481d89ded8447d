pub mod http;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::board::AssignmentBatch;
use crate::error::BackendError;

pub use http::HttpBackend;

/// A member of the village as returned by the roster endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub member_id: i64,
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

/// A member eligible to lead a GBS group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderCandidate {
    pub leader_id: i64,
    pub name: String,
}

/// The attendance backend endpoints the board depends on
#[async_trait]
pub trait GroupBackend: Send + Sync {
    async fn fetch_village_members(&self, village_id: i64) -> Result<Vec<MemberSummary>, BackendError>;

    async fn fetch_leader_candidates(&self, village_id: i64) -> Result<Vec<LeaderCandidate>, BackendError>;

    async fn submit_assignments(&self, batch: &AssignmentBatch) -> Result<(), BackendError>;
}
