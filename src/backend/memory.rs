use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{GroupBackend, LeaderCandidate, MemberSummary};
use crate::board::AssignmentBatch;
use crate::error::BackendError;

/// In-memory backend for tests; records every submitted batch
#[derive(Default)]
pub struct MemoryBackend {
    pub members: Vec<MemberSummary>,
    pub leaders: Vec<LeaderCandidate>,
    pub fail_members: AtomicBool,
    pub fail_leaders: AtomicBool,
    pub fail_submit: AtomicBool,
    pub submit_delay: Option<Duration>,
    submit_calls: AtomicUsize,
    submissions: Mutex<Vec<AssignmentBatch>>,
}

impl MemoryBackend {
    pub fn new(members: Vec<MemberSummary>, leaders: Vec<LeaderCandidate>) -> Self {
        Self {
            members,
            leaders,
            ..Default::default()
        }
    }

    /// Number of submit attempts, failed ones included
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<AssignmentBatch> {
        self.submissions.lock().unwrap().clone()
    }

    fn failure(what: &str) -> BackendError {
        BackendError::Status {
            url: format!("memory://{}", what),
            status: 500,
            body: "induced failure".to_string(),
        }
    }
}

#[async_trait]
impl GroupBackend for MemoryBackend {
    async fn fetch_village_members(&self, _village_id: i64) -> Result<Vec<MemberSummary>, BackendError> {
        if self.fail_members.load(Ordering::SeqCst) {
            return Err(Self::failure("members"));
        }
        Ok(self.members.clone())
    }

    async fn fetch_leader_candidates(&self, _village_id: i64) -> Result<Vec<LeaderCandidate>, BackendError> {
        if self.fail_leaders.load(Ordering::SeqCst) {
            return Err(Self::failure("leader-candidates"));
        }
        Ok(self.leaders.clone())
    }

    async fn submit_assignments(&self, batch: &AssignmentBatch) -> Result<(), BackendError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(Self::failure("assignments"));
        }
        self.submissions.lock().unwrap().push(batch.clone());
        Ok(())
    }
}
