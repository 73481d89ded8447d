use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;

use crate::backend::GroupBackend;
use crate::board::{
    compile_assignments, Board, BoardStore, ColorSource, ColumnId, Compiled, DragSession, LabelOutcome,
};
use crate::error::BoardError;

/// Which loader a notice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadTarget {
    Members,
    LeaderCandidates,
}

/// User-facing notification produced by loads and saves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    LoadFailed { target: LoadTarget, message: String },
    NothingToSave,
    SaveInProgress,
    Saved { groups: usize },
    SaveFailed { message: String },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::LoadFailed { .. } | Notice::SaveFailed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub ready: bool,
    pub notices: Vec<Notice>,
}

/// One open assignment board together with the backend it loads from and saves to
pub struct BoardSession {
    village_id: i64,
    backend: Arc<dyn GroupBackend>,
    store: Mutex<BoardStore>,
    colors: Mutex<Box<dyn ColorSource + Send>>,
    saving: AtomicBool,
}

impl BoardSession {
    pub fn new(
        village_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        backend: Arc<dyn GroupBackend>,
        colors: Box<dyn ColorSource + Send>,
    ) -> Self {
        Self {
            village_id,
            backend,
            store: Mutex::new(BoardStore::new(village_id, start_date, end_date)),
            colors: Mutex::new(colors),
            saving: AtomicBool::new(false),
        }
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, BoardStore>, BoardError> {
        self.store.lock().map_err(|_| BoardError::LockPoisoned)
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut BoardStore) -> T) -> Result<T, BoardError> {
        let mut store = self.lock_store()?;
        Ok(f(&mut store))
    }

    /// Fetches the roster and the leader candidates concurrently and seeds the board
    ///
    /// Each loader is applied on its own: when one fails the other's data is kept
    /// and a `LoadFailed` notice is returned. Nothing is retried.
    pub async fn load(&self) -> Result<LoadReport, BoardError> {
        let (members, leaders) = tokio::join!(
            self.backend.fetch_village_members(self.village_id),
            self.backend.fetch_leader_candidates(self.village_id),
        );

        let mut notices = Vec::new();
        let mut store = self.lock_store()?;

        match members {
            Ok(members) => store.load_members(&members),
            Err(e) => {
                warn!("Loading members for village {} failed: {}", self.village_id, e);
                notices.push(Notice::LoadFailed {
                    target: LoadTarget::Members,
                    message: e.to_string(),
                });
            }
        }

        match leaders {
            Ok(leaders) => {
                let mut colors = self.colors.lock().map_err(|_| BoardError::LockPoisoned)?;
                store.load_leaders(&leaders, &mut **colors);
            }
            Err(e) => {
                warn!("Loading leader candidates for village {} failed: {}", self.village_id, e);
                notices.push(Notice::LoadFailed {
                    target: LoadTarget::LeaderCandidates,
                    message: e.to_string(),
                });
            }
        }

        debug!(
            "Village {} board holds {} cards {:?} and {} labels",
            self.village_id,
            store.card_count(),
            store.columns().iter().map(|c| c.cards.len()).collect::<Vec<_>>(),
            store.labels().len()
        );

        Ok(LoadReport {
            ready: store.is_ready(),
            notices,
        })
    }

    /// Compiles the completed column and submits it
    ///
    /// The board itself is never touched, so a failed save can simply be retried.
    /// While one save is in flight any further call returns `SaveInProgress`.
    pub async fn save(&self) -> Result<Notice, BoardError> {
        if self
            .saving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Save for village {} already pending", self.village_id);
            return Ok(Notice::SaveInProgress);
        }

        let _guard = SavingGuard(&self.saving);
        self.submit_snapshot().await
    }

    async fn submit_snapshot(&self) -> Result<Notice, BoardError> {
        let board = self.snapshot()?;

        let batch = match compile_assignments(&board) {
            Compiled::NothingToSave => {
                info!("Nothing to save for village {}", self.village_id);
                return Ok(Notice::NothingToSave);
            }
            Compiled::Batch(batch) => batch,
        };

        if !board.has_valid_period() {
            warn!(
                "Saving village {} with term {} .. {} (start is not before end)",
                self.village_id, board.start_date, board.end_date
            );
        }

        let groups = batch.assignments.len();
        match self.backend.submit_assignments(&batch).await {
            Ok(()) => {
                info!("Saved {} GBS groups for village {}", groups, self.village_id);
                Ok(Notice::Saved { groups })
            }
            Err(e) => {
                warn!("Saving GBS groups for village {} failed: {}", self.village_id, e);
                Ok(Notice::SaveFailed {
                    message: e.to_string(),
                })
            }
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    pub fn is_ready(&self) -> Result<bool, BoardError> {
        self.with_store(|store| store.is_ready())
    }

    pub fn snapshot(&self) -> Result<Board, BoardError> {
        self.with_store(|store| store.board().clone())
    }

    pub fn move_card(
        &self,
        source: ColumnId,
        dest: ColumnId,
        source_index: usize,
        dest_index: usize,
    ) -> Result<bool, BoardError> {
        self.with_store(|store| store.move_card(source, dest, source_index, dest_index))
    }

    pub fn hover_card(&self, session: &DragSession, over: ColumnId) -> Result<Option<DragSession>, BoardError> {
        self.with_store(|store| store.hover_card(session, over))
    }

    pub fn drop_card(&self, session: &DragSession, dest_index: usize) -> Result<bool, BoardError> {
        self.with_store(|store| store.drop_card(session, dest_index))
    }

    pub fn add_label_to_card(&self, card_id: &str, label_id: i64) -> Result<LabelOutcome, BoardError> {
        self.with_store(|store| store.add_label_to_card(card_id, label_id))
    }

    pub fn remove_label_from_card(&self, card_id: &str, label_id: i64) -> Result<bool, BoardError> {
        self.with_store(|store| store.remove_label_from_card(card_id, label_id))
    }

    pub fn set_period(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<(), BoardError> {
        self.with_store(|store| store.set_period(start_date, end_date))
    }
}

/// Clears the in-flight save flag when dropped, including when the save future is cancelled
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
