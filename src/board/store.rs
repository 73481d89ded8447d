use chrono::NaiveDate;
use log::debug;
use uuid::Uuid;

use crate::backend::{LeaderCandidate, MemberSummary};
use super::palette::ColorSource;
use super::types::{Board, Card, Column, ColumnId, Label, LabelOutcome};

/// Authoritative in-memory state of one assignment board
///
/// Every mutation is computed against a copy of the columns and swapped in whole,
/// so a rejected operation never leaves a half-applied move behind.
#[derive(Debug, Clone)]
pub struct BoardStore {
    board: Board,
    members_loaded: bool,
    leaders_loaded: bool,
}

impl BoardStore {
    pub fn new(village_id: i64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            board: Board::new(village_id, start_date, end_date),
            members_loaded: false,
            leaders_loaded: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn columns(&self) -> &[Column; 3] {
        &self.board.columns
    }

    pub fn labels(&self) -> &[Label] {
        &self.board.labels
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        self.board.column(id)
    }

    pub fn card_count(&self) -> usize {
        self.board.card_count()
    }

    /// True once both the member roster and the leader candidates have been loaded
    pub fn is_ready(&self) -> bool {
        self.members_loaded && self.leaders_loaded
    }

    /// Seeds the waiting column with one fresh card per member
    pub fn load_members(&mut self, members: &[MemberSummary]) {
        let mut columns = ColumnId::ALL.map(Column::empty);
        columns[ColumnId::Waiting.index()].cards = members
            .iter()
            .map(|m| Card {
                id: Uuid::new_v4().to_string(),
                member_id: m.member_id,
                member_name: m.name.clone(),
                birth_date: m.birth_date,
                labels: Vec::new(),
            })
            .collect();

        self.board.columns = columns;
        self.members_loaded = true;
        debug!(
            "Seeded {} cards for village {}",
            members.len(),
            self.board.village_id
        );
    }

    /// Generates one label per leader candidate
    pub fn load_leaders(&mut self, candidates: &[LeaderCandidate], colors: &mut dyn ColorSource) {
        self.board.labels = candidates
            .iter()
            .map(|c| Label {
                id: c.leader_id,
                name: c.name.clone(),
                leader_id: c.leader_id,
                color: colors.next_color().to_string(),
            })
            .collect();
        self.leaders_loaded = true;
        debug!(
            "Generated {} labels for village {}",
            candidates.len(),
            self.board.village_id
        );
    }

    /// Moves the card at `source_index` of `source` to `dest_index` of `dest`
    ///
    /// Returns false and leaves the board untouched when either index is out of range.
    pub fn move_card(
        &mut self,
        source: ColumnId,
        dest: ColumnId,
        source_index: usize,
        dest_index: usize,
    ) -> bool {
        let mut columns = self.board.columns.clone();

        let source_cards = &mut columns[source.index()].cards;
        if source_index >= source_cards.len() {
            debug!("Ignoring move from {:?}[{}]: no such card", source, source_index);
            return false;
        }
        let card = source_cards.remove(source_index);

        let dest_cards = &mut columns[dest.index()].cards;
        if dest_index > dest_cards.len() {
            debug!("Ignoring move to {:?}[{}]: index out of range", dest, dest_index);
            return false;
        }
        dest_cards.insert(dest_index, card);

        self.board.columns = columns;
        true
    }

    /// Attaches a label to the card with `card_id`, wherever it currently sits
    pub fn add_label_to_card(&mut self, card_id: &str, label_id: i64) -> LabelOutcome {
        let Some(label) = self.board.label(label_id).cloned() else {
            return LabelOutcome::UnknownLabel;
        };
        let Some(card) = self.card_mut(card_id) else {
            return LabelOutcome::UnknownCard;
        };

        if card.has_label(label_id) {
            return LabelOutcome::AlreadyAssigned;
        }
        card.labels.push(label);
        LabelOutcome::Added
    }

    /// Detaches a label; returns false when the card or label was not there
    pub fn remove_label_from_card(&mut self, card_id: &str, label_id: i64) -> bool {
        let Some(card) = self.card_mut(card_id) else {
            return false;
        };
        let before = card.labels.len();
        card.labels.retain(|l| l.id != label_id);
        card.labels.len() != before
    }

    pub fn set_period(&mut self, start_date: NaiveDate, end_date: NaiveDate) {
        self.board.start_date = start_date;
        self.board.end_date = end_date;
    }

    fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.board
            .columns
            .iter_mut()
            .flat_map(|column| column.cards.iter_mut())
            .find(|card| card.id == card_id)
    }
}
