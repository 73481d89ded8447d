use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One of the three workflow stages a card can sit in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnId {
    Waiting,
    Pending,
    Completed,
}

impl ColumnId {
    /// Display order of the columns on the board
    pub const ALL: [ColumnId; 3] = [ColumnId::Waiting, ColumnId::Pending, ColumnId::Completed];

    pub fn index(self) -> usize {
        match self {
            ColumnId::Waiting => 0,
            ColumnId::Pending => 1,
            ColumnId::Completed => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ColumnId::Waiting => "Waiting",
            ColumnId::Pending => "Pending",
            ColumnId::Completed => "Completed",
        }
    }
}

/// A leader candidate that can be attached to cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub leader_id: i64,
    pub color: String,
}

/// A draggable member on the board
///
/// `id` is generated when the board is seeded and is never the member id, so the
/// same member could show up on more than one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub member_id: i64,
    pub member_name: String,
    pub birth_date: Option<NaiveDate>,
    pub labels: Vec<Label>,
}

impl Card {
    pub fn has_label(&self, label_id: i64) -> bool {
        self.labels.iter().any(|l| l.id == label_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub cards: Vec<Card>,
}

impl Column {
    pub fn empty(id: ColumnId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            cards: Vec::new(),
        }
    }
}

/// Aggregate root: the three columns, the available labels and the term bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub village_id: i64,
    pub columns: [Column; 3],
    pub labels: Vec<Label>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Board {
    pub fn new(village_id: i64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            village_id,
            columns: ColumnId::ALL.map(Column::empty),
            labels: Vec::new(),
            start_date,
            end_date,
        }
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.index()]
    }

    pub fn label(&self, label_id: i64) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == label_id)
    }

    /// Locates a card by id: (column, index)
    pub fn find_card(&self, card_id: &str) -> Option<(ColumnId, usize)> {
        self.columns.iter().find_map(|column| {
            column
                .cards
                .iter()
                .position(|c| c.id == card_id)
                .map(|idx| (column.id, idx))
        })
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }

    pub fn has_valid_period(&self) -> bool {
        self.start_date < self.end_date
    }
}

/// One leader's group as produced by the compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub leader_id: i64,
    pub leader_name: String,
    pub member_ids: Vec<i64>,
    pub village_id: i64,
    pub term_start_date: NaiveDate,
    pub term_end_date: NaiveDate,
}

/// Request body submitted to the backend on save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentBatch {
    pub village_id: i64,
    pub term_start_date: NaiveDate,
    pub term_end_date: NaiveDate,
    pub assignments: Vec<Assignment>,
}

/// What a UI layer knows about an in-flight drag gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSession {
    pub card_id: String,
    pub source_column_id: ColumnId,
    pub source_index: usize,
}

/// Result of attaching a label to a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelOutcome {
    Added,
    AlreadyAssigned,
    UnknownCard,
    UnknownLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_ids_serialize_lowercase() {
        let json = serde_json::to_string(&ColumnId::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let parsed: ColumnId = serde_json::from_str("\"waiting\"").unwrap();
        assert_eq!(parsed, ColumnId::Waiting);
    }

    #[test]
    fn new_board_has_three_empty_columns_in_order() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap();
        let board = Board::new(7, start, end);

        let ids: Vec<ColumnId> = board.columns.iter().map(|c| c.id).collect();
        assert_eq!(ids, ColumnId::ALL.to_vec());
        assert_eq!(board.columns[2].title, "Completed");
        assert_eq!(board.card_count(), 0);
        assert!(board.has_valid_period());
    }

    #[test]
    fn batch_serializes_camel_case() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let batch = AssignmentBatch {
            village_id: 3,
            term_start_date: day,
            term_end_date: day,
            assignments: vec![],
        };
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["villageId"], 3);
        assert_eq!(value["termStartDate"], "2024-03-01");
    }
}
