use std::collections::HashMap;

use super::types::{Assignment, AssignmentBatch, Board, Card, ColumnId};

/// Outcome of compiling a board for saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compiled {
    NothingToSave,
    Batch(AssignmentBatch),
}

/// Turns the completed column into one assignment per distinct leader label
///
/// Assignments come out in the order their label is first seen, walking cards
/// top to bottom and each card's labels in attachment order. Cards without a
/// label do not show up anywhere; a card carrying several labels joins every
/// one of those groups.
pub fn compile_assignments(board: &Board) -> Compiled {
    let completed = &board.column(ColumnId::Completed).cards;
    if completed.is_empty() {
        return Compiled::NothingToSave;
    }

    let mut assignments: Vec<Assignment> = Vec::new();
    // leader_id -> position in `assignments`
    let mut by_leader: HashMap<i64, usize> = HashMap::new();

    for card in completed {
        for label in &card.labels {
            match by_leader.get(&label.leader_id) {
                Some(&idx) => assignments[idx].member_ids.push(card.member_id),
                None => {
                    by_leader.insert(label.leader_id, assignments.len());
                    assignments.push(Assignment {
                        leader_id: label.leader_id,
                        leader_name: label.name.clone(),
                        member_ids: vec![card.member_id],
                        village_id: board.village_id,
                        term_start_date: board.start_date,
                        term_end_date: board.end_date,
                    });
                }
            }
        }
    }

    Compiled::Batch(AssignmentBatch {
        village_id: board.village_id,
        term_start_date: board.start_date,
        term_end_date: board.end_date,
        assignments,
    })
}

/// Completed cards that carry no label and will be left out of a save
pub fn unlabeled_completed(board: &Board) -> Vec<&Card> {
    board
        .column(ColumnId::Completed)
        .cards
        .iter()
        .filter(|c| c.labels.is_empty())
        .collect()
}
