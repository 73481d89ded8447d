use log::debug;

use super::store::BoardStore;
use super::types::{ColumnId, DragSession};

impl BoardStore {
    /// Handles a card hovering over a column during a drag
    ///
    /// A different column pulls the card to its head; the card's own column is a no-op.
    /// The card is located by id rather than trusting the session's column and
    /// index, so a hover event that fires twice for one gesture only moves once.
    /// Returns the updated session when the card moved.
    pub fn hover_card(&mut self, session: &DragSession, over: ColumnId) -> Option<DragSession> {
        let (column, index) = self.board().find_card(&session.card_id)?;

        if column != session.source_column_id || index != session.source_index {
            debug!(
                "Drag session for card {} is stale ({:?}[{}] vs {:?}[{}])",
                session.card_id, session.source_column_id, session.source_index, column, index
            );
        }

        if column == over {
            return None;
        }

        if !self.move_card(column, over, index, 0) {
            return None;
        }

        Some(DragSession {
            card_id: session.card_id.clone(),
            source_column_id: over,
            source_index: 0,
        })
    }

    /// Finishes a drag by reordering the card inside the column it now sits in
    pub fn drop_card(&mut self, session: &DragSession, dest_index: usize) -> bool {
        let Some((column, index)) = self.board().find_card(&session.card_id) else {
            return false;
        };
        if index == dest_index {
            return false;
        }
        self.move_card(column, column, index, dest_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::store::tests::seeded_store;

    fn start_drag(store: &BoardStore, column: ColumnId, index: usize) -> DragSession {
        DragSession {
            card_id: store.column(column).cards[index].id.clone(),
            source_column_id: column,
            source_index: index,
        }
    }

    #[test]
    fn hover_over_other_column_inserts_at_head() {
        let mut store = seeded_store(4, &[]);
        store.move_card(ColumnId::Waiting, ColumnId::Pending, 0, 0);
        store.move_card(ColumnId::Waiting, ColumnId::Pending, 0, 1);
        let pending_before: Vec<String> = store
            .column(ColumnId::Pending)
            .cards
            .iter()
            .map(|c| c.id.clone())
            .collect();

        let session = start_drag(&store, ColumnId::Waiting, 1);
        let updated = store.hover_card(&session, ColumnId::Pending).unwrap();

        assert_eq!(updated.source_column_id, ColumnId::Pending);
        assert_eq!(updated.source_index, 0);
        assert_eq!(store.column(ColumnId::Waiting).cards.len(), 1);

        let pending_after: Vec<String> = store
            .column(ColumnId::Pending)
            .cards
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(pending_after[0], session.card_id);
        assert_eq!(&pending_after[1..], &pending_before[..]);
    }

    #[test]
    fn hover_over_own_column_does_nothing() {
        let mut store = seeded_store(3, &[]);
        let before = store.board().clone();
        let session = start_drag(&store, ColumnId::Waiting, 2);

        assert!(store.hover_card(&session, ColumnId::Waiting).is_none());
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn repeated_hover_for_one_gesture_moves_once() {
        let mut store = seeded_store(3, &[]);
        let session = start_drag(&store, ColumnId::Waiting, 0);

        assert!(store.hover_card(&session, ColumnId::Completed).is_some());
        // Second delivery of the same event still carries the original position
        assert!(store.hover_card(&session, ColumnId::Completed).is_none());

        assert_eq!(store.column(ColumnId::Completed).cards.len(), 1);
        assert_eq!(store.column(ColumnId::Waiting).cards.len(), 2);
        assert_eq!(store.card_count(), 3);
    }

    #[test]
    fn hover_with_unknown_card_is_ignored() {
        let mut store = seeded_store(2, &[]);
        let session = DragSession {
            card_id: "gone".to_string(),
            source_column_id: ColumnId::Waiting,
            source_index: 0,
        };
        assert!(store.hover_card(&session, ColumnId::Pending).is_none());
        assert_eq!(store.column(ColumnId::Waiting).cards.len(), 2);
    }

    #[test]
    fn drop_reorders_inside_the_current_column() {
        let mut store = seeded_store(3, &[]);
        let session = start_drag(&store, ColumnId::Waiting, 0);

        assert!(store.drop_card(&session, 2));
        assert_eq!(store.column(ColumnId::Waiting).cards[2].id, session.card_id);
        assert!(!store.drop_card(&session, 2));
    }
}
