use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::board::Board;

/// Either a bare board or the board view returned by `GET /api/boards/{id}`
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    View { board: Board },
    Bare(Board),
}

/// Loads a board snapshot saved from the web shell
pub fn load_board_snapshot<P: AsRef<Path>>(path: P) -> anyhow::Result<Board> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open snapshot {}", path.display()))?;

    let snapshot: SnapshotFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    Ok(match snapshot {
        SnapshotFile::View { board } => board,
        SnapshotFile::Bare(board) => board,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::store::tests::seeded_store;
    use std::io::Write;

    #[test]
    fn reads_bare_board_and_view() {
        let store = seeded_store(2, &[100]);
        let board = store.board().clone();
        let dir = tempfile::tempdir().unwrap();

        let bare = dir.path().join("bare.json");
        File::create(&bare)
            .unwrap()
            .write_all(serde_json::to_string(&board).unwrap().as_bytes())
            .unwrap();

        let view = dir.path().join("view.json");
        let wrapped = serde_json::json!({"boardId": "abc", "ready": true, "board": board});
        File::create(&view)
            .unwrap()
            .write_all(wrapped.to_string().as_bytes())
            .unwrap();

        assert_eq!(load_board_snapshot(&bare).unwrap(), board);
        assert_eq!(load_board_snapshot(&view).unwrap(), board);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_board_snapshot("/nonexistent/board.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/board.json"));
    }
}
