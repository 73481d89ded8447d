use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::board::{unlabeled_completed, AssignmentBatch, Board, ColumnId, Compiled};

/// Formats a leader heading with the group size
pub fn format_leader_heading(leader_name: &str, member_count: usize) -> String {
    match member_count {
        1 => format!("{} (1 member)", leader_name),
        n => format!("{} ({} members)", leader_name, n),
    }
}

/// Member names on the completed column, keyed by member id
fn completed_member_names(board: &Board) -> HashMap<i64, &str> {
    board
        .column(ColumnId::Completed)
        .cards
        .iter()
        .map(|c| (c.member_id, c.member_name.as_str()))
        .collect()
}

/// Writes one row per (leader, member) pair of the batch
pub fn write_plan_csv<W: Write>(writer: W, batch: &AssignmentBatch, board: &Board) -> Result<(), csv::Error> {
    let names = completed_member_names(board);
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record([
        "leader_id",
        "leader_name",
        "member_id",
        "member_name",
        "village_id",
        "term_start_date",
        "term_end_date",
    ])?;

    for assignment in &batch.assignments {
        for member_id in &assignment.member_ids {
            let member_name = names.get(member_id).copied().unwrap_or("");
            wtr.write_record([
                assignment.leader_id.to_string().as_str(),
                assignment.leader_name.as_str(),
                member_id.to_string().as_str(),
                member_name,
                assignment.village_id.to_string().as_str(),
                assignment.term_start_date.to_string().as_str(),
                assignment.term_end_date.to_string().as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the plan CSV to a file
pub fn write_plan_to_file(
    batch: &AssignmentBatch,
    board: &Board,
    filename: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(filename)?;
    write_plan_csv(file, batch, board)?;
    Ok(())
}

/// Prints the compiled plan in a readable format
pub fn print_assignment_plan(board: &Board, compiled: &Compiled) {
    println!(
        "\n=== GBS assignment plan for village {} ({} .. {}) ===",
        board.village_id, board.start_date, board.end_date
    );

    let batch = match compiled {
        Compiled::NothingToSave => {
            println!("Completed column is empty: nothing to save.");
            return;
        }
        Compiled::Batch(batch) => batch,
    };

    println!("Groups: {}", batch.assignments.len());
    let names = completed_member_names(board);
    for assignment in &batch.assignments {
        println!(
            "\n{}",
            format_leader_heading(&assignment.leader_name, assignment.member_ids.len())
        );
        for member_id in &assignment.member_ids {
            let name = names.get(member_id).copied().unwrap_or("?");
            println!("  - {} (ID: {})", name, member_id);
        }
    }

    let excluded = unlabeled_completed(board);
    if !excluded.is_empty() {
        println!("\n⚠️  Completed without a leader, not saved ({}):", excluded.len());
        for card in excluded {
            println!("  - {} (ID: {})", card.member_name, card.member_id);
        }
    }
}
