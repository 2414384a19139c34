use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

/// Separator used when flattening a student list into one spreadsheet-style
/// cell. Retrieval splits on the same token, so it must never change shape.
const NAME_SEPARATOR: &str = ", ";

#[derive(Debug, Clone)]
pub struct BatchInput {
    pub start_date: String,
    pub end_date: String,
    pub assignments: Vec<(String, Vec<String>)>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBatch {
    pub batch_id: String,
    pub created_at: String,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTask {
    pub task_name: String,
    pub students: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentBatch {
    pub batch_id: String,
    pub created_at: String,
    pub start_date: String,
    pub end_date: String,
    pub tasks: Vec<BatchTask>,
}

/// Append one batch: a single fresh batch id and timestamp stamped on every
/// row, written all-or-nothing.
pub fn append_batch(conn: &Connection, input: &BatchInput) -> anyhow::Result<SavedBatch> {
    let batch_id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();

    let tx = conn.unchecked_transaction()?;
    for (task_name, students) in &input.assignments {
        tx.execute(
            "INSERT INTO assignment_rows(
               id, batch_id, created_at, start_date, end_date, task_name, student_names
             ) VALUES(?, ?, ?, ?, ?, ?, ?)",
            (
                Uuid::new_v4().to_string(),
                &batch_id,
                &created_at,
                &input.start_date,
                &input.end_date,
                task_name,
                students.join(NAME_SEPARATOR),
            ),
        )?;
    }
    tx.commit()?;

    Ok(SavedBatch {
        batch_id,
        created_at,
        row_count: input.assignments.len(),
    })
}

/// Retrieve the most recent batch. Rows are append-only, so the last-stored
/// row is always the newest; every row sharing its batch id forms the batch.
/// Dates are read from the first row of the group (all rows of one batch
/// share them by construction).
pub fn latest_batch(conn: &Connection) -> anyhow::Result<Option<AssignmentBatch>> {
    let mut last_stmt = conn.prepare(
        "SELECT batch_id FROM assignment_rows ORDER BY rowid DESC LIMIT 1",
    )?;
    let mut last_rows = last_stmt.query([])?;
    let batch_id: String = match last_rows.next()? {
        Some(row) => row.get(0)?,
        None => return Ok(None),
    };

    let mut stmt = conn.prepare(
        "SELECT created_at, start_date, end_date, task_name, student_names
         FROM assignment_rows
         WHERE batch_id = ?
         ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([&batch_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let batch = AssignmentBatch {
        batch_id,
        created_at: first.0.clone(),
        start_date: first.1.clone(),
        end_date: first.2.clone(),
        tasks: rows
            .iter()
            .map(|r| BatchTask {
                task_name: r.3.clone(),
                students: split_names(&r.4),
            })
            .collect(),
    };
    Ok(Some(batch))
}

fn split_names(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(NAME_SEPARATOR).map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_workspace(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn batch(start: &str, end: &str, tasks: &[(&str, &[&str])]) -> BatchInput {
        BatchInput {
            start_date: start.to_string(),
            end_date: end.to_string(),
            assignments: tasks
                .iter()
                .map(|(name, students)| {
                    (
                        name.to_string(),
                        students.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn latest_returns_what_was_saved() {
        let ws = temp_workspace("dutyboard-store-roundtrip");
        let conn = db::open_db(&ws).expect("open db");

        let saved = append_batch(
            &conn,
            &batch("2024-01-01", "2024-01-06", &[("Sweep", &["A", "B"])]),
        )
        .expect("append");
        assert_eq!(saved.row_count, 1);

        let latest = latest_batch(&conn).expect("latest").expect("some batch");
        assert_eq!(latest.batch_id, saved.batch_id);
        assert_eq!(latest.start_date, "2024-01-01");
        assert_eq!(latest.end_date, "2024-01-06");
        assert_eq!(latest.tasks.len(), 1);
        assert_eq!(latest.tasks[0].task_name, "Sweep");
        assert_eq!(latest.tasks[0].students, vec!["A", "B"]);

        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn second_save_fully_supersedes_the_first() {
        let ws = temp_workspace("dutyboard-store-supersede");
        let conn = db::open_db(&ws).expect("open db");

        append_batch(
            &conn,
            &batch(
                "2024-01-01",
                "2024-01-06",
                &[("Sweep", &["A"]), ("Board", &["B"])],
            ),
        )
        .expect("first append");
        let second = append_batch(
            &conn,
            &batch("2024-01-08", "2024-01-13", &[("Sweep", &["C"])]),
        )
        .expect("second append");

        let latest = latest_batch(&conn).expect("latest").expect("some batch");
        assert_eq!(latest.batch_id, second.batch_id);
        assert_eq!(latest.tasks.len(), 1, "no rows from the first batch");
        assert_eq!(latest.tasks[0].students, vec!["C"]);

        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn empty_store_has_no_latest_batch() {
        let ws = temp_workspace("dutyboard-store-empty");
        let conn = db::open_db(&ws).expect("open db");
        assert!(latest_batch(&conn).expect("latest").is_none());
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn empty_student_list_round_trips_as_empty() {
        let ws = temp_workspace("dutyboard-store-empty-students");
        let conn = db::open_db(&ws).expect("open db");

        append_batch(
            &conn,
            &batch("2024-02-01", "2024-02-03", &[("Unfilled", &[])]),
        )
        .expect("append");

        let latest = latest_batch(&conn).expect("latest").expect("some batch");
        assert!(latest.tasks[0].students.is_empty());

        let _ = std::fs::remove_dir_all(ws);
    }
}
