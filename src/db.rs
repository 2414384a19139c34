use rusqlite::Connection;
use std::path::Path;
use uuid::Uuid;

pub const DB_FILE_NAME: &str = "dutyboard.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS roster_students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_roster_students_sort ON roster_students(sort_order)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS duty_tasks(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            required_count INTEGER NOT NULL DEFAULT 1,
            sort_order INTEGER NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_duty_tasks_sort ON duty_tasks(sort_order)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS fixed_roles(
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            sort_order INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS task_descriptions(
            id TEXT PRIMARY KEY,
            task_name TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            line TEXT NOT NULL,
            UNIQUE(task_name, sort_order)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_task_descriptions_task ON task_descriptions(task_name)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assignment_rows(
            id TEXT PRIMARY KEY,
            batch_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            task_name TEXT NOT NULL,
            student_names TEXT NOT NULL
        )",
        [],
    )?;
    ensure_assignment_rows_batch_id(&conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assignment_rows_batch ON assignment_rows(batch_id)",
        [],
    )?;

    Ok(conn)
}

/// Workspaces written before batches carried an explicit id grouped rows by
/// timestamp equality. Backfill one generated id per distinct created_at so
/// two saves landing in the same clock tick can never merge.
fn ensure_assignment_rows_batch_id(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "assignment_rows", "batch_id")? {
        return Ok(());
    }

    conn.execute(
        "ALTER TABLE assignment_rows ADD COLUMN batch_id TEXT NOT NULL DEFAULT ''",
        [],
    )?;

    let mut stamp_stmt = conn.prepare(
        "SELECT DISTINCT created_at FROM assignment_rows ORDER BY rowid",
    )?;
    let stamps = stamp_stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for stamp in stamps {
        let batch_id = Uuid::new_v4().to_string();
        conn.execute(
            "UPDATE assignment_rows SET batch_id = ? WHERE created_at = ?",
            (&batch_id, &stamp),
        )?;
    }

    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
