use crate::descriptions::resolve_description;
use crate::fallback;
use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(
            &req.id,
            json!({
                "descriptions": entries_to_map(&fallback::placeholder_descriptions()),
                "placeholder": true
            }),
        );
    };

    match load_entries(conn) {
        Ok(entries) => ok(
            &req.id,
            json!({ "descriptions": entries_to_map(&entries), "placeholder": false }),
        ),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let task_name = match req.params.get("taskName").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing taskName", None),
    };
    let Some(raw_lines) = req.params.get("lines").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing lines", None);
    };
    let lines: Vec<String> = raw_lines
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };
    if let Err(e) = tx.execute(
        "DELETE FROM task_descriptions WHERE task_name = ?",
        [&task_name],
    ) {
        let _ = tx.rollback();
        return err(&req.id, "db_delete_failed", e.to_string(), None);
    }
    for (i, line) in lines.iter().enumerate() {
        if let Err(e) = tx.execute(
            "INSERT INTO task_descriptions(id, task_name, sort_order, line) VALUES(?, ?, ?, ?)",
            (Uuid::new_v4().to_string(), &task_name, i as i64, line),
        ) {
            let _ = tx.rollback();
            return err(
                &req.id,
                "db_insert_failed",
                e.to_string(),
                Some(json!({ "table": "task_descriptions" })),
            );
        }
    }
    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({ "taskName": task_name, "lineCount": lines.len() }),
    )
}

fn handle_resolve(state: &mut AppState, req: &Request) -> serde_json::Value {
    let task_name = match req.params.get("taskName").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing taskName", None),
    };

    let entries = match state.db.as_ref() {
        Some(conn) => match load_entries(conn) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        },
        None => fallback::placeholder_descriptions(),
    };

    let lines = resolve_description(&task_name, &entries);
    ok(&req.id, json!({ "taskName": task_name, "lines": lines }))
}

/// Keys come back in first-seen row order so the resolver's tie-break stays
/// stable across reads.
fn load_entries(conn: &Connection) -> anyhow::Result<Vec<(String, Vec<String>)>> {
    let mut stmt = conn.prepare(
        "SELECT task_name, line FROM task_descriptions ORDER BY rowid, sort_order",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut entries: Vec<(String, Vec<String>)> = Vec::new();
    for (task_name, line) in rows {
        match entries.iter_mut().find(|(k, _)| *k == task_name) {
            Some((_, lines)) => lines.push(line),
            None => entries.push((task_name, vec![line])),
        }
    }
    Ok(entries)
}

fn entries_to_map(entries: &[(String, Vec<String>)]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, lines) in entries {
        map.insert(key.clone(), json!(lines));
    }
    serde_json::Value::Object(map)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "descriptions.get" => Some(handle_get(state, req)),
        "descriptions.set" => Some(handle_set(state, req)),
        "descriptions.resolve" => Some(handle_resolve(state, req)),
        _ => None,
    }
}
