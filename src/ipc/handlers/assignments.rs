use crate::engine::{self, TaskRequirement};
use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, BatchInput};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::json;

fn handle_randomize(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let roster = match load_roster(conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if roster.is_empty() {
        return err(
            &req.id,
            "validation_failed",
            "no students in the roster to assign",
            None,
        );
    }

    let requirements = match req.params.get("requirements") {
        Some(raw) => match parse_requirements(raw) {
            Ok(v) => v,
            Err(msg) => return err(&req.id, "bad_params", msg, None),
        },
        None => match load_stored_requirements(conn) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        },
    };

    let total: usize = requirements.iter().map(|r| r.required_count).sum();
    if total == 0 {
        return err(
            &req.id,
            "validation_failed",
            "at least one task needs a required count above zero",
            None,
        );
    }

    let mut rng = rand::thread_rng();
    let assignments = engine::partition(&roster, &requirements, &mut rng);

    ok(
        &req.id,
        json!({
            "assignments": assignments,
            "rosterSize": roster.len(),
            "totalRequired": total,
        }),
    )
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let start_date = match date_param(req, "startDate") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let end_date = match date_param(req, "endDate") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Some(raw_assignments) = req.params.get("assignments").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing assignments", None);
    };
    if raw_assignments.is_empty() {
        return err(
            &req.id,
            "validation_failed",
            "nothing to save: assignments are empty",
            None,
        );
    }

    let mut assignments = Vec::with_capacity(raw_assignments.len());
    for entry in raw_assignments {
        let Some(task_name) = entry.get("taskName").and_then(|v| v.as_str()) else {
            return err(&req.id, "bad_params", "assignment missing taskName", None);
        };
        let students: Vec<String> = entry
            .get("students")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|s| s.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();
        assignments.push((task_name.to_string(), students));
    }

    let input = BatchInput {
        start_date,
        end_date,
        assignments,
    };
    match store::append_batch(conn, &input) {
        Ok(saved) => ok(&req.id, json!(saved)),
        Err(e) => err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "assignment_rows" })),
        ),
    }
}

fn handle_latest(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Never answer this from placeholder data: a student checking duties
    // must see a real batch or a loud failure, not an invented one.
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    match store::latest_batch(conn) {
        Ok(Some(batch)) => ok(&req.id, json!({ "batch": batch })),
        Ok(None) => ok(&req.id, json!({ "batch": null })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn load_roster(conn: &Connection) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM roster_students ORDER BY sort_order")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect())
}

fn load_stored_requirements(conn: &Connection) -> anyhow::Result<Vec<TaskRequirement>> {
    let mut stmt =
        conn.prepare("SELECT name, required_count FROM duty_tasks ORDER BY sort_order")?;
    let reqs = stmt
        .query_map([], |row| {
            let name: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok(TaskRequirement {
                name,
                required_count: count.max(0) as usize,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(reqs)
}

fn parse_requirements(raw: &serde_json::Value) -> Result<Vec<TaskRequirement>, String> {
    let Some(arr) = raw.as_array() else {
        return Err("requirements must be an array".to_string());
    };
    let mut out = Vec::with_capacity(arr.len());
    for entry in arr {
        let Some(name) = entry.get("taskName").and_then(|v| v.as_str()) else {
            return Err("requirement missing taskName".to_string());
        };
        let name = name.trim();
        if name.is_empty() {
            return Err("requirement taskName must not be empty".to_string());
        }
        let count = entry
            .get("requiredCount")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        if count < 0 {
            return Err(format!("requiredCount for {} must not be negative", name));
        }
        out.push(TaskRequirement {
            name: name.to_string(),
            required_count: count as usize,
        });
    }
    Ok(out)
}

fn date_param(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    let raw = req
        .params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if raw.is_empty() {
        return Err(err(
            &req.id,
            "validation_failed",
            format!("missing {}: pick the date range before saving", key),
            None,
        ));
    }
    if NaiveDate::parse_from_str(&raw, "%Y-%m-%d").is_err() {
        return Err(err(
            &req.id,
            "validation_failed",
            format!("{} must be a YYYY-MM-DD date", key),
            None,
        ));
    }
    Ok(raw)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.randomize" => Some(handle_randomize(state, req)),
        "assignments.save" => Some(handle_save(state, req)),
        "assignments.latest" => Some(handle_latest(state, req)),
        _ => None,
    }
}
