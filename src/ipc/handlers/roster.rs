use crate::fallback;
use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(
            &req.id,
            json!({ "students": fallback::placeholder_students(), "placeholder": true }),
        );
    };

    match list_names(
        conn,
        "SELECT id, name FROM roster_students ORDER BY sort_order",
    ) {
        Ok(rows) => {
            let students: Vec<serde_json::Value> = rows
                .into_iter()
                .map(|(id, name)| json!({ "id": id, "name": name }))
                .collect();
            ok(&req.id, json!({ "students": students, "placeholder": false }))
        }
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let name = match trimmed_param(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let sort_order: i64 = match conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM roster_students",
        [],
        |r| r.get(0),
    ) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let student_id = Uuid::new_v4().to_string();
    if let Err(e) = conn.execute(
        "INSERT INTO roster_students(id, name, sort_order, updated_at)
         VALUES(?, ?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))",
        (&student_id, &name, sort_order),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "roster_students" })),
        );
    }

    ok(&req.id, json!({ "studentId": student_id, "name": name }))
}

fn handle_students_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let student_id = match trimmed_param(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match conn.execute("DELETE FROM roster_students WHERE id = ?", [&student_id]) {
        Ok(0) => err(&req.id, "not_found", "student not found", None),
        Ok(_) => ok(&req.id, json!({ "removed": true })),
        Err(e) => err(&req.id, "db_delete_failed", e.to_string(), None),
    }
}

fn handle_tasks_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        let tasks: Vec<serde_json::Value> = fallback::placeholder_tasks()
            .into_iter()
            .map(|(name, count)| json!({ "name": name, "requiredCount": count }))
            .collect();
        return ok(&req.id, json!({ "tasks": tasks, "placeholder": true }));
    };

    let mut stmt = match conn.prepare(
        "SELECT id, name, required_count FROM duty_tasks ORDER BY sort_order",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let rows = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let name: String = row.get(1)?;
            let required_count: i64 = row.get(2)?;
            Ok(json!({ "id": id, "name": name, "requiredCount": required_count }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(tasks) => ok(&req.id, json!({ "tasks": tasks, "placeholder": false })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_tasks_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let name = match trimmed_param(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let required_count = req
        .params
        .get("requiredCount")
        .and_then(|v| v.as_i64())
        .unwrap_or(1);
    if required_count < 0 {
        return err(
            &req.id,
            "bad_params",
            "requiredCount must not be negative",
            None,
        );
    }

    let sort_order: i64 = match conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM duty_tasks",
        [],
        |r| r.get(0),
    ) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let task_id = Uuid::new_v4().to_string();
    if let Err(e) = conn.execute(
        "INSERT INTO duty_tasks(id, name, required_count, sort_order) VALUES(?, ?, ?, ?)",
        (&task_id, &name, required_count, sort_order),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "duty_tasks" })),
        );
    }

    ok(
        &req.id,
        json!({ "taskId": task_id, "name": name, "requiredCount": required_count }),
    )
}

fn handle_tasks_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let task_id = match trimmed_param(req, "taskId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(required_count) = req.params.get("requiredCount").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing requiredCount", None);
    };
    if required_count < 0 {
        return err(
            &req.id,
            "bad_params",
            "requiredCount must not be negative",
            None,
        );
    }

    match conn.execute(
        "UPDATE duty_tasks SET required_count = ? WHERE id = ?",
        (required_count, &task_id),
    ) {
        Ok(0) => err(&req.id, "not_found", "task not found", None),
        Ok(_) => ok(&req.id, json!({ "taskId": task_id, "requiredCount": required_count })),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_tasks_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let task_id = match trimmed_param(req, "taskId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match conn.execute("DELETE FROM duty_tasks WHERE id = ?", [&task_id]) {
        Ok(0) => err(&req.id, "not_found", "task not found", None),
        Ok(_) => ok(&req.id, json!({ "removed": true })),
        Err(e) => err(&req.id, "db_delete_failed", e.to_string(), None),
    }
}

fn handle_roles_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(
            &req.id,
            json!({ "roles": fallback::placeholder_fixed_roles(), "placeholder": true }),
        );
    };

    match list_names(conn, "SELECT id, label FROM fixed_roles ORDER BY sort_order") {
        Ok(rows) => {
            let roles: Vec<serde_json::Value> = rows
                .into_iter()
                .map(|(id, label)| json!({ "id": id, "label": label }))
                .collect();
            ok(&req.id, json!({ "roles": roles, "placeholder": false }))
        }
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_roles_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let label = match trimmed_param(req, "label") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let sort_order: i64 = match conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM fixed_roles",
        [],
        |r| r.get(0),
    ) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let role_id = Uuid::new_v4().to_string();
    if let Err(e) = conn.execute(
        "INSERT INTO fixed_roles(id, label, sort_order) VALUES(?, ?, ?)",
        (&role_id, &label, sort_order),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "fixed_roles" })),
        );
    }

    ok(&req.id, json!({ "roleId": role_id, "label": label }))
}

fn handle_roles_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(&req.id);
    };

    let role_id = match trimmed_param(req, "roleId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match conn.execute("DELETE FROM fixed_roles WHERE id = ?", [&role_id]) {
        Ok(0) => err(&req.id, "not_found", "role not found", None),
        Ok(_) => ok(&req.id, json!({ "removed": true })),
        Err(e) => err(&req.id, "db_delete_failed", e.to_string(), None),
    }
}

fn trimmed_param(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    let raw = match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    };
    if raw.is_empty() {
        return Err(err(
            &req.id,
            "bad_params",
            format!("{} must not be empty", key),
            None,
        ));
    }
    Ok(raw)
}

fn list_names(conn: &Connection, sql: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.students.list" => Some(handle_students_list(state, req)),
        "roster.students.add" => Some(handle_students_add(state, req)),
        "roster.students.remove" => Some(handle_students_remove(state, req)),
        "roster.tasks.list" => Some(handle_tasks_list(state, req)),
        "roster.tasks.add" => Some(handle_tasks_add(state, req)),
        "roster.tasks.update" => Some(handle_tasks_update(state, req)),
        "roster.tasks.remove" => Some(handle_tasks_remove(state, req)),
        "roster.roles.list" => Some(handle_roles_list(state, req)),
        "roster.roles.add" => Some(handle_roles_add(state, req)),
        "roster.roles.remove" => Some(handle_roles_remove(state, req)),
        _ => None,
    }
}
