mod test_support;

use serde_json::json;
use test_support::{request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("dutyboard-router-smoke");
    let bundle_out = workspace.join("smoke-backup.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "roster.students.add",
        json!({ "name": "Smoke Student" }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "4", "roster.students.list", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "roster.tasks.add",
        json!({ "name": "Smoke Duty", "requiredCount": 1 }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "6", "roster.tasks.list", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "roster.roles.add",
        json!({ "label": "Smoke Role" }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "8", "roster.roles.list", json!({}));

    let _ = request_ok(&mut stdin, &mut reader, "9", "assignments.randomize", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "assignments.save",
        json!({
            "startDate": "2024-05-06",
            "endDate": "2024-05-11",
            "assignments": [{ "taskName": "Smoke Duty", "students": ["Smoke Student"] }]
        }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "11", "assignments.latest", json!({}));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "descriptions.set",
        json!({ "taskName": "Smoke Duty", "lines": ["smoke line"] }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "13", "descriptions.get", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "descriptions.resolve",
        json!({ "taskName": "Smoke Duty" }),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "15",
        "backup.exportWorkspaceBundle",
        json!({
            "workspacePath": workspace.to_string_lossy(),
            "outPath": bundle_out.to_string_lossy()
        }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "16",
        "backup.importWorkspaceBundle",
        json!({
            "workspacePath": workspace.to_string_lossy(),
            "inPath": bundle_out.to_string_lossy()
        }),
    );

    let unknown = request(&mut stdin, &mut reader, "17", "nonsense.method", json!({}));
    assert_eq!(unknown.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        unknown
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
