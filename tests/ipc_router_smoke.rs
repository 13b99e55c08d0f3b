mod test_support;

use serde_json::json;
use test_support::{portal_snapshot, request_err, request_ok, select_workspace, spawn_sidecar, temp_dir};

#[test]
fn health_reports_version_and_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());
    assert!(health
        .get("workspacePath")
        .map(|v| v.is_null())
        .unwrap_or(false));

    let workspace = select_workspace(&mut stdin, &mut reader, "gradebookd-smoke", &portal_snapshot());
    let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
    assert_eq!(
        health.get("workspacePath").and_then(|v| v.as_str()),
        Some(workspace.to_string_lossy().as_ref())
    );
}

#[test]
fn unknown_method_is_not_implemented() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let code = request_err(&mut stdin, &mut reader, "1", "grades.unknownOp", json!({}));
    assert_eq!(code, "not_implemented");
}

#[test]
fn queries_before_workspace_selection_are_rejected() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    for (id, method) in [
        ("1", "grades.dashboard"),
        ("2", "attendance.dashboard"),
        ("3", "summary.get"),
        ("4", "summary.trend"),
    ] {
        let code = request_err(&mut stdin, &mut reader, id, method, json!({ "studentId": 1 }));
        assert_eq!(code, "no_workspace", "method {}", method);
    }
}

#[test]
fn workspace_select_requires_readable_snapshot() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let code = request_err(&mut stdin, &mut reader, "1", "workspace.select", json!({}));
    assert_eq!(code, "bad_params");

    let empty = temp_dir("gradebookd-empty-workspace");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": empty.to_string_lossy() }),
    );
    assert_eq!(code, "workspace_load_failed");
}

#[test]
fn missing_student_id_is_bad_params() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = select_workspace(&mut stdin, &mut reader, "gradebookd-params", &portal_snapshot());

    let code = request_err(&mut stdin, &mut reader, "1", "grades.dashboard", json!({}));
    assert_eq!(code, "bad_params");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "grades.dashboard",
        json!({ "studentId": 1, "semester": "first" }),
    );
    assert_eq!(code, "bad_params");
}
