#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
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

pub fn write_snapshot(workspace: &Path, snapshot: &serde_json::Value) {
    let path = workspace.join("records.json");
    std::fs::write(&path, serde_json::to_string_pretty(snapshot).expect("encode snapshot"))
        .expect("write snapshot");
}

/// Workspace fixture used by most suites: three subjects over both
/// semesters, one stale subject reference, tri-state attendance.
pub fn portal_snapshot() -> serde_json::Value {
    json!({
        "subjects": [
            { "subjectId": 10, "name": "Математика", "semester": 1 },
            { "subjectId": 11, "name": "Физика", "semester": 1 },
            { "subjectId": 12, "name": "История", "semester": 2 }
        ],
        "grades": [
            { "performanceId": 1, "studentId": 1, "subjectId": 10, "grade": 5, "workType": "Экзамен", "assessmentDate": "2025-09-10" },
            { "performanceId": 2, "studentId": 1, "subjectId": 10, "grade": 3, "workType": "Урок", "assessmentDate": "2025-09-12" },
            { "performanceId": 3, "studentId": 1, "subjectId": 11, "grade": 4, "workType": "Урок", "assessmentDate": "2025-09-11" },
            { "performanceId": 4, "studentId": 1, "subjectId": 11, "grade": null, "workType": "Урок", "assessmentDate": "2025-09-18" },
            { "performanceId": 5, "studentId": 1, "subjectId": 12, "grade": 5, "workType": "Урок", "assessmentDate": "2026-02-10" },
            { "performanceId": 6, "studentId": 1, "subjectId": 99, "grade": 2, "workType": "Урок", "assessmentDate": "2025-09-10" },
            { "performanceId": 7, "studentId": 2, "subjectId": 10, "grade": 2, "workType": "Урок", "assessmentDate": "2025-09-10" }
        ],
        "attendance": [
            { "attendanceId": 1, "studentId": 1, "subjectId": 10, "attendanceDate": "2025-09-01", "isPresent": true },
            { "attendanceId": 2, "studentId": 1, "subjectId": 10, "attendanceDate": "2025-09-08", "isPresent": false },
            { "attendanceId": 3, "studentId": 1, "subjectId": 10, "attendanceDate": "2025-09-15", "isPresent": true },
            { "attendanceId": 4, "studentId": 1, "subjectId": 11, "attendanceDate": "2025-09-02", "isPresent": true },
            { "attendanceId": 5, "studentId": 1, "subjectId": 11, "attendanceDate": "2025-09-09", "isPresent": false },
            { "attendanceId": 6, "studentId": 1, "subjectId": 11, "attendanceDate": "2025-09-16", "isPresent": null },
            { "attendanceId": 7, "studentId": 1, "subjectId": 12, "attendanceDate": "2026-02-02", "isPresent": true }
        ],
        "teacherLinks": [
            { "subjectId": 10, "teacherName": "Иванова А. П." },
            { "subjectId": 10, "teacherName": "Петров С. В." }
        ]
    })
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

/// Sends a request and unwraps its `result`, failing on any error reply.
pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "expected ok for {}: {}",
        method,
        value
    );
    value.get("result").cloned().expect("result")
}

/// Sends a request expected to fail and returns its error code.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "expected error for {}: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
        .to_string()
}

/// Selects a freshly-seeded workspace and returns its path.
pub fn select_workspace(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    prefix: &str,
    snapshot: &serde_json::Value,
) -> PathBuf {
    let workspace = temp_dir(prefix);
    write_snapshot(&workspace, snapshot);
    let _ = request_ok(
        stdin,
        reader,
        "select",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    workspace
}
