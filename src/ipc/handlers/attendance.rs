use serde_json::json;

use crate::dashboard::{attendance_subject_details, build_attendance_dashboard};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{optional_i32, required_i64, store_ref, to_result_value};
use crate::ipc::types::{AppState, Request};

fn attendance_dashboard(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_ref(state)?;
    let student_id = required_i64(params, "studentId")?;
    let semester = optional_i32(params, "semester")?;
    let dashboard = build_attendance_dashboard(store, student_id, semester);
    Ok(json!({
        "semester": semester,
        "subjects": to_result_value(&dashboard)?
    }))
}

fn attendance_details(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_ref(state)?;
    let student_id = required_i64(params, "studentId")?;
    let subject_id = required_i64(params, "subjectId")?;
    let semester = optional_i32(params, "semester")?;
    let details = attendance_subject_details(store, student_id, subject_id, semester)
        .ok_or_else(|| HandlerErr::not_found("subject not found"))?;
    to_result_value(&details)
}

fn handle_attendance_dashboard(state: &mut AppState, req: &Request) -> serde_json::Value {
    match attendance_dashboard(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_attendance_details(state: &mut AppState, req: &Request) -> serde_json::Value {
    match attendance_details(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.dashboard" => Some(handle_attendance_dashboard(state, req)),
        "attendance.subjectDetails" => Some(handle_attendance_details(state, req)),
        _ => None,
    }
}
