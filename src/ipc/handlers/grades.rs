use serde_json::json;

use crate::dashboard::{build_grades_dashboard, grade_subject_details};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{optional_i32, required_i64, store_ref, to_result_value};
use crate::ipc::types::{AppState, Request};
use crate::store::RecordSource;

fn grades_dashboard(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_ref(state)?;
    let student_id = required_i64(params, "studentId")?;
    let semester = optional_i32(params, "semester")?;
    let dashboard = build_grades_dashboard(store, &state.weights, student_id, semester);
    Ok(json!({
        "semester": semester,
        "subjects": to_result_value(&dashboard)?
    }))
}

fn grades_subject_details(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_ref(state)?;
    let student_id = required_i64(params, "studentId")?;
    let subject_id = required_i64(params, "subjectId")?;
    let semester = optional_i32(params, "semester")?;
    let details = grade_subject_details(store, &state.weights, student_id, subject_id, semester)
        .ok_or_else(|| HandlerErr::not_found("subject not found"))?;
    to_result_value(&details)
}

fn subjects_teachers(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_ref(state)?;
    let subject_id = required_i64(params, "subjectId")?;
    Ok(json!({ "teachers": store.teachers_by_subject(subject_id) }))
}

fn handle_grades_dashboard(state: &mut AppState, req: &Request) -> serde_json::Value {
    match grades_dashboard(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_grades_subject_details(state: &mut AppState, req: &Request) -> serde_json::Value {
    match grades_subject_details(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_subjects_teachers(state: &mut AppState, req: &Request) -> serde_json::Value {
    match subjects_teachers(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.dashboard" => Some(handle_grades_dashboard(state, req)),
        "grades.subjectDetails" => Some(handle_grades_subject_details(state, req)),
        "subjects.teachers" => Some(handle_subjects_teachers(state, req)),
        _ => None,
    }
}
