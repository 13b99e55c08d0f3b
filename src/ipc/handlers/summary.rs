use chrono::Local;
use serde_json::json;

use crate::calc::current_semester;
use crate::dashboard::{build_summary, semester_trend};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{optional_i32, required_i64, store_ref, to_result_value};
use crate::ipc::types::{AppState, Request};

fn summary_get(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_ref(state)?;
    let student_id = required_i64(params, "studentId")?;
    // A caller that never mentions the semester gets the current one; an
    // explicit null asks for the unfiltered, all-semester view.
    let semester = match params.get("semester") {
        None => Some(current_semester(Local::now().date_naive())),
        Some(_) => optional_i32(params, "semester")?,
    };
    let summary = build_summary(store, &state.weights, student_id, semester);
    let mut value = to_result_value(&summary)?;
    value["semester"] = json!(semester);
    Ok(value)
}

fn summary_trend(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let store = store_ref(state)?;
    let student_id = required_i64(params, "studentId")?;
    let trend = semester_trend(store, &state.weights, student_id);
    to_result_value(&trend)
}

fn handle_summary_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match summary_get(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_summary_trend(state: &mut AppState, req: &Request) -> serde_json::Value {
    match summary_trend(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "summary.get" => Some(handle_summary_get(state, req)),
        "summary.trend" => Some(handle_summary_trend(state, req)),
        _ => None,
    }
}
