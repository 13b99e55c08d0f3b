use super::error::HandlerErr;
use super::types::AppState;
use crate::store::MemoryStore;

pub fn required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Absent and explicit-null both read as "no filter".
pub fn optional_i32(params: &serde_json::Value, key: &str) -> Result<Option<i32>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => match v.as_i64() {
            Some(n) => Ok(Some(n as i32)),
            None => Err(HandlerErr::bad_params(format!(
                "{} must be an integer or null",
                key
            ))),
        },
    }
}

pub fn store_ref(state: &AppState) -> Result<&MemoryStore, HandlerErr> {
    state.store.as_ref().ok_or_else(HandlerErr::no_workspace)
}

pub fn to_result_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(value).map_err(|e| HandlerErr::internal(e.to_string()))
}
