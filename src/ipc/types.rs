use std::path::PathBuf;

use serde::Deserialize;

use crate::calc::WorkTypeWeights;
use crate::store::MemoryStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<MemoryStore>,
    pub weights: WorkTypeWeights,
}

impl AppState {
    pub fn new(weights: WorkTypeWeights) -> Self {
        Self {
            workspace: None,
            store: None,
            weights,
        }
    }
}
