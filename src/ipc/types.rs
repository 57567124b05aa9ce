use std::path::PathBuf;

use serde::Deserialize;

use crate::config::Threshold;
use crate::db::SqliteStudentStore;
use crate::records::RecordsService;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub records: Option<RecordsService<SqliteStudentStore>>,
    /// Live GPA cutoff, handed to every classifying service call.
    pub threshold: Threshold,
}

impl AppState {
    pub fn new(threshold: Threshold) -> Self {
        Self {
            workspace: None,
            records: None,
            threshold,
        }
    }
}
