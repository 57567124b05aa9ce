use crate::db::{SqliteStudentStore, StudentRepository};
use crate::error::RecordsError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::records::RecordsService;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Initializes the student store under `path` and makes it the active
/// workspace. On failure the previous workspace (if any) stays selected.
pub fn open_workspace(state: &mut AppState, path: &Path) -> Result<(), RecordsError> {
    let store = SqliteStudentStore::in_workspace(path);
    store.initialize()?;
    log::debug!("student store at {}", store.db_path().display());
    state.workspace = Some(path.to_path_buf());
    state.records = Some(RecordsService::new(store));
    Ok(())
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "gpaThreshold": state.threshold,
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, &path) {
        Ok(()) => ok(&req.id, json!({ "workspacePath": path.to_string_lossy() })),
        Err(e) => err(&req.id, "db_open_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
