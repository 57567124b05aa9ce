use crate::exchange::{export_csv, import_csv};
use crate::ipc::error::{err, ok, records_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn path_param(req: &Request, key: &str) -> Result<PathBuf, serde_json::Value> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(PathBuf::from(v.trim())),
        _ => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

fn handle_exchange_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let out_path = match path_param(req, "outPath") {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match export_csv(records, &out_path, state.threshold) {
        Ok(rows) => ok(
            &req.id,
            json!({ "path": out_path.to_string_lossy(), "rowsExported": rows }),
        ),
        Err(e) => records_err(&req.id, &e),
    }
}

fn handle_exchange_import_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let in_path = match path_param(req, "inPath") {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match import_csv(records, &in_path) {
        Ok(summary) => ok(&req.id, json!(summary)),
        Err(e) => records_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exchange.exportCsv" => Some(handle_exchange_export_csv(state, req)),
        "exchange.importCsv" => Some(handle_exchange_import_csv(state, req)),
        _ => None,
    }
}
