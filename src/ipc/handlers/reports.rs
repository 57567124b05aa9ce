use crate::ipc::error::{err, ok, records_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

const DEFAULT_TOP_LIMIT: u64 = 10;

fn handle_reports_dashboard(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    // Display path: never fail the dashboard on a store hiccup.
    let (stats, degraded) = records.dashboard_stats_or_default(state.threshold);
    let mut result = json!(stats);
    result["degraded"] = json!(degraded);
    ok(&req.id, result)
}

fn handle_reports_academic(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match records.academic_report(state.threshold) {
        Ok(report) => ok(&req.id, json!(report)),
        Err(e) => records_err(&req.id, &e),
    }
}

fn handle_reports_top_performers(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let limit = match req.params.get("limit") {
        None | Some(serde_json::Value::Null) => DEFAULT_TOP_LIMIT,
        Some(v) => match v.as_u64() {
            Some(n) => n,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "limit must be a non-negative integer",
                    None,
                )
            }
        },
    };
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    match records.top_performers(limit, state.threshold) {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => records_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.dashboard" => Some(handle_reports_dashboard(state, req)),
        "reports.academic" => Some(handle_reports_academic(state, req)),
        "reports.topPerformers" => Some(handle_reports_top_performers(state, req)),
        _ => None,
    }
}
