use crate::config::Threshold;
use crate::ipc::error::{err, ok, records_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_settings_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "gpaThreshold": state.threshold }))
}

fn handle_settings_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("gpaThreshold").and_then(|v| v.as_f64()) else {
        return err(&req.id, "bad_params", "missing/invalid gpaThreshold", None);
    };
    let threshold = match Threshold::new(raw) {
        Ok(t) => t,
        Err(e) => return records_err(&req.id, &e),
    };
    if threshold != state.threshold {
        log::info!(
            "GPA threshold changed {} -> {}",
            state.threshold.value(),
            threshold.value()
        );
    }
    state.threshold = threshold;
    ok(&req.id, json!({ "gpaThreshold": state.threshold }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "settings.get" => Some(handle_settings_get(state, req)),
        "settings.update" => Some(handle_settings_update(state, req)),
        _ => None,
    }
}
