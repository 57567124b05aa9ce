use serde_json::json;

use crate::error::RecordsError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Maps an engine failure onto the wire. Validation failures carry every
/// violation so the caller can show them all at once.
pub fn records_err(id: &str, e: &RecordsError) -> serde_json::Value {
    let details = match e {
        RecordsError::ValidationFailed(violations) => Some(json!({ "violations": violations })),
        RecordsError::DuplicateKey(student_id) | RecordsError::NotFound(student_id) => {
            Some(json!({ "studentId": student_id }))
        }
        _ => None,
    };
    if e.is_store_error() {
        log::error!("request {id} failed in store: {e}");
    }
    err(id, e.code(), e.to_string(), details)
}
