use crate::ipc::error::{err, ok, records_err};
use crate::ipc::types::{AppState, Request};
use crate::student::StudentDraft;
use crate::validate::validate;
use serde_json::json;

fn parse_draft(req: &Request) -> Result<StudentDraft, serde_json::Value> {
    serde_json::from_value::<StudentDraft>(req.params.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid student fields: {e}"), None))
}

fn student_id_param(req: &Request) -> Result<String, serde_json::Value> {
    match req.params.get("studentId").and_then(|v| v.as_str()) {
        Some(v) => Ok(v.trim().to_string()),
        None => Err(err(&req.id, "bad_params", "missing studentId", None)),
    }
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match records.list_all(state.threshold) {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => records_err(&req.id, &e),
    }
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let student_id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match records.get(&student_id, state.threshold) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => records_err(&req.id, &e),
    }
}

fn handle_students_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let query = req
        .params
        .get("query")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    // A blank search box shows the whole roster. Anything else is matched as typed.
    let res = if query.trim().is_empty() {
        records.list_all(state.threshold)
    } else {
        records.search(query, state.threshold)
    };
    match res {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => records_err(&req.id, &e),
    }
}

// Pure check; works without a workspace.
fn handle_students_validate(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match parse_draft(req) {
        Ok(d) => d.normalized(),
        Err(resp) => return resp,
    };
    ok(&req.id, json!({ "violations": validate(&draft) }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let draft = match parse_draft(req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match records.create(draft, state.threshold) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => records_err(&req.id, &e),
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let draft = match parse_draft(req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match records.update(draft, state.threshold) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => records_err(&req.id, &e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(records) = state.records.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let student_id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match records.delete(&student_id) {
        Ok(removed) => ok(&req.id, json!({ "removed": removed })),
        Err(e) => records_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.search" => Some(handle_students_search(state, req)),
        "students.validate" => Some(handle_students_validate(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
