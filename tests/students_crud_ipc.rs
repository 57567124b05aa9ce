use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rosterd");
    let mut child = Command::new(exe)
        .env_remove("ROSTERD_WORKSPACE")
        .env_remove("ROSTERD_GPA_THRESHOLD")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rosterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

#[test]
fn students_require_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let res = request(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(res.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(error_code(&res), Some("no_workspace"));
}

#[test]
fn create_list_update_delete_roundtrip() {
    let workspace = temp_dir("rosterd-crud");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert!(workspace.join("students.sqlite3").is_file());

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({
            "studentId": "UG2024001",
            "fullName": "Kwame Mensah",
            "programme": "Computer Engineering",
            "level": 200,
            "gpa": 3.1,
            "email": "kwame@uni.edu.gh",
            "phoneNumber": "0244000111",
            "status": "Inactive"
        }),
    );
    let student = created.get("student").expect("student");
    // Status is derived from gpa, never taken from the request.
    assert_eq!(student.get("status").and_then(|v| v.as_str()), Some("Active"));
    let date_added = student
        .get("dateAdded")
        .and_then(|v| v.as_str())
        .expect("dateAdded")
        .to_string();

    let listed = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let students = listed
        .get("students")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    assert_eq!(students.len(), 1);
    let s = &students[0];
    assert_eq!(s.get("studentId").and_then(|v| v.as_str()), Some("UG2024001"));
    assert_eq!(s.get("fullName").and_then(|v| v.as_str()), Some("Kwame Mensah"));
    assert_eq!(s.get("programme").and_then(|v| v.as_str()), Some("Computer Engineering"));
    assert_eq!(s.get("level").and_then(|v| v.as_i64()), Some(200));
    assert_eq!(s.get("gpa").and_then(|v| v.as_f64()), Some(3.1));
    assert_eq!(s.get("email").and_then(|v| v.as_str()), Some("kwame@uni.edu.gh"));
    assert_eq!(s.get("phoneNumber").and_then(|v| v.as_str()), Some("0244000111"));
    assert_eq!(s.get("dateAdded").and_then(|v| v.as_str()), Some(date_added.as_str()));

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.update",
        json!({
            "studentId": "UG2024001",
            "fullName": "Kwame A. Mensah",
            "programme": "Computer Engineering",
            "level": 300,
            "gpa": 1.4
        }),
    );
    let student = updated.get("student").expect("student");
    assert_eq!(student.get("status").and_then(|v| v.as_str()), Some("Inactive"));
    assert_eq!(student.get("email"), Some(&serde_json::Value::Null));

    let got = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.get",
        json!({ "studentId": "UG2024001" }),
    );
    let student = got.get("student").expect("student");
    assert_eq!(student.get("level").and_then(|v| v.as_i64()), Some(300));
    assert_eq!(student.get("dateAdded").and_then(|v| v.as_str()), Some(date_added.as_str()));

    let del = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.delete",
        json!({ "studentId": "UG2024001" }),
    );
    assert_eq!(del.get("removed").and_then(|v| v.as_bool()), Some(true));
    let del = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.delete",
        json!({ "studentId": "UG2024001" }),
    );
    assert_eq!(del.get("removed").and_then(|v| v.as_bool()), Some(false));

    let missing = request(
        &mut stdin,
        &mut reader,
        "8",
        "students.get",
        json!({ "studentId": "UG2024001" }),
    );
    assert_eq!(error_code(&missing), Some("not_found"));
}

#[test]
fn invalid_create_reports_every_violation() {
    let workspace = temp_dir("rosterd-invalid");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let candidate = json!({
        "studentId": "ab",
        "fullName": "Jo3",
        "programme": "",
        "level": 150,
        "gpa": 5.0
    });
    let checked = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.validate",
        candidate.clone(),
    );
    assert_eq!(
        checked
            .get("violations")
            .and_then(|v| v.as_array())
            .map(|v| v.len()),
        Some(5)
    );

    let res = request(&mut stdin, &mut reader, "3", "students.create", candidate);
    assert_eq!(error_code(&res), Some("validation_failed"));
    let violations = res
        .get("error")
        .and_then(|e| e.get("details"))
        .and_then(|d| d.get("violations"))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    assert_eq!(violations.len(), 5);
    assert!(violations.contains(&json!("Full name must not contain digits.")));

    let listed = request_ok(&mut stdin, &mut reader, "4", "students.list", json!({}));
    assert_eq!(
        listed.get("students").and_then(|v| v.as_array()).map(|v| v.len()),
        Some(0)
    );
}

#[test]
fn duplicate_ids_and_unknown_updates_are_rejected() {
    let workspace = temp_dir("rosterd-dup");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let fields = json!({
        "studentId": "STU0001",
        "fullName": "Ama Owusu",
        "programme": "Nursing",
        "level": 100,
        "gpa": 2.2
    });
    let _ = request_ok(&mut stdin, &mut reader, "2", "students.create", fields.clone());
    let dup = request(&mut stdin, &mut reader, "3", "students.create", fields);
    assert_eq!(error_code(&dup), Some("duplicate_key"));

    let ghost = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.update",
        json!({
            "studentId": "GHOST01",
            "fullName": "No One",
            "programme": "Nursing",
            "level": 100,
            "gpa": 2.2
        }),
    );
    assert_eq!(error_code(&ghost), Some("not_found"));

    let bad = request(
        &mut stdin,
        &mut reader,
        "5",
        "students.create",
        json!({ "studentId": "STU0002", "fullName": "Missing Numbers" }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));
}

#[test]
fn search_is_literal_substring_over_id_and_name() {
    let workspace = temp_dir("rosterd-search");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    for (i, (id, name)) in [
        ("CS1001", "Ada Lovelace"),
        ("CS1002", "Bob Marley"),
        ("EE2001", "Nikola Tesla"),
    ]
    .iter()
    .enumerate()
    {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("c{i}"),
            "students.create",
            json!({
                "studentId": id,
                "fullName": name,
                "programme": "Engineering",
                "level": 100,
                "gpa": 3.0
            }),
        );
    }

    let count = |res: &serde_json::Value| {
        res.get("students")
            .and_then(|v| v.as_array())
            .map(|v| v.len())
            .unwrap_or(0)
    };
    let res = request_ok(&mut stdin, &mut reader, "s1", "students.search", json!({ "query": "CS10" }));
    assert_eq!(count(&res), 2);
    let res = request_ok(&mut stdin, &mut reader, "s2", "students.search", json!({ "query": "Tesla" }));
    assert_eq!(count(&res), 1);
    let res = request_ok(&mut stdin, &mut reader, "s3", "students.search", json!({ "query": "tesla" }));
    assert_eq!(count(&res), 0);
    let res = request_ok(&mut stdin, &mut reader, "s4", "students.search", json!({ "query": "%" }));
    assert_eq!(count(&res), 0);
    let res = request_ok(&mut stdin, &mut reader, "s5", "students.search", json!({ "query": "  " }));
    assert_eq!(count(&res), 3);
}

#[test]
fn search_keeps_surrounding_spaces_in_the_query() {
    let workspace = temp_dir("rosterd-search-spaces");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({
            "studentId": "CS1001",
            "fullName": "Grace Ada",
            "programme": "Computing",
            "level": 100,
            "gpa": 3.0
        }),
    );

    let hits = |res: &serde_json::Value| {
        res.get("students")
            .and_then(|v| v.as_array())
            .map(|v| v.len())
            .unwrap_or(0)
    };
    let res = request_ok(&mut stdin, &mut reader, "3", "students.search", json!({ "query": "Ada" }));
    assert_eq!(hits(&res), 1);
    let res = request_ok(&mut stdin, &mut reader, "4", "students.search", json!({ "query": "Ada " }));
    assert_eq!(hits(&res), 0);
    let res = request_ok(&mut stdin, &mut reader, "5", "students.search", json!({ "query": "Grace " }));
    assert_eq!(hits(&res), 1);
}

#[test]
fn validate_works_without_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let checked = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.validate",
        json!({
            "studentId": "ab",
            "fullName": "Esi Badu",
            "programme": "Law",
            "level": 100,
            "gpa": 2.0
        }),
    );
    assert_eq!(
        checked.get("violations"),
        Some(&json!(["Student ID must be between 4 and 20 characters."]))
    );

    let clean = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.validate",
        json!({
            "studentId": "LAW0001",
            "fullName": "Esi Badu",
            "programme": "Law",
            "level": 100,
            "gpa": 2.0
        }),
    );
    assert_eq!(clean.get("violations"), Some(&json!([])));
}
