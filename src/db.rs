use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};

use crate::error::{RecordsError, Result};
use crate::student::Student;

pub const DB_FILE_NAME: &str = "students.sqlite3";

const STUDENT_COLUMNS: &str =
    "student_id, full_name, programme, level, gpa, email, phone_number, status, date_added";

/// Durable CRUD and substring search over students, keyed by student ID.
///
/// Every call is a single auto-committing statement. Update and delete report
/// how many rows they touched and leave "missing" semantics to the caller.
pub trait StudentRepository {
    fn initialize(&self) -> Result<()>;
    fn add(&self, student: &Student) -> Result<()>;
    fn get_all(&self) -> Result<Vec<Student>>;
    fn find(&self, student_id: &str) -> Result<Option<Student>>;
    fn update(&self, student: &Student) -> Result<usize>;
    fn delete(&self, student_id: &str) -> Result<usize>;
    fn search(&self, query: &str) -> Result<Vec<Student>>;
}

/// SQLite-backed store. Holds only the database path; a connection is
/// opened for each call and dropped before the call returns.
#[derive(Debug, Clone)]
pub struct SqliteStudentStore {
    db_path: PathBuf,
}

impl SqliteStudentStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn in_workspace(workspace: &Path) -> Self {
        Self::new(workspace.join(DB_FILE_NAME))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // Never creates the file: an uninitialized store must fail, not silently
    // come up empty.
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    fn create_schema(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS students(
                student_id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                programme TEXT NOT NULL,
                level INTEGER NOT NULL,
                gpa REAL NOT NULL,
                email TEXT,
                phone_number TEXT,
                status TEXT NOT NULL,
                date_added TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl StudentRepository for SqliteStudentStore {
    fn initialize(&self) -> Result<()> {
        match self.create_schema() {
            Ok(()) => {
                log::info!("student store ready at {}", self.db_path.display());
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "student store initialization failed at {}: {e}",
                    self.db_path.display()
                );
                Err(e)
            }
        }
    }

    fn add(&self, student: &Student) -> Result<()> {
        let conn = self.connect()?;
        let res = conn.execute(
            "INSERT INTO students(
               student_id,
               full_name,
               programme,
               level,
               gpa,
               email,
               phone_number,
               status,
               date_added
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &student.student_id,
                &student.full_name,
                &student.programme,
                student.level,
                student.gpa,
                student.email.as_deref(),
                student.phone_number.as_deref(),
                student.status,
                format_date_added(&student.date_added),
            ),
        );
        match res {
            Ok(_) => Ok(()),
            Err(e) if is_primary_key_violation(&e) => {
                Err(RecordsError::DuplicateKey(student.student_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_all(&self) -> Result<Vec<Student>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY rowid"
        ))?;
        let rows = stmt
            .query_map([], map_student_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        log::debug!("loaded {} students", rows.len());
        Ok(rows)
    }

    fn find(&self, student_id: &str) -> Result<Option<Student>> {
        let conn = self.connect()?;
        let student = conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?"),
                [student_id],
                map_student_row,
            )
            .optional()?;
        Ok(student)
    }

    fn update(&self, student: &Student) -> Result<usize> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE students
             SET full_name = ?, programme = ?, level = ?, gpa = ?,
                 email = ?, phone_number = ?, status = ?
             WHERE student_id = ?",
            (
                &student.full_name,
                &student.programme,
                student.level,
                student.gpa,
                student.email.as_deref(),
                student.phone_number.as_deref(),
                student.status,
                &student.student_id,
            ),
        )?;
        Ok(changed)
    }

    fn delete(&self, student_id: &str) -> Result<usize> {
        let conn = self.connect()?;
        let changed = conn.execute("DELETE FROM students WHERE student_id = ?", [student_id])?;
        Ok(changed)
    }

    fn search(&self, query: &str) -> Result<Vec<Student>> {
        if query.is_empty() {
            return self.get_all();
        }
        // instr() is a literal, case-sensitive match: '%' and '_' are plain characters here.
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {STUDENT_COLUMNS}
             FROM students
             WHERE instr(student_id, ?1) > 0 OR instr(full_name, ?1) > 0
             ORDER BY rowid"
        ))?;
        let rows = stmt
            .query_map([query], map_student_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    let date_raw: String = row.get(8)?;
    let date_added = parse_date_added(&date_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;
    Ok(Student {
        student_id: row.get(0)?,
        full_name: row.get(1)?,
        programme: row.get(2)?,
        level: row.get(3)?,
        gpa: row.get(4)?,
        email: row.get(5)?,
        phone_number: row.get(6)?,
        status: row.get(7)?,
        date_added,
    })
}

fn is_primary_key_violation(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(f, _) => {
            f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

pub fn format_date_added(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Zone-less layouts accepted for older rows. Seconds may be omitted.
const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Accepts RFC 3339 and zone-less ISO-8601 timestamps (read as UTC).
pub fn parse_date_added(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    let rfc_err = match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => return Ok(t.with_timezone(&Utc)),
        Err(e) => e,
    };
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|n| n.and_utc())
        .ok_or(rfc_err)
}
