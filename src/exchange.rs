use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::config::Threshold;
use crate::db::StudentRepository;
use crate::error::{RecordsError, Result};
use crate::records::RecordsService;
use crate::status::Status;
use crate::student::{Student, StudentDraft};

pub const CSV_HEADER: [&str; 6] = ["Student ID", "Full Name", "Programme", "Level", "GPA", "Status"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub line: u64,
    pub student_id: Option<String>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

/// One data row of an import file, already split into typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub line: u64,
    pub draft: StudentDraft,
    pub status: Status,
}

pub fn write_students<W: Write>(out: W, students: &[Student]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for s in students {
        let level = s.level.to_string();
        let gpa = format!("{:.2}", s.gpa);
        wtr.write_record([
            s.student_id.as_str(),
            s.full_name.as_str(),
            s.programme.as_str(),
            level.as_str(),
            gpa.as_str(),
            s.status.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(students.len())
}

/// Parses every data row after the header. Rows that cannot be turned into
/// an [`ImportRow`] come back as [`SkippedRow`]s instead of failing the read.
pub fn read_rows<R: Read>(input: R) -> (Vec<ImportRow>, Vec<SkippedRow>) {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    for rec in rdr.records() {
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                skipped.push(SkippedRow {
                    line: e.position().map(|p| p.line()).unwrap_or(0),
                    student_id: None,
                    messages: vec![e.to_string()],
                });
                continue;
            }
        };
        let line = rec.position().map(|p| p.line()).unwrap_or(0);
        match parse_record(&rec) {
            Ok((draft, status)) => rows.push(ImportRow {
                line,
                draft,
                status,
            }),
            Err(messages) => skipped.push(SkippedRow {
                line,
                student_id: rec.get(0).filter(|s| !s.is_empty()).map(str::to_string),
                messages,
            }),
        }
    }
    (rows, skipped)
}

fn parse_record(rec: &csv::StringRecord) -> std::result::Result<(StudentDraft, Status), Vec<String>> {
    if rec.len() < CSV_HEADER.len() {
        return Err(vec![format!(
            "expected {} fields, found {}",
            CSV_HEADER.len(),
            rec.len()
        )]);
    }
    let field = |i: usize| rec.get(i).unwrap_or("").to_string();

    let mut problems = Vec::new();
    let level = field(3).parse::<i64>().unwrap_or_else(|_| {
        problems.push(format!("Level {:?} is not a whole number.", field(3)));
        0
    });
    let gpa = match field(4).parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            problems.push(format!("GPA {:?} is not a number.", field(4)));
            0.0
        }
    };
    let status = match field(5).parse::<Status>() {
        Ok(s) => Some(s),
        Err(e) => {
            problems.push(e.to_string());
            None
        }
    };

    match status {
        Some(status) if problems.is_empty() => Ok((
            StudentDraft {
                student_id: field(0),
                full_name: field(1),
                programme: field(2),
                level,
                gpa,
                email: None,
                phone_number: None,
            },
            status,
        )),
        _ => Err(problems),
    }
}

pub fn export_csv<R: StudentRepository>(
    service: &RecordsService<R>,
    out_path: &Path,
    threshold: Threshold,
) -> Result<usize> {
    let students = service.list_all(threshold)?;
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(out_path)?;
    let n = write_students(file, &students)?;
    log::info!("exported {n} students to {}", out_path.display());
    Ok(n)
}

/// Imports every parseable, valid row. Status is taken from the file as
/// written and `date_added` is the import time. Rows are inserted one by
/// one; a bad row is reported and does not stop the rest.
pub fn import_csv<R: StudentRepository>(
    service: &RecordsService<R>,
    in_path: &Path,
) -> Result<ImportSummary> {
    let file = File::open(in_path)?;
    let (rows, mut skipped) = read_rows(file);

    let mut imported = 0;
    for row in rows {
        let student_id = row.draft.student_id.clone();
        match service.import_one(row.draft, row.status) {
            Ok(_) => imported += 1,
            Err(RecordsError::ValidationFailed(messages)) => skipped.push(SkippedRow {
                line: row.line,
                student_id: Some(student_id),
                messages,
            }),
            Err(e @ RecordsError::DuplicateKey(_)) => skipped.push(SkippedRow {
                line: row.line,
                student_id: Some(student_id),
                messages: vec![e.to_string()],
            }),
            Err(e) => return Err(e),
        }
    }
    skipped.sort_by_key(|s| s.line);

    log::info!(
        "imported {imported} students from {} ({} skipped)",
        in_path.display(),
        skipped.len()
    );
    Ok(ImportSummary { imported, skipped })
}
