use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Threshold;
use crate::status::{classify, Status};

pub const VALID_LEVELS: [i64; 7] = [100, 200, 300, 400, 500, 600, 700];

/// One persisted student record, keyed by `student_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: String,
    pub full_name: String,
    pub programme: String,
    pub level: i64,
    pub gpa: f64,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub status: Status,
    pub date_added: DateTime<Utc>,
}

impl Student {
    /// Builds a record from a draft, stamping `date_added` with the current time.
    pub fn from_draft(draft: StudentDraft, status: Status) -> Self {
        Self {
            student_id: draft.student_id,
            full_name: draft.full_name,
            programme: draft.programme,
            level: draft.level,
            gpa: draft.gpa,
            email: draft.email,
            phone_number: draft.phone_number,
            status,
            date_added: Utc::now(),
        }
    }

    /// Recomputes `status` from `gpa` against the live threshold.
    pub fn reclassified(mut self, threshold: Threshold) -> Self {
        self.status = classify(self.gpa, threshold);
        self
    }
}

/// Candidate fields as supplied by a form or an import row. Nothing here is
/// trusted until it has passed validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub programme: String,
    pub level: i64,
    pub gpa: f64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl StudentDraft {
    /// Blank optional fields mean "not provided".
    pub fn normalized(mut self) -> Self {
        self.email = non_blank(self.email);
        self.phone_number = non_blank(self.phone_number);
        self
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.and_then(|s| {
        let t = s.trim().to_string();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    })
}
