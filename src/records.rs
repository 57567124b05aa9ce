use serde::Serialize;
use std::cmp::Ordering;

use crate::config::Threshold;
use crate::db::StudentRepository;
use crate::error::{RecordsError, Result};
use crate::status::{classify, Status};
use crate::student::{Student, StudentDraft};
use crate::validate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub average_gpa: f64,
    pub active: usize,
    pub inactive: usize,
}

/// All students split by standing. Both groups are always present.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AcademicReport {
    #[serde(rename = "Good Standing")]
    pub good_standing: Vec<Student>,
    #[serde(rename = "At Risk")]
    pub at_risk: Vec<Student>,
}

/// Single entry point for the presentation layer. Writes are always validated
/// first; every read reclassifies against the threshold the caller passes in.
pub struct RecordsService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> RecordsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    fn checked(draft: StudentDraft) -> Result<StudentDraft> {
        let draft = draft.normalized();
        let violations = validate(&draft);
        if !violations.is_empty() {
            return Err(RecordsError::ValidationFailed(violations));
        }
        Ok(draft)
    }

    pub fn create(&self, draft: StudentDraft, threshold: Threshold) -> Result<Student> {
        let draft = Self::checked(draft)?;
        let status = classify(draft.gpa, threshold);
        let student = Student::from_draft(draft, status);
        self.repo.add(&student)?;
        log::info!(
            "created student {} ({})",
            student.student_id,
            student.status
        );
        Ok(student)
    }

    /// Replaces every mutable field of an existing record. The ID and
    /// `date_added` never change.
    pub fn update(&self, draft: StudentDraft, threshold: Threshold) -> Result<Student> {
        let draft = Self::checked(draft)?;
        let Some(existing) = self.repo.find(&draft.student_id)? else {
            return Err(RecordsError::NotFound(draft.student_id));
        };
        let status = classify(draft.gpa, threshold);
        let student = Student {
            date_added: existing.date_added,
            ..Student::from_draft(draft, status)
        };
        if self.repo.update(&student)? == 0 {
            // Deleted between the lookup and the write.
            return Err(RecordsError::NotFound(student.student_id));
        }
        log::info!("updated student {}", student.student_id);
        Ok(student)
    }

    /// Removes the record if present. Returns whether anything was removed;
    /// deleting a missing ID is not an error.
    pub fn delete(&self, student_id: &str) -> Result<bool> {
        let removed = self.repo.delete(student_id)? > 0;
        if removed {
            log::info!("deleted student {student_id}");
        } else {
            log::debug!("delete of unknown student {student_id} ignored");
        }
        Ok(removed)
    }

    pub fn get(&self, student_id: &str, threshold: Threshold) -> Result<Student> {
        self.repo
            .find(student_id)?
            .map(|s| s.reclassified(threshold))
            .ok_or_else(|| RecordsError::NotFound(student_id.to_string()))
    }

    pub fn list_all(&self, threshold: Threshold) -> Result<Vec<Student>> {
        Ok(reclassify_all(self.repo.get_all()?, threshold))
    }

    pub fn search(&self, query: &str, threshold: Threshold) -> Result<Vec<Student>> {
        Ok(reclassify_all(self.repo.search(query)?, threshold))
    }

    /// Highest GPA first, ties by student ID ascending.
    pub fn top_performers(&self, limit: usize, threshold: Threshold) -> Result<Vec<Student>> {
        let mut students = self.list_all(threshold)?;
        students.sort_by(|a, b| {
            b.gpa
                .partial_cmp(&a.gpa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.student_id.cmp(&b.student_id))
        });
        students.truncate(limit);
        Ok(students)
    }

    pub fn dashboard_stats(&self, threshold: Threshold) -> Result<DashboardStats> {
        let students = self.repo.get_all()?;
        let total = students.len();
        if total == 0 {
            return Ok(DashboardStats::default());
        }
        let sum: f64 = students.iter().map(|s| s.gpa).sum();
        let active = students
            .iter()
            .filter(|s| classify(s.gpa, threshold) == Status::Active)
            .count();
        Ok(DashboardStats {
            total,
            average_gpa: sum / total as f64,
            active,
            inactive: total - active,
        })
    }

    /// Best-effort variant for display paths: a store failure yields zeroed
    /// stats instead of an error.
    pub fn dashboard_stats_or_default(&self, threshold: Threshold) -> (DashboardStats, bool) {
        match self.dashboard_stats(threshold) {
            Ok(stats) => (stats, false),
            Err(e) => {
                log::warn!("dashboard stats unavailable: {e}");
                (DashboardStats::default(), true)
            }
        }
    }

    pub fn academic_report(&self, threshold: Threshold) -> Result<AcademicReport> {
        let (good_standing, at_risk): (Vec<Student>, Vec<Student>) = self
            .list_all(threshold)?
            .into_iter()
            .partition(|s| s.status == Status::Active);
        Ok(AcademicReport {
            good_standing,
            at_risk,
        })
    }

    /// Inserts an already-built record as-is, keeping its status literally.
    /// Still validated: imports go through the same rules as forms.
    pub(crate) fn import_one(&self, draft: StudentDraft, status: Status) -> Result<Student> {
        let draft = Self::checked(draft)?;
        let student = Student::from_draft(draft, status);
        self.repo.add(&student)?;
        Ok(student)
    }
}

fn reclassify_all(students: Vec<Student>, threshold: Threshold) -> Vec<Student> {
    students
        .into_iter()
        .map(|s| s.reclassified(threshold))
        .collect()
}
