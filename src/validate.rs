use crate::student::{StudentDraft, VALID_LEVELS};

const ID_MIN: usize = 4;
const ID_MAX: usize = 20;
const NAME_MIN: usize = 2;
const NAME_MAX: usize = 60;
const PHONE_MIN: usize = 10;
const PHONE_MAX: usize = 15;

/// Runs every rule against `draft` and returns all violations, in rule order.
/// An empty list means the draft may be written.
pub fn validate(draft: &StudentDraft) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    let id = draft.student_id.as_str();
    let id_len = id.chars().count();
    if id.is_empty() {
        errors.push("Student ID is required.".into());
    } else if !(ID_MIN..=ID_MAX).contains(&id_len) {
        errors.push(format!(
            "Student ID must be between {ID_MIN} and {ID_MAX} characters."
        ));
    } else if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Student ID must contain only letters and digits.".into());
    }

    let name = draft.full_name.as_str();
    let name_len = name.chars().count();
    if name.trim().is_empty() {
        errors.push("Full name is required.".into());
    } else if !(NAME_MIN..=NAME_MAX).contains(&name_len) {
        errors.push(format!(
            "Full name must be between {NAME_MIN} and {NAME_MAX} characters."
        ));
    } else if name.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Full name must not contain digits.".into());
    }

    if draft.programme.trim().is_empty() {
        errors.push("Programme is required.".into());
    }

    if !VALID_LEVELS.contains(&draft.level) {
        let levels = VALID_LEVELS
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        errors.push(format!("Level must be one of: {levels}."));
    }

    // NaN slips through both comparisons, same as the classifier expects.
    if draft.gpa < 0.0 || draft.gpa > 4.0 {
        errors.push("GPA must be between 0.0 and 4.0.".into());
    }

    if let Some(email) = draft.email.as_deref().filter(|s| !s.is_empty()) {
        if !email.contains('@') || !email.contains('.') {
            errors.push("Email must contain an '@' sign and a dot.".into());
        }
    }

    if let Some(phone) = draft.phone_number.as_deref().filter(|s| !s.is_empty()) {
        let digits_only = phone.chars().all(|c| c.is_ascii_digit());
        if !digits_only || !(PHONE_MIN..=PHONE_MAX).contains(&phone.len()) {
            errors.push(format!(
                "Phone number must be {PHONE_MIN} to {PHONE_MAX} digits (numbers only)."
            ));
        }
    }

    errors
}
