use crate::error::AppError;

/// Validate a required free-text field: non-blank after trimming and at most
/// `max_chars` Unicode characters.
pub fn validate_text(value: &str, field: &str, max_chars: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

/// Normalize an email address the way it is stored: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Collapse a blank optional string to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
