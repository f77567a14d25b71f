use campus_core::{AppError, AppResult, NonEmptyString};

pub(crate) fn require_non_empty(field: &str, value: &str) -> AppResult<()> {
    NonEmptyString::new(value)
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("{field} must not be empty")))
}

pub(crate) fn require_optional_non_empty(field: &str, value: Option<&str>) -> AppResult<()> {
    match value {
        Some(value) => require_non_empty(field, value),
        None => Ok(()),
    }
}

/// Identifiers are used in claim values and paths, so whitespace and the
/// `:` claim separator are rejected.
pub(crate) fn require_identifier(field: &str, value: &str) -> AppResult<()> {
    require_non_empty(field, value)?;

    if value.len() > 255 {
        return Err(AppError::Validation(format!(
            "{field} must not exceed 255 characters"
        )));
    }

    if value
        .chars()
        .any(|character| character.is_whitespace() || character == ':')
    {
        return Err(AppError::Validation(format!(
            "{field} must not contain whitespace or ':'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_identifier, require_optional_non_empty};

    #[test]
    fn identifier_rejects_claim_separator() {
        assert!(require_identifier("course id", "cs:101").is_err());
        assert!(require_identifier("course id", "cs101.2026").is_ok());
    }

    #[test]
    fn absent_optional_value_is_accepted() {
        assert!(require_optional_non_empty("title", None).is_ok());
        assert!(require_optional_non_empty("title", Some(" ")).is_err());
    }
}
