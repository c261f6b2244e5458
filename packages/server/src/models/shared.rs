use serde::Serialize;

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 10)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 5)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a required text field against a maximum character count.
pub fn validate_required_max(value: &str, field: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!(
            "El campo {field} es obligatorio"
        )));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "El campo {field} debe tener como máximo {max} caracteres"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rounds_pages_up() {
        assert_eq!(Pagination::new(1, 10, 47).total_pages, 5);
        assert_eq!(Pagination::new(1, 10, 50).total_pages, 5);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[test]
    fn required_max_rejects_empty_and_whitespace() {
        assert!(validate_required_max("", "titulo", 255).is_err());
        assert!(validate_required_max("   ", "titulo", 255).is_err());
    }

    #[test]
    fn required_max_counts_characters_not_bytes() {
        let value = "á".repeat(255);
        assert!(validate_required_max(&value, "titulo", 255).is_ok());
        let too_long = "á".repeat(256);
        assert!(validate_required_max(&too_long, "titulo", 255).is_err());
    }
}
