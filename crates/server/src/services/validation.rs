//! Field validation.
//!
//! Input checks run before any store access and collect every failing field,
//! so a client can fix a whole form in one round trip.

use std::fmt;

use serde::Serialize;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record an error against `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Require a non-blank value, returning it trimmed.
    pub fn required<'v>(&mut self, field: &'static str, value: Option<&'v str>) -> Option<&'v str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.add(field, format!("{field} is required"));
                None
            }
        }
    }

    /// Require a value and run it through `parse`, recording the parser's
    /// error message on failure.
    pub fn parse<T, E: fmt::Display>(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Option<T> {
        let value = self.required(field, value)?;
        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    /// Trimmed optional value; blank counts as absent.
    #[must_use]
    pub fn optional(value: Option<&str>) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(&error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use crm_portal_core::Email;

    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.required("name", Some("  Ann ")), Some("Ann"));
        assert_eq!(errors.required("name", Some("   ")), None);
        assert_eq!(errors.required("phone", None), None);

        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "phone"]);
        assert_eq!(errors.errors()[1].message, "phone is required");
    }

    #[test]
    fn test_parse_uses_parser_message() {
        let mut errors = ValidationErrors::new();
        let email = errors.parse("email", Some("no-at-symbol"), Email::parse);
        assert!(email.is_none());
        assert_eq!(
            errors.errors()[0].message,
            "email must look like name@domain.tld"
        );
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = ValidationErrors::new();
        assert!(errors.errors().is_empty());
        assert_eq!(errors.to_string(), "");

        errors.add("name", "name is required");
        errors.add("password", "password must be at least 6 characters");
        assert_eq!(errors.errors().len(), 2);
        assert_eq!(
            errors.to_string(),
            "name is required; password must be at least 6 characters"
        );
    }

    #[test]
    fn test_optional_blank_is_absent() {
        assert_eq!(ValidationErrors::optional(Some("  ")), None);
        assert_eq!(ValidationErrors::optional(None), None);
        assert_eq!(
            ValidationErrors::optional(Some(" 1 Main St ")),
            Some("1 Main St".to_owned())
        );
    }
}
