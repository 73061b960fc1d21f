//! Boundary checks for request bodies, producing Laravel-style field messages.

use rust_decimal::Decimal;

use crate::error::{ApiError, FieldErrors};
use crate::format::ymd_to_epoch;

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.entry(field.to_string()).or_default().push(message.into());
        self
    }

    /// Required text must be present and not blank.
    pub fn required_str(&mut self, field: &str, value: Option<&String>) -> &mut Self {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.add(field, format!("The {} field is required.", label(field)));
        }
        self
    }

    pub fn required<T>(&mut self, field: &str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.add(field, format!("The {} field is required.", label(field)));
        }
        self
    }

    /// A supplied value must not be blank; absence is fine (partial updates).
    pub fn filled(&mut self, field: &str, value: Option<&String>) -> &mut Self {
        if value.is_some_and(|v| v.trim().is_empty()) {
            self.add(field, format!("The {} field must have a value.", label(field)));
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&String>, max: usize) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.add(
                field,
                format!("The {} may not be greater than {} characters.", label(field), max),
            );
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: Option<&String>, allowed: &[&str]) -> &mut Self {
        if value.is_some_and(|v| !allowed.contains(&v.as_str())) {
            self.add(field, format!("The selected {} is invalid.", label(field)));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&String>) -> &mut Self {
        if value.is_some_and(|v| !looks_like_email(v)) {
            self.add(field, format!("The {} must be a valid email address.", label(field)));
        }
        self
    }

    pub fn date(&mut self, field: &str, value: Option<&String>) -> &mut Self {
        if value.is_some_and(|v| ymd_to_epoch(v).is_none()) {
            self.add(field, format!("The {} does not match the format Y-m-d.", label(field)));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: Option<&Decimal>) -> &mut Self {
        if value.is_some_and(|v| v.is_sign_negative()) {
            self.add(field, format!("The {} must be at least 0.", label(field)));
        }
        self
    }

    pub fn min_int(&mut self, field: &str, value: Option<&i64>, min: i64) -> &mut Self {
        if value.is_some_and(|v| *v < min) {
            self.add(field, format!("The {} must be at least {}.", label(field), min));
        }
        self
    }

    pub fn taken(&mut self, field: &str) -> &mut Self {
        self.add(field, format!("The {} has already been taken.", label(field)))
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.errors))
        }
    }
}

/// `discount_type` -> `discount type`
pub(crate) fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collects_messages_per_field() {
        let mut v = Validator::new();
        v.required_str("name", None)
            .required_str("code", Some(&"  ".to_string()))
            .max_len("code", Some(&"x".repeat(30)), 20);
        let body = v.finish().unwrap_err().to_json();
        assert_eq!(body["errors"]["name"], json!(["The name field is required."]));
        assert_eq!(body["errors"]["code"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn labels_use_spaces() {
        let mut v = Validator::new();
        v.one_of("discount_type", Some(&"bogus".to_string()), &["amount", "percent"]);
        let body = v.finish().unwrap_err().to_json();
        assert_eq!(body["errors"]["discount_type"], json!(["The selected discount type is invalid."]));
    }

    #[test]
    fn passes_when_clean() {
        let mut v = Validator::new();
        v.required_str("name", Some(&"Red".to_string()))
            .email("email", Some(&"jane@example.com".to_string()))
            .date("start_date", Some(&"2024-02-29".to_string()))
            .filled("code", None);
        assert!(!v.has_errors());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn rejects_bad_email_and_date() {
        let mut v = Validator::new();
        v.email("email", Some(&"jane@localhost".to_string()))
            .date("end_date", Some(&"2024-13-01".to_string()));
        assert!(v.has_errors());
    }
}
