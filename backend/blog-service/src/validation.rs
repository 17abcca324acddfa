//! Field-level validation
//!
//! Payload structs derive `validator::Validate`; the resulting errors are
//! folded into [`FieldErrors`], which is what clients see under `"fields"`.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, Result};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";

const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;

/// Messages per field, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record a "required" error when `value` is absent
    pub fn require<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
    }

    /// Check a non-nullable text field read with `deserialize_some`
    ///
    /// Absence is an error only when `required`; `null` and blank text always are.
    pub fn text(&mut self, field: &str, value: &Option<Option<String>>, required: bool) {
        match value {
            None if required => self.add(field, REQUIRED),
            None => {}
            Some(None) => self.add(field, NULL),
            Some(Some(text)) => {
                if validate_not_blank(text).is_err() {
                    self.add(field, BLANK);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Self::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                fields.add(&field.to_string(), message);
            }
        }
        fields
    }
}

/// Run the derived validators and collect their messages
pub fn collect<T: Validate>(payload: &T) -> FieldErrors {
    match payload.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", BLANK));
    }
    Ok(())
}

/// Letters, digits and `@ . + - _`, at most 150 characters
pub fn validate_username(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", BLANK));
    }
    if value.chars().count() > USERNAME_MAX_LEN {
        return Err(error(
            "max_length",
            "Ensure this field has no more than 150 characters.",
        ));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !value.chars().all(allowed) {
        return Err(error(
            "invalid",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

pub fn validate_password(value: &str) -> std::result::Result<(), ValidationError> {
    if value.chars().count() < PASSWORD_MIN_LEN {
        return Err(error(
            "password_too_short",
            "This password is too short. It must contain at least 8 characters.",
        ));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Err(error(
            "password_entirely_numeric",
            "This password is entirely numeric.",
        ));
    }
    Ok(())
}
