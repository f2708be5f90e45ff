//! Field-level validation primitives.
//!
//! A validator never fails fast: it walks every applicable rule and collects one
//! [`FieldViolation`] per broken rule, in evaluation order. An empty collection
//! means the subject is valid.

use serde::{Deserialize, Serialize};
use validator::{ValidateEmail, ValidateLength};

/// A single broken rule: which field, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl core::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Ordered, non-empty set of violations produced by a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.0.iter()
    }

    /// Offending field names, in evaluation order (may repeat).
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|v| v.field.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }

    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.0
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            core::fmt::Display::fmt(violation, f)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldViolation;
    type IntoIter = core::slice::Iter<'a, FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Whether a value counts as absent for presence rules (missing, empty, or whitespace only).
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Syntactic email check (HTML5 rules as implemented by `validator`).
pub fn is_email(value: &str) -> bool {
    value.validate_email()
}

/// Collects violations while a validator walks its rules.
#[derive(Debug, Default)]
pub struct Rules {
    violations: Vec<FieldViolation>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation unconditionally.
    pub fn violate(&mut self, field: &str, reason: impl Into<String>) -> &mut Self {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            reason: reason.into(),
        });
        self
    }

    /// Record a violation when `ok` is false.
    pub fn check(&mut self, field: &str, ok: bool, reason: impl Into<String>) -> &mut Self {
        if !ok {
            self.violate(field, reason);
        }
        self
    }

    /// Value must be present, not blank, and at most `max` characters.
    pub fn required(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if is_blank(value) {
            self.violate(field, "must not be empty");
        }
        self.max_length(field, value, max)
    }

    /// Value, if present, must be at most `max` characters.
    pub fn max_length(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            if !value.validate_length(None, Some(max as u64), None) {
                let len = value.chars().count();
                self.violate(
                    field,
                    format!("must be at most {max} characters (got {len})"),
                );
            }
        }
        self
    }

    /// Value, if present, must be a syntactically valid email address.
    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.check(field, is_email(value), "is not a valid email address");
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.violations))
        }
    }
}

/// A stateless rule set over `T`.
///
/// Implementors push violations into the shared [`Rules`] so several rule sets
/// (a base set plus a variant-specific one) can be evaluated in sequence and
/// reported together.
pub trait Validator<T: ?Sized> {
    fn collect(&self, subject: &T, rules: &mut Rules);

    fn validate(&self, subject: &T) -> Result<(), ValidationErrors> {
        let mut rules = Rules::new();
        self.collect(subject, &mut rules);
        rules.finish()
    }
}
