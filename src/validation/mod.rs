//! Request body validation.
//!
//! A [`Checker`] walks a JSON body by dotted path (`usage.value`,
//! `risks[0].description`) and collects every failure as a [`FieldError`]
//! instead of stopping at the first one. Schemas in the submodules use it to
//! turn a body into a typed draft; entity-level rules that span fields run
//! afterwards on the merged record.

pub mod budget;
pub mod project;
pub mod user;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed on {} field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Need {
    Required,
    Optional,
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or RFC 3339.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !raw.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

pub struct Checker<'a> {
    body: &'a Value,
    errors: Vec<FieldError>,
}

impl<'a> Checker<'a> {
    pub fn new(body: &'a Value) -> Self {
        Self {
            body,
            errors: Vec::new(),
        }
    }

    pub fn fail(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Value at `path`; JSON `null` counts as absent.
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut current = self.body;
        for segment in path.split(|c: char| c == '.' || c == '[').map(|s| s.trim_end_matches(']')) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        (!current.is_null()).then_some(current)
    }

    pub fn has(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Absent values fail only when required.
    fn present(&mut self, path: &str, need: Need, message: &str) -> Option<&'a Value> {
        match self.lookup(path) {
            Some(value) => Some(value),
            None => {
                if need == Need::Required {
                    self.fail(path, message);
                }
                None
            }
        }
    }

    /// Trimmed, non-empty string.
    pub fn text(&mut self, path: &str, need: Need, message: &str) -> Option<String> {
        let value = self.present(path, need, message)?;
        match value.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => Some(s.to_string()),
            _ => {
                self.fail(path, message);
                None
            }
        }
    }

    /// Any string, trimmed. Empty is allowed.
    pub fn free_text(&mut self, path: &str, message: &str) -> Option<String> {
        let value = self.present(path, Need::Optional, message)?;
        match value.as_str() {
            Some(s) => Some(s.trim().to_string()),
            None => {
                self.fail(path, message);
                None
            }
        }
    }

    pub fn max_chars(&mut self, path: &str, value: Option<&String>, max: usize, message: &str) {
        if value.is_some_and(|s| s.chars().count() > max) {
            self.fail(path, message);
        }
    }

    pub fn email(&mut self, path: &str, need: Need, message: &str) -> Option<String> {
        let value = self.present(path, need, message)?;
        match value.as_str().map(str::trim) {
            Some(s) if looks_like_email(s) => Some(s.to_string()),
            _ => {
                self.fail(path, message);
                None
            }
        }
    }

    /// A number (or numeric string) inside `[min, max]` where given.
    pub fn number(
        &mut self,
        path: &str,
        need: Need,
        min: Option<f64>,
        max: Option<f64>,
        message: &str,
    ) -> Option<f64> {
        let value = self.present(path, need, message)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(n) if n.is_finite() && min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m) => Some(n),
            _ => {
                self.fail(path, message);
                None
            }
        }
    }

    pub fn date(&mut self, path: &str, need: Need, message: &str) -> Option<DateTime<Utc>> {
        let value = self.present(path, need, message)?;
        match value.as_str().and_then(parse_date) {
            Some(date) => Some(date),
            None => {
                self.fail(path, message);
                None
            }
        }
    }

    /// Member of a closed enumeration; anything else is rejected.
    pub fn choice<T: FromStr>(&mut self, path: &str, need: Need, message: &str) -> Option<T> {
        let value = self.present(path, need, message)?;
        match value.as_str().map(str::parse::<T>) {
            Some(Ok(choice)) => Some(choice),
            _ => {
                self.fail(path, message);
                None
            }
        }
    }

    pub fn id(&mut self, path: &str, need: Need, message: &str) -> Option<Uuid> {
        let value = self.present(path, need, message)?;
        match value.as_str().map(Uuid::parse_str) {
            Some(Ok(id)) => Some(id),
            _ => {
                self.fail(path, message);
                None
            }
        }
    }

    pub fn boolean(&mut self, path: &str, message: &str) -> Option<bool> {
        let value = self.present(path, Need::Optional, message)?;
        match value.as_bool() {
            Some(b) => Some(b),
            None => {
                self.fail(path, message);
                None
            }
        }
    }

    /// Length of the array at `path`, if it is one.
    pub fn array_len(&mut self, path: &str, message: &str) -> Option<usize> {
        let value = self.present(path, Need::Optional, message)?;
        match value.as_array() {
            Some(items) => Some(items.len()),
            None => {
                self.fail(path, message);
                None
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors so far, for schemas that could not build a draft.
    pub fn reject(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }

    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UsageUnit;
    use serde_json::json;

    #[test]
    fn collects_every_failure() {
        let body = json!({ "name": "", "usage": { "value": -1, "unit": "PB" } });
        let mut c = Checker::new(&body);
        c.text("name", Need::Required, "Name is required");
        c.number("usage.value", Need::Required, Some(0.0), None, "Valid usage value is required");
        c.choice::<UsageUnit>("usage.unit", Need::Required, "Usage unit is required");
        c.text("missing", Need::Optional, "never reported");

        let errors = c.finish(()).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["name", "usage.value", "usage.unit"]);
    }

    #[test]
    fn walks_arrays_and_treats_null_as_absent() {
        let body = json!({ "risks": [{ "description": "Vendor" }], "endDate": null });
        let c = Checker::new(&body);
        assert_eq!(c.lookup("risks[0].description"), Some(&json!("Vendor")));
        assert!(c.lookup("risks[1].description").is_none());
        assert!(!c.has("endDate"));
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        let body = json!({ "a": "12.5", "b": "abc", "c": 101 });
        let mut c = Checker::new(&body);
        assert_eq!(c.number("a", Need::Required, Some(0.0), None, "bad"), Some(12.5));
        assert_eq!(c.number("b", Need::Required, None, None, "bad"), None);
        assert_eq!(c.number("c", Need::Required, Some(0.0), Some(100.0), "bad"), None);
        assert!(!c.is_clean());
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let plain = parse_date("2024-03-01").unwrap();
        assert_eq!(plain.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        let full = parse_date("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(full.to_rfc3339(), "2024-03-01T10:30:00+00:00");
        assert!(parse_date("03/01/2024").is_none());
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("ada example@x.com"));
        assert!(!looks_like_email("@example.com"));
    }
}
