//! Form intake: parses urlencoded form fields into typed, constrained values.
//!
//! Validation never panics on malformed input. A failed parse returns a
//! `FormRejection` holding every field-level message plus the submitted
//! values, which is enough to re-render the form.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

/// The ordered `(name, value)` pairs of a form body. Repeated names are kept.
#[derive(Debug, Clone, Default)]
pub struct RawForm {
    pairs: Vec<(String, String)>,
}

impl RawForm {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted under `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Echo of the submitted values; repeated names are joined with newlines.
    fn echo(&self) -> BTreeMap<String, String> {
        let mut values: BTreeMap<String, String> = BTreeMap::new();
        for (k, v) in &self.pairs {
            values
                .entry(k.clone())
                .and_modify(|existing| {
                    existing.push('\n');
                    existing.push_str(v);
                })
                .or_insert_with(|| v.clone());
        }
        values
    }
}

/// Field-level errors plus the values that produced them.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FormRejection {
    pub fields: BTreeMap<String, Vec<String>>,
    pub values: BTreeMap<String, String>,
}

impl FormRejection {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self {
            fields,
            values: BTreeMap::new(),
        }
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|m| !m.is_empty())
    }
}

/// Accumulates field errors while extracting values from a `RawForm`.
///
/// Extractors return a placeholder when a field fails; `finish` discards the
/// built value in that case, so placeholders never escape.
pub struct Validator<'a> {
    form: &'a RawForm,
    errors: BTreeMap<String, Vec<String>>,
}

impl<'a> Validator<'a> {
    pub fn new(form: &'a RawForm) -> Self {
        Self {
            form,
            errors: BTreeMap::new(),
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Blank submissions are treated as missing.
    fn present(&self, field: &str) -> Option<&'a str> {
        self.form.get(field).filter(|v| !v.trim().is_empty())
    }

    fn check_length(&mut self, field: &str, value: &str, min: usize, max: Option<usize>) -> bool {
        let len = value.chars().count();
        if len < min {
            self.error(field, format!("Must be at least {min} characters"));
            return false;
        }
        if let Some(max) = max {
            if len > max {
                self.error(field, format!("Must be at most {max} characters"));
                return false;
            }
        }
        true
    }

    /// Required text with inclusive character bounds.
    pub fn text(&mut self, field: &str, min: usize, max: Option<usize>) -> String {
        match self.present(field) {
            Some(value) => {
                self.check_length(field, value, min, max);
                value.to_string()
            }
            None => {
                self.error(field, "Required");
                String::new()
            }
        }
    }

    /// Optional text: absent or blank is `None`, otherwise bounds apply.
    pub fn optional_text(&mut self, field: &str, min: usize, max: Option<usize>) -> Option<String> {
        let value = self.present(field)?;
        self.check_length(field, value, min, max);
        Some(value.to_string())
    }

    /// Required value from a fixed set; returns the matching allowed entry.
    pub fn one_of(&mut self, field: &str, allowed: &[&'static str]) -> &'static str {
        match self.present(field) {
            Some(value) => match allowed.iter().find(|a| a.eq_ignore_ascii_case(value.trim())) {
                Some(found) => found,
                None => {
                    self.error(field, format!("Must be one of: {}", allowed.join(", ")));
                    ""
                }
            },
            None => {
                self.error(field, "Required");
                ""
            }
        }
    }

    /// Required integer, coerced from its string form, with inclusive bounds.
    pub fn number(&mut self, field: &str, min: i64, max: i64) -> i64 {
        match self.present(field) {
            Some(_) => self.optional_number(field, min, max).unwrap_or_default(),
            None => {
                self.error(field, "Required");
                0
            }
        }
    }

    pub fn optional_number(&mut self, field: &str, min: i64, max: i64) -> Option<i64> {
        let raw = self.present(field)?;
        match raw.trim().parse::<i64>() {
            Ok(n) if n < min => {
                self.error(field, format!("Must be at least {min}"));
                None
            }
            Ok(n) if n > max => {
                self.error(field, format!("Must be at most {max}"));
                None
            }
            Ok(n) => Some(n),
            Err(_) => {
                self.error(field, "Must be a whole number");
                None
            }
        }
    }

    pub fn uuid(&mut self, field: &str) -> Uuid {
        match self.present(field) {
            Some(raw) => raw.trim().parse::<Uuid>().unwrap_or_else(|_| {
                self.error(field, "Must be a valid id");
                Uuid::nil()
            }),
            None => {
                self.error(field, "Required");
                Uuid::nil()
            }
        }
    }

    /// Required value parsed through `FromStr`; the parse error becomes the field message.
    pub fn parse<T>(&mut self, field: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(raw) = self.present(field) else {
            self.error(field, "Required");
            return None;
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                self.error(field, e.to_string());
                None
            }
        }
    }

    /// Every non-blank value submitted under `field`, each bounded by `max_item`.
    pub fn list(&mut self, field: &str, max_item: usize) -> Vec<String> {
        let items: Vec<String> = self
            .form
            .get_all(field)
            .into_iter()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        if items.iter().any(|item| item.chars().count() > max_item) {
            self.error(field, format!("Each entry must be at most {max_item} characters"));
        }
        items
    }

    /// Returns the built value if no field failed, otherwise the rejection.
    pub fn finish<T>(self, build: impl FnOnce() -> T) -> Result<T, FormRejection> {
        if self.errors.is_empty() {
            Ok(build())
        } else {
            Err(FormRejection {
                fields: self.errors,
                values: self.form.echo(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> RawForm {
        RawForm::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_text_within_bounds() {
        let raw = form(&[("title", "Fractions")]);
        let mut v = Validator::new(&raw);
        let title = v.text("title", 3, Some(255));
        assert_eq!(v.finish(|| title).unwrap(), "Fractions");
    }

    #[test]
    fn test_text_too_short_and_missing() {
        let raw = form(&[("title", "ab")]);
        let mut v = Validator::new(&raw);
        v.text("title", 3, None);
        v.text("objective", 3, None);
        let rejection = v.finish(|| ()).unwrap_err();
        assert_eq!(rejection.fields["title"], vec!["Must be at least 3 characters"]);
        assert_eq!(rejection.fields["objective"], vec!["Required"]);
        assert_eq!(rejection.values["title"], "ab");
    }

    #[test]
    fn test_text_counts_characters_not_bytes() {
        let raw = form(&[("title", "ééé")]);
        let mut v = Validator::new(&raw);
        v.text("title", 1, Some(3));
        assert!(v.finish(|| ()).is_ok());
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        let raw = form(&[("standards", "   ")]);
        let mut v = Validator::new(&raw);
        let standards = v.optional_text("standards", 3, Some(255));
        assert_eq!(v.finish(|| standards).unwrap(), None);
    }

    #[test]
    fn test_optional_text_still_bounded_when_present() {
        let long = "x".repeat(256);
        let raw = form(&[("standards", long.as_str())]);
        let mut v = Validator::new(&raw);
        v.optional_text("standards", 3, Some(255));
        let rejection = v.finish(|| ()).unwrap_err();
        assert!(rejection.has_error("standards"));
    }

    #[test]
    fn test_one_of_matches_case_insensitively() {
        let raw = form(&[("public", "Yes")]);
        let mut v = Validator::new(&raw);
        let public = v.one_of("public", &["yes", "no"]);
        assert_eq!(v.finish(|| public).unwrap(), "yes");
    }

    #[test]
    fn test_one_of_rejects_unknown() {
        let raw = form(&[("public", "maybe")]);
        let mut v = Validator::new(&raw);
        v.one_of("public", &["yes", "no"]);
        let rejection = v.finish(|| ()).unwrap_err();
        assert_eq!(rejection.fields["public"], vec!["Must be one of: yes, no"]);
    }

    #[test]
    fn test_number_coerces_and_bounds() {
        let raw = form(&[("points", "4"), ("levels", "9"), ("length", "ten")]);
        let mut v = Validator::new(&raw);
        assert_eq!(v.number("points", 1, 10), 4);
        v.optional_number("levels", 0, 5);
        v.number("length", 10, 2500);
        let rejection = v.finish(|| ()).unwrap_err();
        assert_eq!(rejection.fields["levels"], vec!["Must be at most 5"]);
        assert_eq!(rejection.fields["length"], vec!["Must be a whole number"]);
        assert!(!rejection.has_error("points"));
    }

    #[test]
    fn test_uuid_field() {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let raw = form(&[("rubric_id", id_str.as_str()), ("other", "nope")]);
        let mut v = Validator::new(&raw);
        assert_eq!(v.uuid("rubric_id"), id);
        v.uuid("other");
        assert!(v.finish(|| ()).unwrap_err().has_error("other"));
    }

    #[test]
    fn test_parse_uses_from_str_error() {
        let raw = form(&[("points", "12"), ("scale", "big")]);
        let mut v = Validator::new(&raw);
        assert_eq!(v.parse::<u8>("points"), Some(12));
        assert_eq!(v.parse::<u8>("scale"), None);
        assert_eq!(v.parse::<u8>("missing"), None);
        let rejection = v.finish(|| ()).unwrap_err();
        assert_eq!(rejection.fields["scale"], vec!["invalid digit found in string"]);
        assert_eq!(rejection.fields["missing"], vec!["Required"]);
    }

    #[test]
    fn test_list_collects_repeated_values() {
        let raw = form(&[("events", "Field trip"), ("events", ""), ("events", "Book fair")]);
        let mut v = Validator::new(&raw);
        let events = v.list("events", 500);
        assert_eq!(v.finish(|| events).unwrap(), vec!["Field trip", "Book fair"]);
    }

    #[test]
    fn test_rejection_echoes_repeated_values() {
        let raw = form(&[("events", "a"), ("events", "b")]);
        let mut v = Validator::new(&raw);
        v.text("title", 3, None);
        let rejection = v.finish(|| ()).unwrap_err();
        assert_eq!(rejection.values["events"], "a\nb");
    }
}
