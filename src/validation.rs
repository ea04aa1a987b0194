use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const VALIDATION_MESSAGE: &str = "Validation error";

/// Per-field validation messages, rendered as the `details` object of a 422.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationErrors {
    #[serde(skip)]
    form: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error about the request as a whole (e.g. a body that is not JSON).
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form: Some(message.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form.is_none() && self.fields.is_empty()
    }

    pub fn message(&self) -> &str {
        self.form.as_deref().unwrap_or(VALIDATION_MESSAGE)
    }

    #[cfg(test)]
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// A body field as it arrived. Fields are read as raw JSON so that a wrong
/// type is reported under the field instead of failing the whole body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Input {
    Missing,
    Text(String),
    /// Present but not a string, `null` included.
    NotText,
}

impl From<Option<Value>> for Input {
    fn from(value: Option<Value>) -> Self {
        match value {
            None => Input::Missing,
            Some(Value::String(s)) => Input::Text(s),
            Some(_) => Input::NotText,
        }
    }
}

/// `deserialize_with` helper keeping an explicit `null` as `Some(Value::Null)`;
/// combined with `#[serde(default)]` an absent key stays `None`.
pub(crate) fn raw<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}
