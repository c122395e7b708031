//! Request binding: turns submitted key/value data into an `AddToCart`.
//!
//! Binding never fails outright. Values that cannot be read are recorded as
//! field messages and leave the field empty.

use serde_json::Value;
use std::collections::HashMap;

use crate::models::form::{FieldKind, FormDefinition, FormErrors};
use crate::models::product::{AddToCart, BoundValue};
use crate::services::form_builder::TOKEN_FIELD;

pub const NOT_A_NUMBER: &str = "must be a number";
pub const NOT_A_CHOICE: &str = "is not a valid choice";
pub const UNREADABLE_BODY: &str = "The submitted data could not be read.";

/// One raw value as it arrived on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Integer(i64),
    /// Anything else: floats, booleans, arrays, objects.
    Unsupported,
}

/// Data submitted for the form in one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub fields: HashMap<String, RawValue>,
    pub token: Option<String>,
    /// The body was present but could not be decoded.
    pub unreadable: bool,
}

impl Submission {
    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    /// Read `form[field]=value` pairs. Returns `None` when no key belongs to
    /// the form, which means the form was not submitted.
    pub fn from_pairs<I>(form_name: &str, pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}[", form_name);
        let mut submission = Self::default();
        let mut seen = false;

        for (key, value) in pairs {
            let Some(field) = key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(']'))
            else {
                continue;
            };
            seen = true;
            if field == TOKEN_FIELD {
                submission.token = Some(value);
            } else {
                submission.fields.insert(field.to_string(), RawValue::Text(value));
            }
        }

        seen.then_some(submission)
    }

    /// Read `{ "<form>": { "field": value, ... } }`. Returns `None` when the
    /// form's group is absent.
    pub fn from_json(form_name: &str, body: &Value) -> Option<Self> {
        let group = body.get(form_name)?;
        let Some(object) = group.as_object() else {
            return Some(Self::unreadable());
        };

        let mut submission = Self::default();
        for (field, value) in object {
            if field == TOKEN_FIELD {
                submission.token = value.as_str().map(str::to_string);
                continue;
            }
            let raw = match value {
                Value::Null => continue,
                Value::String(s) => RawValue::Text(s.clone()),
                Value::Number(n) => n.as_i64().map_or(RawValue::Unsupported, RawValue::Integer),
                _ => RawValue::Unsupported,
            };
            submission.fields.insert(field.clone(), raw);
        }
        Some(submission)
    }
}

/// Merge a submission over a default model.
///
/// Every input field is overwritten: a field missing from the submission
/// becomes empty rather than keeping its default.
pub fn merge(form: &FormDefinition, submission: &Submission) -> (AddToCart, FormErrors) {
    let mut model = AddToCart::default();
    let mut errors = FormErrors::default();

    if submission.unreadable {
        errors.add_form(UNREADABLE_BODY);
    }

    for field in form.inputs() {
        let raw = submission.fields.get(field.name);
        let bound = match (&field.kind, raw) {
            (_, None) => Ok(None),
            (FieldKind::Integer, Some(RawValue::Integer(n))) => {
                Ok(Some(BoundValue::Integer(*n)))
            }
            (FieldKind::Integer, Some(RawValue::Text(s))) => parse_integer(s),
            (FieldKind::Integer, Some(RawValue::Unsupported)) => Err(NOT_A_NUMBER),
            (FieldKind::Choice(_), Some(RawValue::Text(s))) => {
                Ok(non_blank(s).map(BoundValue::Text))
            }
            (FieldKind::Choice(_), Some(RawValue::Integer(n))) => {
                Ok(Some(BoundValue::Integer(*n)))
            }
            (FieldKind::Choice(_), Some(RawValue::Unsupported)) => Err(NOT_A_CHOICE),
            (FieldKind::Submit, Some(_)) => Ok(None),
        };

        match bound {
            Ok(value) => model.set(field.name, value),
            Err(message) => {
                tracing::debug!(
                    field = field.name,
                    reason = message,
                    "Submitted value could not be bound"
                );
                model.set(field.name, None);
                errors.add_field(field.name, message);
            }
        }
    }

    (model, errors)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_integer(s: &str) -> Result<Option<BoundValue>, &'static str> {
    match non_blank(s) {
        None => Ok(None),
        Some(text) => text
            .parse::<i64>()
            .map(|n| Some(BoundValue::Integer(n)))
            .map_err(|_| NOT_A_NUMBER),
    }
}
