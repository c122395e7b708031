use serde::Serialize;
use std::collections::BTreeMap;
use strum::{AsRefStr, Display};

use crate::models::cart::CartReceipt;
use crate::models::product::{AddToCart, FieldValue};

/// Lifecycle of one bound form inside one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FormState {
    Initial,
    Bound,
    Valid,
    Invalid,
    Responded,
}

/// A selectable option: what the customer sees and what gets submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Choice(Vec<Choice>),
    Submit,
}

/// Constraint attached to a field, checked by the validator in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Present,
    Range { min: i64, max: i64 },
    OneOf(Vec<String>),
}

impl Rule {
    /// Check a bound value. `Range` and `OneOf` accept absent values;
    /// absence is reported by `Present` alone.
    pub fn check(&self, value: Option<FieldValue<'_>>) -> Result<(), String> {
        match (self, value) {
            (Rule::Present, None) => Err(self.message()),
            (Rule::Present, Some(FieldValue::Text(s))) if s.trim().is_empty() => {
                Err(self.message())
            }
            (Rule::Present, Some(_)) => Ok(()),
            (_, None) => Ok(()),
            (Rule::Range { min, max }, Some(FieldValue::Integer(v))) => {
                if (*min..=*max).contains(&v) {
                    Ok(())
                } else {
                    Err(self.message())
                }
            }
            (Rule::OneOf(allowed), Some(FieldValue::Text(s))) => {
                if allowed.iter().any(|a| a == s) {
                    Ok(())
                } else {
                    Err(self.message())
                }
            }
            (Rule::OneOf(allowed), Some(FieldValue::Integer(n))) => {
                let n = n.to_string();
                if allowed.contains(&n) {
                    Ok(())
                } else {
                    Err(self.message())
                }
            }
            // Integer fields only ever bind integers, so text never reaches
            // a range check.
            (Rule::Range { .. }, Some(FieldValue::Text(_))) => Err(self.message()),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Rule::Present => "must not be blank".to_string(),
            Rule::Range { min, max } => format!("must be between {} and {}", min, max),
            Rule::OneOf(allowed) => format!("must be one of {}", allowed.join(", ")),
        }
    }
}

/// Static declaration of one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
    /// Rendered value when the model holds nothing for this field.
    pub default: Option<String>,
    pub attrs: Vec<(&'static str, String)>,
    pub rules: Vec<Rule>,
}

impl FieldDescriptor {
    /// Whether the field carries a value into the model.
    pub fn is_input(&self) -> bool {
        !matches!(self.kind, FieldKind::Submit)
    }
}

/// Ordered field set shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefinition {
    pub name: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl FormDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_input())
    }

    /// Submitted key for a field, e.g. `add_to_cart[quantity]`.
    pub fn full_name(&self, field: &str) -> String {
        format!("{}[{}]", self.name, field)
    }

    /// DOM id for a field, e.g. `add_to_cart_quantity`.
    pub fn id(&self, field: &str) -> String {
        format!("{}_{}", self.name, field)
    }
}

/// Messages collected while binding and validating one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    /// Field name to messages, for inline display.
    pub fields: BTreeMap<String, Vec<String>>,
    /// Messages not tied to a field (security, unreadable body, cart).
    pub form: Vec<String>,
}

impl FormErrors {
    pub fn add_field(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn for_field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fold in validation messages for fields that have none yet, so a
    /// field that failed binding is not reported twice.
    pub fn absorb(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_insert(messages);
        }
        self.form.extend(other.form);
    }

    /// Drop field-level detail, keeping only top-level messages.
    pub fn clear_fields(&mut self) {
        self.fields.clear();
    }
}

/// JSON body returned to API clients.
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub state: FormState,
    pub values: AddToCart,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<CartReceipt>,
    pub errors: BTreeMap<String, Vec<String>>,
    pub form_errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}
