use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Quantity a fresh form starts with.
pub const DEFAULT_QUANTITY: i64 = 1;

pub const MIN_QUANTITY: i64 = 1;
pub const MAX_QUANTITY: i64 = 10;

/// Finishes the product ships in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Black,
    White,
    Silver,
}

impl Color {
    /// Customer-facing name shown in the selector.
    pub fn label(self) -> &'static str {
        match self {
            Color::Black => "Matte Black",
            Color::White => "Pearl White",
            Color::Silver => "Silver",
        }
    }

    /// Submitted values accepted for the `color` field, in display order.
    pub fn values() -> Vec<String> {
        Color::iter().map(|c| c.to_string()).collect()
    }
}

/// One request's add-to-cart input, before validation.
///
/// Fields are optional because a submission may omit them or carry values
/// that could not be read. Nothing here is trusted until the form validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCart {
    pub quantity: Option<i64>,
    pub color: Option<String>,
}

impl Default for AddToCart {
    fn default() -> Self {
        Self {
            quantity: Some(DEFAULT_QUANTITY),
            color: None,
        }
    }
}

/// A bound value read back from the model by field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Text(&'a str),
}

impl AddToCart {
    pub fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            "quantity" => self.quantity.map(FieldValue::Integer),
            "color" => self.color.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }

    /// Overwrite a field with a bound value. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: Option<BoundValue>) {
        match (field, value) {
            ("quantity", Some(BoundValue::Integer(q))) => self.quantity = Some(q),
            ("quantity", _) => self.quantity = None,
            ("color", Some(BoundValue::Text(c))) => self.color = Some(c),
            ("color", Some(BoundValue::Integer(n))) => self.color = Some(n.to_string()),
            ("color", None) => self.color = None,
            _ => {}
        }
    }

    /// Convert a validated model into a typed cart line.
    ///
    /// Returns `None` when any field is absent or outside its domain.
    pub fn to_cart_line(&self) -> Option<CartLine> {
        let quantity = u8::try_from(self.quantity?).ok()?;
        let color = self.color.as_deref()?.parse::<Color>().ok()?;
        let line = CartLine { quantity, color };
        line.validate().ok()?;
        Some(line)
    }
}

/// Owned value produced by binding a submitted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    Integer(i64),
    Text(String),
}

/// A validated line ready for the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CartLine {
    #[garde(range(min = 1, max = 10))]
    pub quantity: u8,

    #[garde(skip)]
    pub color: Color,
}
