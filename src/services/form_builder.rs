//! Field declarations for the add-to-cart form.
//!
//! Built once at startup and shared read-only by every request.

use crate::models::form::{Choice, FieldDescriptor, FieldKind, FormDefinition, Rule};
use crate::models::product::{Color, DEFAULT_QUANTITY, MAX_QUANTITY, MIN_QUANTITY};
use strum::IntoEnumIterator;

/// Form name, also the key submitted values are grouped under.
pub const FORM_NAME: &str = "add_to_cart";

/// Intent the CSRF token is bound to.
pub const CSRF_TOKEN_ID: &str = "add_to_cart";

/// Submitted key holding the CSRF token.
pub const TOKEN_FIELD: &str = "_token";

pub fn add_to_cart_form() -> FormDefinition {
    let choices: Vec<Choice> = Color::iter()
        .map(|c| Choice {
            label: c.label(),
            value: c.to_string(),
        })
        .collect();

    FormDefinition {
        name: FORM_NAME,
        fields: vec![
            FieldDescriptor {
                name: "quantity",
                kind: FieldKind::Integer,
                label: "Quantity",
                default: Some(DEFAULT_QUANTITY.to_string()),
                attrs: vec![
                    ("min", MIN_QUANTITY.to_string()),
                    ("max", MAX_QUANTITY.to_string()),
                ],
                rules: vec![
                    Rule::Present,
                    Rule::Range {
                        min: MIN_QUANTITY,
                        max: MAX_QUANTITY,
                    },
                ],
            },
            FieldDescriptor {
                name: "color",
                kind: FieldKind::Choice(choices),
                label: "Select Color",
                default: None,
                attrs: Vec::new(),
                rules: vec![Rule::Present, Rule::OneOf(Color::values())],
            },
            FieldDescriptor {
                name: "submit",
                kind: FieldKind::Submit,
                label: "Add to Cart",
                default: None,
                attrs: Vec::new(),
                rules: Vec::new(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_declared_in_order() {
        let form = add_to_cart_form();
        let names: Vec<_> = form.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["quantity", "color", "submit"]);
        assert_eq!(form.inputs().count(), 2);
    }

    #[test]
    fn color_choices_map_labels_to_values() {
        let form = add_to_cart_form();
        let color = form.field("color").expect("color field");
        let FieldKind::Choice(choices) = &color.kind else {
            panic!("color should be a choice field");
        };
        let pairs: Vec<_> = choices.iter().map(|c| (c.label, c.value.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("Matte Black", "black"),
                ("Pearl White", "white"),
                ("Silver", "silver")
            ]
        );
    }

    #[test]
    fn building_twice_is_deterministic() {
        assert_eq!(add_to_cart_form(), add_to_cart_form());
    }

    #[test]
    fn submit_carries_no_rules() {
        let form = add_to_cart_form();
        let submit = form.field("submit").expect("submit field");
        assert!(submit.rules.is_empty());
        assert!(!submit.is_input());
        assert_eq!(submit.label, "Add to Cart");
    }
}
