use tracing::debug;

use crate::models::form::{FormDefinition, FormErrors};
use crate::models::product::AddToCart;

/// Evaluate every declared rule against the bound model.
///
/// Rules run in declaration order per field and all failures are kept, so
/// the result lists every problem with the submission at once. An empty
/// result means the model satisfies the form.
pub fn validate(model: &AddToCart, form: &FormDefinition) -> FormErrors {
    let mut errors = FormErrors::default();

    for field in form.inputs() {
        let value = model.value(field.name);
        for rule in &field.rules {
            if let Err(message) = rule.check(value) {
                debug!(field = field.name, rule = ?rule, "Rule failed");
                errors.add_field(field.name, message);
            }
        }
    }

    errors
}
