//! Per-request processing of the add-to-cart form.
//!
//! A `BoundForm` walks `Initial -> Bound -> Valid | Invalid -> Responded`.
//! Without a submission it goes from `Initial` straight to `Responded`.

use strum::AsRefStr;
use tracing::{debug, info, warn};

use crate::models::cart::CartReceipt;
use crate::models::form::{FormDefinition, FormErrors, FormState};
use crate::models::product::AddToCart;
use crate::services::binding::{self, Submission};
use crate::services::cart::CartService;
use crate::services::csrf::CsrfTokens;
use crate::services::form_builder::CSRF_TOKEN_ID;
use crate::services::validation;

pub const CSRF_INVALID: &str = "The CSRF token is invalid. Please try to resubmit the form.";
pub const CART_FAILED: &str = "Could not add the item to your cart.";
pub const NOT_CONVERTIBLE: &str = "The submitted values could not be processed.";

/// One form bound to one request's model.
#[derive(Debug)]
pub struct BoundForm<'a> {
    definition: &'a FormDefinition,
    model: AddToCart,
    errors: FormErrors,
    state: FormState,
    submitted: bool,
}

impl<'a> BoundForm<'a> {
    /// Start from a default model.
    pub fn new(definition: &'a FormDefinition) -> Self {
        Self {
            definition,
            model: AddToCart::default(),
            errors: FormErrors::default(),
            state: FormState::Initial,
            submitted: false,
        }
    }

    pub fn definition(&self) -> &FormDefinition {
        self.definition
    }

    pub fn model(&self) -> &AddToCart {
        &self.model
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// `Initial -> Bound`: merge submitted data over the defaults.
    pub fn submit(&mut self, submission: &Submission) {
        let (model, errors) = binding::merge(self.definition, submission);
        self.model = model;
        self.errors = errors;
        self.submitted = true;
        self.transition(FormState::Bound);
    }

    /// `Bound -> Invalid` when the token does not check out. Field-level
    /// detail is dropped; only the security message is shown.
    pub fn reject_forgery(&mut self) {
        self.errors.clear_fields();
        self.errors.add_form(CSRF_INVALID);
        self.transition(FormState::Invalid);
    }

    /// `Bound -> Valid | Invalid`: run the declared rules.
    pub fn validate(&mut self) -> FormState {
        let found = validation::validate(&self.model, self.definition);
        self.errors.absorb(found);
        let next = if self.errors.is_empty() {
            FormState::Valid
        } else {
            FormState::Invalid
        };
        self.transition(next);
        next
    }

    /// Attach a top-level message after validation, e.g. a failed cart call.
    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.errors.add_form(message);
    }

    /// Terminal transition. Repeated calls are no-ops.
    pub fn respond(&mut self) {
        if self.state != FormState::Responded {
            self.transition(FormState::Responded);
        }
    }

    fn transition(&mut self, next: FormState) {
        debug!(
            form = self.definition.name,
            from = %self.state,
            to = %next,
            "Form state transition"
        );
        self.state = next;
    }
}

/// What processing a request produced.
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    NotSubmitted,
    Added(CartReceipt),
    ValidationFailure,
    SecurityFailure,
    CartFailure,
}

/// Collaborators the handler needs for one request.
pub struct FormContext<'a> {
    pub definition: &'a FormDefinition,
    /// `None` disables the token check.
    pub csrf: Option<&'a CsrfTokens>,
    pub cart: &'a dyn CartService,
}

/// Bind, check, validate and hand the result to the cart.
///
/// Never fails: every problem ends up as a message on the returned form.
pub fn process<'a>(
    ctx: &FormContext<'a>,
    submission: Option<&Submission>,
) -> (BoundForm<'a>, Outcome) {
    let mut form = BoundForm::new(ctx.definition);

    let Some(submission) = submission else {
        debug!(form = ctx.definition.name, "No submission, rendering defaults");
        form.respond();
        return (form, Outcome::NotSubmitted);
    };

    form.submit(submission);

    if let Some(csrf) = ctx.csrf {
        if let Err(e) = csrf.verify(CSRF_TOKEN_ID, submission.token.as_deref()) {
            warn!(form = ctx.definition.name, error = %e, "CSRF check failed");
            form.reject_forgery();
            return (form, Outcome::SecurityFailure);
        }
    }

    if form.validate() == FormState::Invalid {
        info!(
            form = ctx.definition.name,
            fields = ?form.errors().fields.keys().collect::<Vec<_>>(),
            "Submission rejected by validation"
        );
        return (form, Outcome::ValidationFailure);
    }

    let Some(line) = form.model().to_cart_line() else {
        warn!(model = ?form.model(), "Valid model did not convert to a cart line");
        form.add_form_error(NOT_CONVERTIBLE);
        return (form, Outcome::ValidationFailure);
    };

    match ctx.cart.add(&line) {
        Ok(receipt) => {
            info!(
                line_id = %receipt.line_id,
                quantity = line.quantity,
                color = %line.color,
                "Submission accepted"
            );
            (form, Outcome::Added(receipt))
        }
        Err(e) => {
            warn!(error = %e, "Cart rejected a valid submission");
            form.add_form_error(CART_FAILED);
            (form, Outcome::CartFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::{CartLine, Color};
    use crate::services::binding::RawValue;
    use crate::services::cart::{CartError, LoggingCart};
    use crate::services::form_builder::add_to_cart_form;

    struct DownCart;

    impl CartService for DownCart {
        fn add(&self, _line: &CartLine) -> Result<CartReceipt, CartError> {
            Err(CartError::Unavailable("maintenance".to_string()))
        }
    }

    fn submission(quantity: RawValue, color: &str, token: Option<String>) -> Submission {
        let mut s = Submission {
            token,
            ..Submission::default()
        };
        s.fields.insert("quantity".to_string(), quantity);
        s.fields.insert("color".to_string(), RawValue::Text(color.to_string()));
        s
    }

    #[test]
    fn no_submission_keeps_defaults() {
        let definition = add_to_cart_form();
        let ctx = FormContext {
            definition: &definition,
            csrf: None,
            cart: &LoggingCart,
        };
        let (mut form, outcome) = process(&ctx, None);

        assert_eq!(outcome, Outcome::NotSubmitted);
        assert_eq!(form.state(), FormState::Responded);
        assert!(!form.is_submitted());
        assert_eq!(form.model(), &AddToCart::default());
        assert!(form.errors().is_empty());

        form.respond();
        assert_eq!(form.state(), FormState::Responded);
    }

    #[test]
    fn valid_submission_reaches_cart() {
        let definition = add_to_cart_form();
        let tokens = CsrfTokens::ephemeral(3600);
        let ctx = FormContext {
            definition: &definition,
            csrf: Some(&tokens),
            cart: &LoggingCart,
        };
        let token = tokens.issue(CSRF_TOKEN_ID).expect("issued");
        let submitted = submission(RawValue::Integer(3), "white", Some(token));
        let (form, outcome) = process(&ctx, Some(&submitted));

        assert_eq!(form.state(), FormState::Valid);
        let Outcome::Added(receipt) = outcome else {
            panic!("expected the line to be added, got {outcome:?}");
        };
        assert_eq!(receipt.quantity, 3);
        assert_eq!(receipt.color, Color::White);
    }

    #[test]
    fn bad_token_is_a_security_failure_without_field_detail() {
        let definition = add_to_cart_form();
        let tokens = CsrfTokens::ephemeral(3600);
        let ctx = FormContext {
            definition: &definition,
            csrf: Some(&tokens),
            cart: &LoggingCart,
        };
        let (form, outcome) = process(
            &ctx,
            Some(&submission(RawValue::Text("abc".into()), "green", Some("forged".into()))),
        );

        assert_eq!(outcome, Outcome::SecurityFailure);
        assert_eq!(form.state(), FormState::Invalid);
        assert!(form.errors().fields.is_empty());
        assert_eq!(form.errors().form, vec![CSRF_INVALID.to_string()]);
        assert_eq!(form.model().color.as_deref(), Some("green"));
    }

    #[test]
    fn non_numeric_quantity_reports_once() {
        let definition = add_to_cart_form();
        let ctx = FormContext {
            definition: &definition,
            csrf: None,
            cart: &LoggingCart,
        };
        let submitted = submission(RawValue::Text("ten".into()), "black", None);
        let (form, outcome) = process(&ctx, Some(&submitted));

        assert_eq!(outcome, Outcome::ValidationFailure);
        assert_eq!(form.errors().for_field("quantity"), ["must be a number".to_string()]);
        assert!(!form.errors().has_field("color"));
    }

    #[test]
    fn cart_failure_keeps_values_and_reports_on_form() {
        let definition = add_to_cart_form();
        let ctx = FormContext {
            definition: &definition,
            csrf: None,
            cart: &DownCart,
        };
        let submitted = submission(RawValue::Integer(2), "silver", None);
        let (form, outcome) = process(&ctx, Some(&submitted));

        assert_eq!(outcome, Outcome::CartFailure);
        assert_eq!(form.model().quantity, Some(2));
        assert_eq!(form.errors().form, vec![CART_FAILED.to_string()]);
    }

    #[test]
    fn outcome_labels_are_snake_case() {
        assert_eq!(Outcome::NotSubmitted.as_ref(), "not_submitted");
        assert_eq!(Outcome::SecurityFailure.as_ref(), "security_failure");
    }
}
