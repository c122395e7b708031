use std::sync::Arc;

use crate::models::form::FormDefinition;
use crate::services::{cart::CartService, csrf::CsrfTokens, form_builder};

/// Shared application state passed to all route handlers.
///
/// Everything here is read-only; no request leaves anything behind for the
/// next one.
#[derive(Clone)]
pub struct AppState {
    pub form: Arc<FormDefinition>,
    pub csrf: Arc<CsrfTokens>,
    pub csrf_enabled: bool,
    pub cart: Arc<dyn CartService>,
}

impl AppState {
    pub fn new(csrf: CsrfTokens, csrf_enabled: bool, cart: impl CartService + 'static) -> Self {
        Self {
            form: Arc::new(form_builder::add_to_cart_form()),
            csrf: Arc::new(csrf),
            csrf_enabled,
            cart: Arc::new(cart),
        }
    }

    /// Token service to check submissions against, if checks are on.
    pub fn csrf_guard(&self) -> Option<&CsrfTokens> {
        self.csrf_enabled.then_some(self.csrf.as_ref())
    }
}
