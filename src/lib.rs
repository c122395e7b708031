//! Add-to-cart product form service.
//!
//! Declares a typed field set once, then for each request binds submitted
//! data to an input model, checks the CSRF token, validates the model
//! against the declared rules and either hands the result to the cart or
//! re-renders the form with its errors.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
