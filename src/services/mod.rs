pub mod binding;
pub mod cart;
pub mod csrf;
pub mod form_builder;
pub mod form_handler;
pub mod render;
pub mod validation;
