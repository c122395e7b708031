pub mod cart;
pub mod form;
pub mod product;
