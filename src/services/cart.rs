use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::cart::CartReceipt;
use crate::models::product::CartLine;

/// Receives validated add-to-cart lines.
pub trait CartService: Send + Sync {
    fn add(&self, line: &CartLine) -> Result<CartReceipt, CartError>;
}

/// Cart that records each accepted line in the log and keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCart;

impl CartService for LoggingCart {
    fn add(&self, line: &CartLine) -> Result<CartReceipt, CartError> {
        let receipt = CartReceipt {
            line_id: Uuid::new_v4(),
            quantity: line.quantity,
            color: line.color,
            added_at: Utc::now(),
        };

        info!(
            line_id = %receipt.line_id,
            quantity = receipt.quantity,
            color = %receipt.color,
            "Item added to cart"
        );
        metrics::counter!("cart_items_added_total", "color" => line.color.to_string())
            .increment(u64::from(line.quantity));

        Ok(receipt)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Cart unavailable: {0}")]
    Unavailable(String),

    #[error("Cart rejected line: {0}")]
    Rejected(String),
}
