use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::product::Color;

/// Confirmation returned by the cart after a line is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartReceipt {
    pub line_id: Uuid,
    pub quantity: u8,
    pub color: Color,
    pub added_at: DateTime<Utc>,
}
