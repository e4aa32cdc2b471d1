//! Vendor quote (pricing reference) entity.
//!
//! # Invariants
//! - A quote always points at one catalog equipment row.
//! - `price`, when present, is finite and non-negative.
//! - At most one quote per equipment is current.

use crate::model::equipment::EquipmentId;
use crate::model::validation::{
    check_non_negative, currency_code, optional_date, optional_text, required_text,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type QuoteId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub equipment_id: EquipmentId,
    pub vendor: String,
    /// Unit price; `None` means not priced yet.
    pub price: Option<f64>,
    pub currency: String,
    pub lead_time_weeks: Option<u32>,
    /// `YYYY-MM-DD`.
    pub quote_date: Option<String>,
    pub quote_number: Option<String>,
    /// Location of the quote PDF in external file storage.
    pub file_path: Option<String>,
    /// Expiration or validity terms as written by the vendor.
    pub validity_notes: Option<String>,
    pub is_current: bool,
    pub notes: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDraft {
    pub equipment_id: EquipmentId,
    pub vendor: String,
    pub price: Option<f64>,
    /// Three-letter code; defaults to USD.
    pub currency: Option<String>,
    pub lead_time_weeks: Option<u32>,
    pub quote_date: Option<String>,
    pub quote_number: Option<String>,
    pub file_path: Option<String>,
    pub validity_notes: Option<String>,
    pub is_current: bool,
    pub notes: Option<String>,
}

impl QuoteDraft {
    /// Current, unpriced quote in USD.
    pub fn new(equipment_id: EquipmentId, vendor: impl Into<String>) -> Self {
        Self {
            equipment_id,
            vendor: vendor.into(),
            price: None,
            currency: None,
            lead_time_weeks: None,
            quote_date: None,
            quote_number: None,
            file_path: None,
            validity_notes: None,
            is_current: true,
            notes: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn validate(&self) -> Result<Self, ValidationError> {
        check_non_negative("price", self.price)?;
        Ok(Self {
            equipment_id: self.equipment_id,
            vendor: required_text("vendor", &self.vendor)?,
            price: self.price,
            currency: Some(currency_code(self.currency.as_deref())?),
            lead_time_weeks: self.lead_time_weeks,
            quote_date: optional_date("quote date", self.quote_date.as_deref())?,
            quote_number: optional_text(self.quote_number.as_deref()),
            file_path: optional_text(self.file_path.as_deref()),
            validity_notes: optional_text(self.validity_notes.as_deref()),
            is_current: self.is_current,
            notes: optional_text(self.notes.as_deref()),
        })
    }
}
