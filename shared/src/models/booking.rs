//! Booking Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

/// Booking entity (预约)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub package_id: Option<String>,
    pub vehicle_type: Option<String>,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub time: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Create booking payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingCreate {
    #[validate(length(min = 1))]
    pub customer_id: String,
    pub package_id: Option<String>,
    pub vehicle_type: Option<String>,
    #[validate(length(equal = 10))]
    pub date: String,
    pub time: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub notes: Option<String>,
}

/// Update booking payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BookingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 10))]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
