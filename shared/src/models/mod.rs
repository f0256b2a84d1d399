//! Data models
//!
//! Shared between detail-server and the admin frontend (via API).
//! Business rows carry string ids (the remote backend generates UUIDs);
//! money fields are `Decimal` serialized as JSON numbers.

pub mod alert;
pub mod audit;
pub mod booking;
pub mod contact;
pub mod customer;
pub mod expense;
pub mod inventory;
pub mod invoice;
pub mod snapshot;
pub mod table;

// Re-exports
pub use alert::*;
pub use audit::*;
pub use booking::*;
pub use contact::*;
pub use customer::*;
pub use expense::*;
pub use inventory::*;
pub use invoice::*;
pub use snapshot::*;
pub use table::*;
