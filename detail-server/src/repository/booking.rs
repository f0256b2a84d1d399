//! Booking Repository

use serde_json::json;
use shared::models::{AlertType, Booking, BookingCreate, BookingStatus, BookingUpdate, TableName};
use shared::{AppResult, ErrorCode};

use super::{Entity, TableRepository, notify};
use crate::alerts::AlertCenter;

impl Entity for Booking {
    const TABLE: TableName = TableName::Bookings;
    const NOT_FOUND: ErrorCode = ErrorCode::BookingNotFound;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct BookingRepository {
    table: TableRepository<Booking>,
    alerts: AlertCenter,
}

impl BookingRepository {
    pub fn new(table: TableRepository<Booking>, alerts: AlertCenter) -> Self {
        Self { table, alerts }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Booking>> {
        self.table.get_all_or_cached().await
    }

    pub async fn create(&self, data: &BookingCreate, actor: &str) -> AppResult<Booking> {
        let booking = self.table.create(data).await?;
        notify(
            &self.alerts,
            AlertType::BookingCreated,
            format!("New booking on {}", booking.date),
            actor,
            json!({ "id": booking.id, "customer_id": booking.customer_id }),
        )
        .await;
        Ok(booking)
    }

    /// Status changes to cancelled/completed are announced
    pub async fn update(&self, id: &str, data: &BookingUpdate, actor: &str) -> AppResult<Booking> {
        let booking = self.table.update(id, data).await?;
        let alert = match data.status {
            Some(BookingStatus::Cancelled) => Some((AlertType::BookingCancelled, "cancelled")),
            Some(BookingStatus::Completed) => Some((AlertType::BookingCompleted, "completed")),
            _ => None,
        };
        if let Some((alert_type, verb)) = alert {
            notify(
                &self.alerts,
                alert_type,
                format!("Booking on {} {}", booking.date, verb),
                actor,
                json!({ "id": booking.id }),
            )
            .await;
        }
        Ok(booking)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.table.remove(id).await
    }

    pub async fn upsert(&self, bookings: &[Booking]) -> AppResult<()> {
        self.table.upsert(bookings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_parts;
    use rust_decimal::Decimal;

    fn input() -> BookingCreate {
        BookingCreate {
            customer_id: "c1".into(),
            package_id: None,
            vehicle_type: Some("suv".into()),
            date: "2026-03-14".into(),
            time: Some("09:30".into()),
            status: BookingStatus::Pending,
            total: Decimal::new(199, 0),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_cancel_alerts() {
        let (remote, kv, alerts) = test_parts();
        let repo = BookingRepository::new(TableRepository::new(remote, kv), alerts.clone());

        let booking = repo.create(&input(), "owner").await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);

        let patch = BookingUpdate {
            status: Some(BookingStatus::Cancelled),
            ..Default::default()
        };
        let cancelled = repo.update(&booking.id, &patch, "owner").await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let kinds: Vec<_> = alerts.list().await.iter().map(|a| a.alert_type).collect();
        assert_eq!(kinds, vec![AlertType::BookingCreated, AlertType::BookingCancelled]);
    }

    #[tokio::test]
    async fn test_reschedule_is_silent() {
        let (remote, kv, alerts) = test_parts();
        let repo = BookingRepository::new(TableRepository::new(remote, kv), alerts.clone());
        let booking = repo.create(&input(), "owner").await.unwrap();

        let patch = BookingUpdate {
            date: Some("2026-03-15".into()),
            ..Default::default()
        };
        repo.update(&booking.id, &patch, "owner").await.unwrap();

        assert_eq!(alerts.list().await.len(), 1);
    }
}
