// detail-server/tests/alerts.rs
// 告警集成测试

mod common;

use std::time::Duration;

use common::Harness;
use detail_server::alerts::{AlertChange, AlertFeed};
use serde_json::json;
use shared::models::AlertType;

#[tokio::test]
async fn test_cap_keeps_most_recent_500() {
    let h = Harness::new();
    let alerts = &h.state.alerts;

    for n in 0..501 {
        alerts
            .push_alert(AlertType::BookingCreated, format!("booking {n}"), "system", None)
            .await
            .unwrap();
    }

    let stored = alerts.list().await;
    assert_eq!(stored.len(), 500);
    assert_eq!(stored.first().unwrap().message, "booking 1");
    assert_eq!(stored.last().unwrap().message, "booking 500");
}

#[tokio::test]
async fn test_mark_all_read_covers_new_alert() {
    let h = Harness::new();
    let alerts = &h.state.alerts;
    alerts
        .push_alert(AlertType::CustomerCreated, "New customer", "owner", None)
        .await
        .unwrap();

    alerts
        .push_alert(
            AlertType::InvoiceUnpaid,
            "Invoice #100 unpaid",
            "system",
            Some(json!({"id": "i1"})),
        )
        .await
        .unwrap();
    alerts.mark_all_read().await.unwrap();

    let stored = alerts.list().await;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|a| a.read));
    assert_eq!(alerts.unread_count().await, 0);
}

#[tokio::test]
async fn test_other_tab_sees_storage_event_writer_does_not() {
    let h = Harness::new();
    let other_tab = h.area.handle();
    let mut other_events = other_tab.subscribe();
    let mut writer_events = h.state.storage.subscribe();

    h.state
        .alerts
        .push_alert(AlertType::ContactMessage, "Hello", "visitor", None)
        .await
        .unwrap();

    let event = other_events.try_recv().unwrap();
    assert_eq!(event.key.as_deref(), Some("admin_alerts"));
    assert!(writer_events.try_recv().is_err());
}

#[tokio::test]
async fn test_feed_in_same_tab_is_woken_by_bus() {
    let h = Harness::new();
    let mut feed = AlertFeed::new(h.state.storage.clone(), &h.state.bus);

    h.state
        .alerts
        .push_alert(AlertType::InventoryLow, "Wax low", "system", None)
        .await
        .unwrap();

    let change = tokio::time::timeout(Duration::from_secs(1), feed.changed())
        .await
        .unwrap();
    assert_eq!(change, Some(AlertChange::Bus));
    assert_eq!(feed.snapshot().len(), 1);
}

#[tokio::test]
async fn test_feed_in_other_tab_sees_both_channels() {
    let h = Harness::new();
    let mut feed = AlertFeed::new(h.area.handle(), &h.state.bus);

    h.state
        .alerts
        .push_alert(AlertType::ExpenseAdded, "Towels", "owner", None)
        .await
        .unwrap();

    let first = feed.changed().await;
    let second = feed.changed().await;
    let mut seen = vec![first, second];
    seen.sort_by_key(|c| format!("{c:?}"));
    assert_eq!(seen, vec![Some(AlertChange::Bus), Some(AlertChange::Storage)]);
    assert_eq!(feed.snapshot()[0].message, "Towels");
}

#[tokio::test]
async fn test_read_and_dismiss_transitions() {
    let h = Harness::new();
    let alerts = &h.state.alerts;
    let first = alerts
        .push_alert(AlertType::BookingCancelled, "Cancelled", "owner", None)
        .await
        .unwrap();
    let second = alerts
        .push_alert(AlertType::BookingCompleted, "Completed", "owner", None)
        .await
        .unwrap();

    alerts.mark_read(&first.id).await.unwrap();
    alerts.dismiss(&second.id).await.unwrap();

    let stored = alerts.list().await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].read);
    assert!(alerts.mark_read(&second.id).await.is_err());

    alerts.clear_all().await.unwrap();
    assert!(alerts.list().await.is_empty());
}

#[tokio::test]
async fn test_entity_writes_raise_alerts() {
    let h = Harness::new();

    h.state
        .invoices
        .create(
            &serde_json::from_value(json!({
                "invoice_number": "100",
                "customer_id": "c1",
                "booking_id": null,
                "total": 80.0,
                "due_date": null
            }))
            .unwrap(),
            "owner@example.com",
        )
        .await
        .unwrap();

    let types: Vec<_> = h
        .state
        .alerts
        .list()
        .await
        .into_iter()
        .map(|a| a.alert_type)
        .collect();
    assert_eq!(types, vec![AlertType::InvoiceCreated, AlertType::InvoiceUnpaid]);
}
