// detail-server/tests/api.rs
// HTTP 接口集成测试 (in-memory oneshot)

mod common;

use axum::body::Body;
use common::Harness;
use detail_server::api::build_app;
use detail_server::remote::{RemoteOp, row};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(h: &Harness, request: Request<Body>) -> (StatusCode, http::HeaderMap, Value) {
    let response = build_app(h.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let h = Harness::new();

    let (status, _, body) = send(&h, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["backend"], "reachable");
}

#[tokio::test]
async fn test_export_is_an_attachment() {
    let h = Harness::new();
    h.remote.seed("customers", vec![row(json!({"id": "c1"}))]);

    let (status, headers, body) = send(&h, get("/api/backup/export")).await;

    assert_eq!(status, StatusCode::OK);
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"detailing-backup-"));
    assert_eq!(body["schemaVersion"], 2);
    assert_eq!(body["supabase"]["customers"][0]["id"], "c1");
}

#[tokio::test]
async fn test_restore_returns_report() {
    let h = Harness::new();
    h.remote.fail_on("bookings", RemoteOp::Upsert);
    let snapshot = json!({
        "schemaVersion": 2,
        "exportedAt": "2026-01-05T10:00:00Z",
        "supabase": {
            "customers": [{"id": "c1"}],
            "bookings": [{"id": "b1", "customer_id": "c1"}]
        },
        "local": { "localforage": {}, "localStorage": {} }
    });

    let (status, _, body) = send(&h, json_request("POST", "/api/backup/restore", snapshot)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["remote"]["status"], "failed");
    assert_eq!(body["data"]["remote"]["failed_table"], "bookings");
    assert_eq!(body["data"]["remote"]["rollback"]["deleted"], json!(["customers"]));
}

#[tokio::test]
async fn test_restore_accepts_snapshot_over_two_megabytes() {
    let h = Harness::new();
    let notes = "ceramic coating, interior shampoo, ".repeat(6);
    let customers: Vec<Value> = (0..12_000)
        .map(|i| json!({"id": format!("c{i}"), "full_name": format!("Customer {i}"), "notes": notes}))
        .collect();
    let snapshot = json!({
        "schemaVersion": 2,
        "exportedAt": "2026-01-05T10:00:00Z",
        "supabase": { "customers": customers },
        "local": { "localforage": {}, "localStorage": {} }
    });
    let body = snapshot.to_string();
    assert!(body.len() > 2 * 1024 * 1024);

    let request = Request::post("/api/backup/restore")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let (status, _, report) = send(&h, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["remote"]["status"], "completed");
    assert_eq!(h.remote.rows("customers").len(), 12_000);
}

#[tokio::test]
async fn test_restore_body_limit_is_configurable() {
    let h = Harness::configured(|c| c.max_restore_bytes = 1024);
    let request = Request::post("/api/backup/restore")
        .body(Body::from("x".repeat(4096)))
        .unwrap();

    let response = build_app(h.state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(h.remote.calls().is_empty());
}

#[tokio::test]
async fn test_save_writes_backup_file() {
    let h = Harness::new();
    h.remote.seed("customers", vec![row(json!({"id": "c1"}))]);

    let (status, _, body) = send(&h, Request::post("/api/backup/save").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    let path = std::path::PathBuf::from(body["data"]["path"].as_str().unwrap());
    assert!(path.starts_with(h.work_dir().join("backups")));
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["supabase"]["customers"][0]["id"], "c1");
}

#[tokio::test]
async fn test_restore_rejects_garbage() {
    let h = Harness::new();
    let request = Request::post("/api/backup/restore")
        .body(Body::from("definitely not json"))
        .unwrap();

    let (status, _, body) = send(&h, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn test_customer_crud_and_alerts() {
    let h = Harness::new();

    let (status, _, created) = send(
        &h,
        json_request(
            "POST",
            "/api/customers",
            json!({"full_name": "Ada", "email": "ada@example.com", "phone": null, "vehicle": "Civic", "notes": null}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _, updated) = send(
        &h,
        json_request("PATCH", &format!("/api/customers/{id}"), json!({"notes": "ceramic"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["notes"], "ceramic");

    let (_, _, alerts) = send(&h, get("/api/alerts/unread-count")).await;
    assert_eq!(alerts["data"]["count"], 1);

    let (status, _, _) = send(
        &h,
        Request::delete(format!("/api/customers/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.remote.rows("customers").is_empty());
}

#[tokio::test]
async fn test_invalid_customer_is_rejected() {
    let h = Harness::new();

    let (status, _, body) = send(
        &h,
        json_request("POST", "/api/customers", json!({"full_name": "", "email": "nope", "phone": null, "vehicle": null, "notes": null})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
    assert!(h.remote.rows("customers").is_empty());
}

#[tokio::test]
async fn test_patch_unknown_booking_is_not_found() {
    let h = Harness::new();

    let (status, _, body) = send(
        &h,
        json_request("PATCH", "/api/bookings/missing", json!({"status": "confirmed"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 8101);
}

#[tokio::test]
async fn test_alert_endpoints() {
    let h = Harness::new();
    let alert = h
        .state
        .alerts
        .push_alert(shared::models::AlertType::BackupCompleted, "done", "system", None)
        .await
        .unwrap();

    let (_, _, listed) = send(&h, get("/api/alerts")).await;
    assert_eq!(listed["data"][0]["id"], alert.id.as_str());
    assert_eq!(listed["data"][0]["type"], "backup_completed");

    let uri = format!("/api/alerts/{}/read", alert.id);
    let (status, _, _) = send(&h, Request::post(uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.state.alerts.list().await[0].read);

    let (status, _, body) = send(
        &h,
        Request::post("/api/alerts/nope/read").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 7001);

    let (status, _, _) = send(&h, Request::delete("/api/alerts").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.state.alerts.list().await.is_empty());
}
