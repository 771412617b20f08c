use assert_json_diff::{assert_json_eq, assert_json_include};
use medsim_server::{AppConfig, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

async fn start_server(cfg: AppConfig) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(&cfg).expect("build app");

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

fn frozen_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.simulation.fixed_now = Some("2025-04-01T00:00:00Z".into());
    cfg
}

#[tokio::test]
async fn health_and_list_endpoints() {
    let (base, shutdown_tx, handle) = start_server(frozen_config()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = client
        .get(format!("{base}/api/patients?search=john"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["patients"][0]["firstName"], "John");

    let resp = client
        .get(format!("{base}/api/appointments/?status=Scheduled&limit=1"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 2);
    assert_json_include!(
        actual: body["appointments"][0].clone(),
        expected: json!({"id": 101, "patientName": "John Smith"})
    );

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn patient_detail_is_enriched() {
    let (base, shutdown_tx, handle) = start_server(frozen_config()).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{base}/api/patients/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["recentRecords"].as_array().unwrap().len(), 2);
    assert_eq!(body["upcomingAppointments"][0]["id"], 101);

    let resp = client.get(format!("{base}/api/patients/9999")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_json_eq!(body, json!({"message": "Patient not found"}));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn write_operations_round_trip() {
    let (base, shutdown_tx, handle) = start_server(frozen_config()).await;
    let client = reqwest::Client::new();

    // create
    let resp = client
        .post(format!("{base}/api/records"))
        .json(&json!({"patientId": 2, "type": "Vaccination", "date": "2025-05-01"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    assert_eq!(resp.headers()["location"], "/api/records/203");
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["id"], 203);

    // update
    let resp = client
        .put(format!("{base}/api/records/203"))
        .json(&json!({"notes": "Influenza"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_json_include!(
        actual: updated,
        expected: json!({"id": 203, "type": "Vaccination", "notes": "Influenza"})
    );

    // cancel
    let resp = client
        .put(format!("{base}/api/appointments/102/cancel"))
        .send()
        .await
        .unwrap();
    let cancelled: Value = resp.json().await.unwrap();
    assert_eq!(cancelled["status"], "Cancelled");

    // delete
    let resp = client
        .delete(format!("{base}/api/records/203"))
        .send()
        .await
        .unwrap();
    let deleted: Value = resp.json().await.unwrap();
    assert_json_eq!(deleted, json!({"message": "Record deleted successfully", "id": 203}));

    let resp = client
        .delete(format!("{base}/api/patients/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn malformed_body_is_rejected_without_mutation() {
    let (base, shutdown_tx, handle) = start_server(frozen_config()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/patients"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: Value = client
        .get(format!("{base}/api/patients"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 2);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn unseeded_store_starts_empty() {
    let mut cfg = frozen_config();
    cfg.simulation.seed_fixtures = false;
    let (base, shutdown_tx, handle) = start_server(cfg).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{base}/api/records"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_eq!(body, json!({"records": [], "total": 0}));

    let created: Value = client
        .post(format!("{base}/api/patients"))
        .json(&json!({"firstName": "First"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["id"], 1);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn oneshot_without_network() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = build_app(&frozen_config()).expect("build app");
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/records?type=Laboratory%20Test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), axum::http::StatusCode::OK);
}
