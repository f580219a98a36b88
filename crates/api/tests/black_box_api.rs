use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod (in-memory store), bound to an ephemeral port.
        let app = licwarden_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn seed_vendor(client: &reqwest::Client, base_url: &str) -> String {
    let res = client
        .post(format!("{base_url}/vendors"))
        .json(&json!({ "name": "NetSoft", "support_email": "support@netsoft.example" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn seed_license(client: &reqwest::Client, base_url: &str, vendor_id: &str, max_usage: u32) {
    let today = Utc::now().date_naive();
    let res = client
        .post(format!("{base_url}/licenses"))
        .json(&json!({
            "license_key": "LIC-1",
            "software_name": "Edge Controller",
            "vendor_id": vendor_id,
            "valid_from": today - Duration::days(30),
            "valid_to": today + Duration::days(365),
            "license_type": "Per Device",
            "max_usage": max_usage,
            "notes": null,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

async fn seed_device(client: &reqwest::Client, base_url: &str, id: &str, ip: &str) {
    let res = client
        .post(format!("{base_url}/devices"))
        .json(&json!({
            "device_id": id,
            "device_type": "Router",
            "ip_address": ip,
            "location": "DC-1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

async fn assign(client: &reqwest::Client, base_url: &str, device_id: &str) -> reqwest::Response {
    client
        .post(format!("{base_url}/assignments"))
        .json(&json!({ "license_key": "LIC-1", "device_id": device_id }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn allocation_lifecycle_enforces_capacity_and_uniqueness() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let vendor_id = seed_vendor(&client, &srv.base_url).await;
    seed_license(&client, &srv.base_url, &vendor_id, 2).await;
    for (id, ip) in [
        ("DEV-A", "10.0.0.1"),
        ("DEV-B", "10.0.0.2"),
        ("DEV-C", "10.0.0.3"),
    ] {
        seed_device(&client, &srv.base_url, id, ip).await;
    }

    // First two assignments consume the capacity.
    let res = assign(&client, &srv.base_url, "DEV-A").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first: Value = res.json().await.unwrap();

    assert_eq!(
        assign(&client, &srv.base_url, "DEV-B").await.status(),
        StatusCode::CREATED
    );

    // Same pair again: duplicate.
    let res = assign(&client, &srv.base_url, "DEV-A").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_assignment");

    // Third device: capacity exceeded, with counts in the message.
    let res = assign(&client, &srv.base_url, "DEV-C").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "capacity_exceeded");
    assert!(body["message"].as_str().unwrap().contains("2/2"));

    // Utilization reflects the two live assignments.
    let res = client
        .get(format!("{}/licenses/LIC-1/utilization", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["current_usage"], 2);
    assert_eq!(body["available"], 0);
    assert_eq!(body["status"], "CRITICAL");

    // Release one and the count drops.
    let assignment_id = first["id"].as_str().unwrap();
    let res = client
        .delete(format!("{}/assignments/{}", srv.base_url, assignment_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let released: Value = res.json().await.unwrap();
    assert_eq!(released["license_key"], "LIC-1");
    assert_eq!(released["device_id"], "DEV-A");

    let res = client
        .get(format!("{}/licenses/LIC-1/utilization", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["current_usage"], 1);

    // Dashboard sees the fleet.
    let res = client
        .get(format!("{}/dashboard/summary", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total_devices"], 3);
    assert_eq!(body["total_licenses"], 1);
}

#[tokio::test]
async fn malformed_input_and_unknown_ids_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Bad IP: rejected before anything is stored.
    let res = client
        .post(format!("{}/devices", srv.base_url))
        .json(&json!({
            "device_id": "DEV-X",
            "device_type": "Router",
            "ip_address": "300.1.1.1",
            "location": "DC-1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_input");

    let res = client
        .get(format!("{}/devices/DEV-X", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Assigning against nothing: the missing license is reported first.
    let res = client
        .post(format!("{}/assignments", srv.base_url))
        .json(&json!({ "license_key": "LIC-NONE", "device_id": "DEV-NONE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("LIC-NONE"));

    // Unknown version status is rejected at the boundary.
    seed_device(&client, &srv.base_url, "DEV-Y", "10.0.0.9").await;
    let res = client
        .post(format!("{}/devices/DEV-Y/software-versions", srv.base_url))
        .json(&json!({
            "software_name": "IOS-XE",
            "current_version": "17.9.4",
            "status": "STALE",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
