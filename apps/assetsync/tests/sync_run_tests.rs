//! End-to-end runs of the configured engine against mock Meraki and Snipe-IT
//! servers.

use std::collections::HashMap;
use std::env::VarError;

use assetsync::app::{build_engine, render_report};
use assetsync::config::AppConfig;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORG: &str = "549236";

struct Servers {
    meraki: MockServer,
    snipe_it: MockServer,
}

impl Servers {
    async fn start() -> Self {
        Self {
            meraki: MockServer::start().await,
            snipe_it: MockServer::start().await,
        }
    }

    fn config(&self) -> AppConfig {
        let vars: HashMap<String, String> = HashMap::from([
            ("MERAKI_API_KEY".to_string(), "meraki-key".to_string()),
            ("MERAKI_ORGANIZATION_ID".to_string(), ORG.to_string()),
            ("MERAKI_BASE_URL".to_string(), self.meraki.uri()),
            ("SNIPE_IT_URL".to_string(), self.snipe_it.uri()),
            ("SNIPE_IT_API_KEY".to_string(), "snipe-key".to_string()),
            ("SYNC_DEVICE_DELAY_MS".to_string(), "0".to_string()),
            ("RATE_LIMIT_DEFAULT_WAIT_SECS".to_string(), "0".to_string()),
        ]);
        AppConfig::from_reader(move |key| vars.get(key).cloned().ok_or(VarError::NotPresent))
            .unwrap()
    }

    async fn devices(&self, devices: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/organizations/{ORG}/devices")))
            .respond_with(ResponseTemplate::new(200).set_body_json(devices))
            .mount(&self.meraki)
            .await;
    }

    async fn listing(&self, collection: &str, rows: Value) {
        let total = rows.as_array().map_or(0, Vec::len);
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/{collection}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"total": total, "rows": rows})),
            )
            .mount(&self.snipe_it)
            .await;
    }
}

fn written(id: u64) -> Value {
    json!({"status": "success", "messages": "ok", "payload": {"id": id}})
}

fn branch_mx() -> Value {
    json!({
        "name": "Branch MX",
        "serial": "S1",
        "mac": "00:18:0a:aa:bb:cc",
        "networkId": "N_1234",
        "productType": "Appliance",
        "model": "MX68"
    })
}

#[tokio::test]
async fn test_new_device_creates_taxonomy_and_asset() {
    let servers = Servers::start().await;
    servers.devices(json!([branch_mx()])).await;
    servers.listing("categories", json!([])).await;
    servers.listing("models", json!([])).await;
    servers.listing("hardware", json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/categories"))
        .and(body_partial_json(json!({"name": "Appliance", "category_type": "asset"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(written(3)))
        .expect(1)
        .mount(&servers.snipe_it)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/models"))
        .and(body_partial_json(json!({"name": "MX68", "category_id": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(written(8)))
        .expect(1)
        .mount(&servers.snipe_it)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/hardware"))
        .and(body_partial_json(json!({
            "asset_tag": "S1",
            "serial": "S1",
            "model_id": 8,
            "status_id": 2,
            "notes": "Imported from Meraki. MAC: 00:18:0a:aa:bb:cc, Network ID: N_1234"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(written(42)))
        .expect(1)
        .mount(&servers.snipe_it)
        .await;

    let engine = build_engine(&servers.config()).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_known_device_is_updated_in_place() {
    let servers = Servers::start().await;
    servers.devices(json!([branch_mx()])).await;
    servers
        .listing("categories", json!([{"id": 3, "name": "appliance"}]))
        .await;
    servers
        .listing(
            "models",
            json!([{"id": 8, "name": "MX68", "category": {"id": 3, "name": "appliance"}}]),
        )
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/hardware"))
        .and(query_param("search", "S1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "rows": [{"id": 42, "asset_tag": "S1", "serial": "S1", "model": {"id": 8}}]
        })))
        .expect(1)
        .mount(&servers.snipe_it)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/hardware/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(written(42)))
        .expect(1)
        .mount(&servers.snipe_it)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&servers.snipe_it)
        .await;

    let engine = build_engine(&servers.config()).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.api_calls.creates, 0);
    assert_eq!(report.api_calls.updates, 1);

    let text = render_report(&report, false);
    assert!(text.contains("Updated:"));
    let json: Value = serde_json::from_str(&render_report(&report, true)).unwrap();
    assert_eq!(json["updated"], 1);
}

#[tokio::test]
async fn test_paged_device_listing_counts_as_one_source_listing() {
    let servers = Servers::start().await;
    let devices_path = format!("/organizations/{ORG}/devices");
    let next = format!("{}{devices_path}?startingAfter=S1", servers.meraki.uri());
    Mock::given(method("GET"))
        .and(path(devices_path.as_str()))
        .and(query_param_is_missing("startingAfter"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{next}>; rel=next").as_str())
                .set_body_json(json!([branch_mx()])),
        )
        .expect(1)
        .mount(&servers.meraki)
        .await;
    Mock::given(method("GET"))
        .and(path(devices_path.as_str()))
        .and(query_param("startingAfter", "S1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "name": "Branch MX 2",
            "serial": "S2",
            "productType": "Appliance",
            "model": "MX68"
        }])))
        .expect(1)
        .mount(&servers.meraki)
        .await;
    servers
        .listing("categories", json!([{"id": 3, "name": "Appliance"}]))
        .await;
    servers
        .listing("models", json!([{"id": 8, "name": "MX68", "category": {"id": 3}}]))
        .await;
    servers.listing("hardware", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/hardware"))
        .respond_with(ResponseTemplate::new(200).set_body_json(written(42)))
        .expect(2)
        .mount(&servers.snipe_it)
        .await;

    let engine = build_engine(&servers.config()).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.total_processed, 2);
    assert_eq!(report.created, 2);
    assert_eq!(report.api_calls.source_listings, 1);
}

#[tokio::test]
async fn test_meraki_outage_aborts_run() {
    let servers = Servers::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/organizations/{ORG}/devices")))
        .respond_with(ResponseTemplate::new(502))
        .mount(&servers.meraki)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servers.snipe_it)
        .await;

    let engine = build_engine(&servers.config()).unwrap();
    let error = engine.run().await.unwrap_err();

    let app_error = assetsync::AppError::from(error);
    assert_eq!(app_error.exit_code(), 1);
    assert!(app_error.to_string().contains("502"));
}
