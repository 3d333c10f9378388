use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use mmi_core::domain::quotation::{Quotation, QuotationId};
use mmi_core::domain::rating::{County, InsuranceCategory, Sex};
use mmi_core::errors::StoreError;
use mmi_core::ports::{ExpiringKind, QuotationStore};
use mmi_store::HttpQuotationStore;

type Captured = Arc<Mutex<Vec<Value>>>;

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake store server");
    });
    addr
}

fn store_for(addr: SocketAddr) -> HttpQuotationStore {
    HttpQuotationStore::new(format!("http://{addr}/"), Some(Duration::from_secs(5)))
        .expect("client builds")
}

fn stored_quotation(id: i64, is_policy: bool) -> Value {
    json!({
        "id": id,
        "sex": "Male",
        "age": 30,
        "county": "Cork",
        "model": "Corsa",
        "emissions": "Low",
        "insuranceCategory": "Fully Comprehensive",
        "totalCost": 1425,
        "validUntil": "2026-11-19T00:00:00",
        "isPolicy": is_policy,
        "customer": {
            "id": 9,
            "firstName": "Niamh",
            "surname": "Doyle",
            "street": "1 Main Street",
            "county": "Cork",
            "eircode": "T12 AB34",
            "phoneNumber": "0871234567"
        }
    })
}

async fn quotation_by_id(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    match id {
        17 => {
            let body = json!({ "data": stored_quotation(17, false), "success": true });
            (StatusCode::OK, Json(body))
        }
        18 => (
            StatusCode::OK,
            Json(json!({ "data": null, "success": false, "message": "Quotation not found" })),
        ),
        500 => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" }))),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "success": false }))),
    }
}

#[tokio::test]
async fn fetches_and_decodes_a_quotation() {
    let addr = serve(Router::new().route("/api/quotation/{id}", get(quotation_by_id))).await;
    let store = store_for(addr);

    let quotation = store
        .get_quotation(QuotationId(17))
        .await
        .expect("store call")
        .expect("quotation present");

    assert_eq!(quotation.id, Some(QuotationId(17)));
    assert_eq!(quotation.sex, Some(Sex::Male));
    assert_eq!(quotation.county, Some(County::Cork));
    assert_eq!(quotation.total_cost, 1425);
    assert_eq!(quotation.valid_until, NaiveDate::from_ymd_opt(2026, 11, 19));
    assert_eq!(quotation.customer_name(), "Niamh Doyle");
}

#[tokio::test]
async fn not_found_and_unsuccessful_envelopes_are_absent() {
    let addr = serve(Router::new().route("/api/quotation/{id}", get(quotation_by_id))).await;
    let store = store_for(addr);

    assert_eq!(store.get_quotation(QuotationId(404)).await, Ok(None));
    assert_eq!(store.get_quotation(QuotationId(18)).await, Ok(None));
}

#[tokio::test]
async fn server_errors_are_store_errors() {
    let addr = serve(Router::new().route("/api/quotation/{id}", get(quotation_by_id))).await;
    let store = store_for(addr);

    let error = store.get_quotation(QuotationId(500)).await.expect_err("status error");

    assert_eq!(
        error,
        StoreError::Status { path: "api/quotation/500".to_string(), status: 500 }
    );
}

#[tokio::test]
async fn undecodable_bodies_are_decode_errors() {
    let router = Router::new().route(
        "/api/quotation/policy/{id}",
        get(|| async { (StatusCode::OK, "<html>maintenance</html>") }),
    );
    let store = store_for(serve(router).await);

    let error = store.get_policy(QuotationId(3)).await.expect_err("decode error");

    assert!(matches!(
        error,
        StoreError::Decode { ref path, .. } if path == "api/quotation/policy/3"
    ));
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);

    let error = store_for(addr).get_policy(QuotationId(1)).await.expect_err("transport error");

    assert!(matches!(error, StoreError::Transport { .. }));
}

#[tokio::test]
async fn slow_store_times_out_when_configured() {
    let router = Router::new().route(
        "/api/quotation/{id}",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "data": null }))
        }),
    );
    let addr = serve(router).await;
    let store = HttpQuotationStore::new(format!("http://{addr}"), Some(Duration::from_millis(100)))
        .expect("client builds");

    let error = store.get_quotation(QuotationId(1)).await.expect_err("timeout");

    assert!(matches!(error, StoreError::Transport { .. }));
}

#[tokio::test]
async fn save_posts_the_wire_shape_and_returns_the_assigned_id() {
    let captured: Captured = Arc::default();
    let router = Router::new()
        .route(
            "/api/quotation",
            post(|State(captured): State<Captured>, Json(body): Json<Value>| async move {
                captured.lock().expect("capture lock").push(body.clone());
                let mut saved = body;
                saved["id"] = json!(52);
                Json(json!({ "data": saved, "success": true, "message": "" }))
            }),
        )
        .with_state(captured.clone());
    let store = store_for(serve(router).await);

    let mut quotation = Quotation {
        sex: Some(Sex::Female),
        age: 17,
        insurance_category: Some(InsuranceCategory::ThirdPartyFireAndTheft),
        valid_until: NaiveDate::from_ymd_opt(2026, 11, 19),
        ..Quotation::default()
    };
    quotation.attach_customer().first_name = "Orla".to_string();

    let saved = store.save_quotation(&quotation).await.expect("save").expect("saved");

    assert_eq!(saved.id, Some(QuotationId(52)));
    assert_eq!(saved.customer_name(), "Orla");

    let bodies = captured.lock().expect("capture lock");
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert!(body.get("id").is_none());
    assert_eq!(body["insuranceCategory"], "Third Party Fire and Theft");
    assert_eq!(body["county"], "");
    assert_eq!(body["validUntil"], "2026-11-19T00:00:00");
    assert_eq!(body["customer"]["firstName"], "Orla");
}

#[tokio::test]
async fn conversion_uses_the_update_policy_route() {
    let router = Router::new().route(
        "/api/quotation/updatepolicy/{id}",
        put(|Path(id): Path<i64>| async move {
            Json(json!({ "data": stored_quotation(id, true), "success": true }))
        }),
    );
    let store = store_for(serve(router).await);

    let policy = store.convert_to_policy(QuotationId(8)).await.expect("convert").expect("policy");

    assert_eq!(policy.id, Some(QuotationId(8)));
    assert!(policy.is_policy);
}

#[tokio::test]
async fn expiring_lists_decode_and_absent_lists_are_empty() {
    let router = Router::new()
        .route(
            "/api/quotation/expiring/policies",
            get(|| async {
                Json(json!({
                    "data": [stored_quotation(1, true), stored_quotation(2, true)],
                    "success": true
                }))
            }),
        )
        .route(
            "/api/quotation/expiring/quotations",
            get(|| async { Json(json!({ "data": null, "success": true })) }),
        );
    let store = store_for(serve(router).await);

    let policies = store.list_expiring(ExpiringKind::Policies).await.expect("policies");
    let quotations = store.list_expiring(ExpiringKind::Quotations).await.expect("quotations");

    assert_eq!(policies.len(), 2);
    assert!(policies.iter().all(|policy| policy.is_policy));
    assert!(quotations.is_empty());
}
