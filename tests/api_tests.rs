/// HTTP tests against the router with an in-memory dataset
/// Exercises status codes, response shape and dataset loading from a JSON file
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use rust_cupos_api::handlers::{router, AppState};
use rust_cupos_api::loader::{table_from_json_rows, TableLoader};
use rust_cupos_api::planner::PipelineConfig;
use rust_cupos_api::table_cache::TableCache;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn rows() -> Value {
    json!([
        {
            "Identificacion": "100589",
            "NombreSuscriptor": "Carlos Gomez",
            "UltimoTelefono": 3105551234.0,
            "Segmento": null,
            "Localidad": "Bogota",
            "Subcategoria": "Estrato 3",
            "Ubicacion": "Calle 1",
            "UltimaLineaCompra": "Hogar",
            "Contrato": "C-1",
            "CupoAsignado": 100,
            "CupoUtilizado": 40,
            "CupoDisponible": 60
        },
        {
            "Identificacion": "100589",
            "NombreSuscriptor": "Carlos Gomez",
            "UltimoTelefono": 3105551234.0,
            "Segmento": null,
            "Localidad": "Bogota",
            "Subcategoria": "Estrato 3",
            "Ubicacion": "Calle 2",
            "UltimaLineaCompra": "Hogar",
            "Contrato": "C-2",
            "CupoAsignado": 50,
            "CupoUtilizado": 10,
            "CupoDisponible": 40
        },
        {
            "Identificacion": "100589",
            "NombreSuscriptor": "Carlos Gomez",
            "UltimoTelefono": 3105551234.0,
            "Segmento": null,
            "Localidad": "Cali",
            "Subcategoria": "Estrato 2",
            "Ubicacion": "Carrera 9",
            "UltimaLineaCompra": "Hogar",
            "Contrato": "C-3",
            "CupoAsignado": 0,
            "CupoUtilizado": 0,
            "CupoDisponible": 30
        }
    ])
}

async fn app() -> Router {
    let table = table_from_json_rows(serde_json::from_value(rows()).unwrap(), "fixture").unwrap();
    let tables = TableCache::preloaded(TableLoader::JsonFile("fixture.json".into()), table).await;
    router(Arc::new(AppState {
        tables,
        pipeline: PipelineConfig::default(),
    }))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_lookup(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/lookup")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_get_customer_found() {
    let request = Request::builder()
        .uri("/api/v1/customers/100589")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "found");
    assert_eq!(body["message"], "✅ Cliente encontrado: Carlos Gomez");
    assert_eq!(body["profile"]["phone"], "3105551234");
    assert_eq!(body["profile"]["segment"], "Sin segmento");
    assert_eq!(body["metrics"]["count"], 3);
    assert_eq!(body["display"]["assigned"], "$150");
    assert_eq!(body["display"]["used"], "$50");
    assert_eq!(body["display"]["available"], "$130");

    // purchase line is uniform, locality varies
    assert_eq!(body["summary_facts"][0]["field"], "lastPurchaseLine");
    assert_eq!(body["summary_facts"][0]["value"], "Hogar");
    assert_eq!(body["breakdowns"][0]["field"], "locality");
    assert_eq!(body["breakdowns"][0]["entries"][0]["label"], "Bogota");
    assert_eq!(body["breakdowns"][0]["entries"][0]["percentage"], 66.7);
    assert_eq!(
        body["columns"],
        json!([
            "contract",
            "locality",
            "subcategory",
            "location",
            "assignedQuota",
            "usedQuota",
            "availableQuota"
        ])
    );
    assert_eq!(body["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_lookup_single_locality_suppresses_zero_metrics() {
    let (status, body) = send(
        app().await,
        post_lookup(json!({ "identifier": "100589", "localities": ["Cali"] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["count"], 1);
    assert!(body["display"].get("assigned").is_none());
    assert!(body["display"].get("used").is_none());
    assert_eq!(body["display"]["available"], "$30");
    assert!(body["breakdowns"].as_array().unwrap().is_empty());
    assert_eq!(body["locality_options"], json!(["Bogota", "Cali"]));
}

#[tokio::test]
async fn test_lookup_empty_selection() {
    let (status, body) = send(
        app().await,
        post_lookup(json!({ "identifier": "100589", "localities": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "empty_selection");
    assert!(body.get("rows").is_none());
    assert!(body.get("display").is_none());
}

#[tokio::test]
async fn test_lookup_without_localities_selects_all() {
    let (_, body) = send(app().await, post_lookup(json!({ "identifier": " 100589 " }))).await;
    assert_eq!(body["status"], "found");
    assert_eq!(body["metrics"]["count"], 3);
}

#[tokio::test]
async fn test_unknown_customer_is_404() {
    let (status, body) = send(app().await, post_lookup(json!({ "identifier": "42" }))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "not_found");
    assert_eq!(body["identifier"], "42");
}

#[tokio::test]
async fn test_blank_identifier_is_rejected() {
    let (status, body) = send(app().await, post_lookup(json!({ "identifier": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Identifier must not be blank");
}

#[tokio::test]
async fn test_health_reports_dataset() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataset"]["records"], 3);
    assert_eq!(body["dataset"]["fingerprint"].as_str().unwrap().len(), 64);
    assert_eq!(body["dataset"]["missing_columns"], json!([]));
}

#[tokio::test]
async fn test_reload_reads_json_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), rows().to_string()).unwrap();

    let tables = TableCache::new(TableLoader::JsonFile(file.path().to_path_buf()), None);
    let app = router(Arc::new(AppState {
        tables,
        pipeline: PipelineConfig::default(),
    }));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/dataset/reload")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataset"]["records"], 3);
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder()
        .uri("/api/v2/nothing")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}
