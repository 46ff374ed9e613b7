use crate::aggregate::{Metric, Metrics};
use crate::errors::AppError;
use crate::lookup::LocalitySelection;
use crate::models::RecordTable;
use crate::planner::PipelineConfig;
use crate::report::{lookup_customer, LookupOutcome};
use crate::table_cache::TableCache;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Loaded dataset snapshot.
    pub tables: TableCache,
    /// Collapsible fields and detail layout.
    pub pipeline: PipelineConfig,
}

/// Routes without the rate limiting and tracing layers added by `main`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/customers/:identifier", get(get_customer))
        .route("/api/v1/lookup", post(lookup))
        .route("/api/v1/dataset/reload", post(reload_dataset))
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint.
///
/// Reports which dataset snapshot is serving requests.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let table = state.tables.table().await?;
    Ok((StatusCode::OK, Json(dataset_status(&table))))
}

/// GET /api/v1/customers/:identifier
///
/// Looks up a customer with every locality selected.
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> Result<(StatusCode, Json<LookupResponse>), AppError> {
    tracing::info!("GET /customers/{}", identifier);
    run_lookup(&state, &identifier, &LocalitySelection::All).await
}

/// Body of `POST /api/v1/lookup`.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    pub identifier: String,
    /// `null` or absent selects every locality; `[]` selects none.
    #[serde(default)]
    pub localities: LocalitySelection,
}

/// POST /api/v1/lookup
///
/// Looks up a customer restricted to the selected localities.
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LookupRequest>,
) -> Result<(StatusCode, Json<LookupResponse>), AppError> {
    tracing::info!("POST /lookup - request: {:?}", request);
    run_lookup(&state, &request.identifier, &request.localities).await
}

/// POST /api/v1/dataset/reload
///
/// Drops the current snapshot and loads the dataset again.
pub async fn reload_dataset(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    state.tables.invalidate().await;
    let table = state.tables.table().await?;
    Ok((StatusCode::OK, Json(dataset_status(&table))))
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

async fn run_lookup(
    state: &AppState,
    identifier: &str,
    selection: &LocalitySelection,
) -> Result<(StatusCode, Json<LookupResponse>), AppError> {
    if identifier.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Identifier must not be blank".to_string(),
        ));
    }

    let table = state.tables.table().await?;
    let outcome = lookup_customer(&table, &state.pipeline, identifier, selection);

    let status = match &outcome {
        LookupOutcome::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    Ok((status, Json(LookupResponse::new(outcome))))
}

fn dataset_status(table: &RecordTable) -> serde_json::Value {
    json!({
        "status": "healthy",
        "service": "rust-cupos-api",
        "version": env!("CARGO_PKG_VERSION"),
        "dataset": {
            "source": table.source,
            "records": table.len(),
            "fingerprint": table.fingerprint,
            "loaded_at": table.loaded_at,
            "missing_columns": table
                .missing_columns()
                .iter()
                .map(|c| c.source_name())
                .collect::<Vec<_>>(),
        }
    })
}

// ============ Presentation ============

/// Lookup outcome plus the user-facing message and formatted metrics.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    #[serde(flatten)]
    pub outcome: LookupOutcome,
    pub message: String,
    /// Currency-formatted metrics, only those meant to be displayed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<MetricsDisplay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsDisplay {
    pub count: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<String>,
}

impl MetricsDisplay {
    fn from_metrics(metrics: &Metrics) -> Self {
        let shown = |metric: &Option<Metric>| {
            metric
                .as_ref()
                .filter(|m| m.displayed)
                .map(|m| format_currency(&m.value))
        };
        Self {
            count: metrics.count.to_string(),
            assigned: shown(&metrics.assigned),
            used: shown(&metrics.used),
            available: shown(&metrics.available),
        }
    }
}

impl LookupResponse {
    pub fn new(outcome: LookupOutcome) -> Self {
        let (message, display) = match &outcome {
            LookupOutcome::NotFound { .. } => (
                "⚠️ No se encontró ninguna información para la cédula ingresada.".to_string(),
                None,
            ),
            LookupOutcome::EmptySelection { .. } => (
                "⚠️ Seleccione al menos una localidad para ver el detalle.".to_string(),
                None,
            ),
            LookupOutcome::Found(report) => (
                format!("✅ Cliente encontrado: {}", report.profile.name),
                Some(MetricsDisplay::from_metrics(&report.metrics)),
            ),
        };
        Self {
            outcome,
            message,
            display,
        }
    }
}

/// Format an amount as whole currency with thousands separators, e.g. `$1,234,568`.
pub fn format_currency(value: &BigDecimal) -> String {
    let (whole, _) = value.round(0).with_scale(0).as_bigint_and_exponent();
    let text = whole.to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", text.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("${}{}", sign, grouped)
}
