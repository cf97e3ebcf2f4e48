//! HTTP API over the dose log.
//!
//! Routes:
//! - `GET /api/doses` all doses, newest first
//! - `POST /api/doses` log a dose (`substance` and `doseTime` required)
//! - `DELETE /api/doses/:id` remove one dose
//! - `DELETE /api/doses` clear the log
//! - `GET /api/doses/active` doses still in Come Up, Peak or Comedown, with phase
//! - `GET /api/tolerance?desired=&days=[&last=]`
//! - `GET /health`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use bioclock_core::{
    BioclockError, Dashboard, DoseEvent, DoseRepository, NewDose, StoreError, TimelineEntry,
    ToleranceError, ToleranceEstimate, ToleranceInput,
};
use bioclock_traits::Clock;
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub dash: Arc<Dashboard>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl AppState {
    pub fn new(dash: Dashboard, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            dash: Arc::new(dash),
            clock,
        }
    }
}

/// Error body is always `{"message": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingField(field) => {
                Self::BadRequest(format!("Missing required field: {field}"))
            }
            StoreError::InvalidTime(msg) => Self::BadRequest(format!("Invalid doseTime: {msg}")),
            StoreError::Poisoned => {
                tracing::error!("dose log lock poisoned");
                Self::Internal("Dose log unavailable".to_string())
            }
            StoreError::IdsExhausted => {
                tracing::error!("dose ids exhausted");
                Self::Internal("Dose log is full".to_string())
            }
        }
    }
}

impl From<BioclockError> for ApiError {
    fn from(e: BioclockError) -> Self {
        match e {
            BioclockError::Store(se) => se.into(),
            BioclockError::Tolerance(te) => te.into(),
            other => {
                tracing::error!(error = %other, "request failed");
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<ToleranceError> for ApiError {
    fn from(e: ToleranceError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/doses",
            get(list_doses).post(create_dose).delete(clear_doses),
        )
        .route("/api/doses/active", get(active_doses))
        .route("/api/doses/:id", delete(delete_dose))
        .route("/api/tolerance", get(tolerance))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dose log API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c listener failed");
            }
        })
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn list_doses(State(s): State<AppState>) -> ApiResult<Vec<DoseEvent>> {
    Ok(Json(s.dash.store.list()?))
}

async fn create_dose(
    State(s): State<AppState>,
    body: Result<Json<NewDose>, JsonRejection>,
) -> ApiResult<DoseEvent> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(s.dash.log_dose(body)?))
}

async fn delete_dose(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id: u64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid ID".to_string()))?;
    s.dash.store.delete(id)?;
    Ok(Json(json!({ "message": "Dose deleted successfully" })))
}

async fn clear_doses(State(s): State<AppState>) -> ApiResult<Value> {
    let cleared = s.dash.store.clear()?;
    Ok(Json(json!({ "cleared": cleared })))
}

async fn active_doses(State(s): State<AppState>) -> ApiResult<Vec<TimelineEntry>> {
    let tl = s.dash.timeline_at(s.clock.now())?;
    Ok(Json(tl.into_active()))
}

#[derive(Debug, Deserialize)]
struct ToleranceQuery {
    desired: f64,
    days: f64,
    last: Option<f64>,
}

async fn tolerance(
    State(s): State<AppState>,
    q: Result<Query<ToleranceQuery>, QueryRejection>,
) -> ApiResult<ToleranceEstimate> {
    let Query(q) = q.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let est = s.dash.tolerance(ToleranceInput {
        last_dose: q.last,
        desired_dose: q.desired,
        days_since: q.days,
    })?;
    Ok(Json(est))
}

async fn health(State(s): State<AppState>) -> ApiResult<Value> {
    let doses = s.dash.store.len()?;
    Ok(Json(json!({
        "status": "ok",
        "doses": doses,
        "substances": s.dash.catalog.len(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use bioclock_core::{Catalog, TimelineCfg, ToleranceCfg};
    use bioclock_traits::ManualClock;
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    const DATA: &str = r#"{
        "lsd": {"name": "lsd", "pretty_name": "LSD",
                "formatted_onset": {"value": "30-60", "_unit": "minutes"},
                "formatted_duration": {"value": "8-12", "_unit": "hours"}}
    }"#;

    fn state_at_minutes(minutes: i64) -> AppState {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        let clock = ManualClock::starting_at(t0);
        clock.advance_minutes(minutes);
        let dash = Dashboard::new(
            Catalog::from_json_str(DATA).unwrap(),
            TimelineCfg::default(),
            ToleranceCfg::default(),
        );
        AppState::new(dash, Arc::new(clock))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, v)
    }

    #[tokio::test]
    async fn create_list_delete_round_trip() {
        let state = state_at_minutes(60);
        let (status, created) = send(
            router(state.clone()),
            "POST",
            "/api/doses",
            Some(json!({"substance": "LSD", "doseTime": "2024-05-01T20:00:00Z", "quantity": "100", "unit": "ug"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], 1);
        assert_eq!(created["route"], "Oral");

        let (_, list) = send(router(state.clone()), "GET", "/api/doses", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, body) = send(router(state.clone()), "DELETE", "/api/doses/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Dose deleted successfully");

        // deleting again still succeeds
        let (status, _) = send(router(state.clone()), "DELETE", "/api/doses/1", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, list) = send(router(state), "GET", "/api/doses", None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let (status, body) = send(
            router(state_at_minutes(0)),
            "POST",
            "/api/doses",
            Some(json!({"doseTime": "2024-05-01T20:00:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing required field: substance");
    }

    #[tokio::test]
    async fn blank_or_bad_dose_time_is_bad_request() {
        let state = state_at_minutes(0);
        let (status, body) = send(
            router(state.clone()),
            "POST",
            "/api/doses",
            Some(json!({"substance": "LSD", "doseTime": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing required field: doseTime");

        let (status, body) = send(
            router(state.clone()),
            "POST",
            "/api/doses",
            Some(json!({"substance": "LSD", "doseTime": "garbage"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid doseTime"));
        assert_eq!(state.dash.store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (status, body) = send(router(state_at_minutes(0)), "DELETE", "/api/doses/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid ID");
    }

    #[tokio::test]
    async fn active_reports_phase_at_clock_time() {
        let state = state_at_minutes(60);
        state
            .dash
            .log_dose(NewDose::new("LSD", Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap()))
            .unwrap();
        let (status, body) = send(router(state), "GET", "/api/doses/active", None).await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["substance"], "LSD");
        assert_eq!(entries[0]["phase"]["stage"], "Peak / Plateau");
    }

    #[tokio::test]
    async fn tolerance_endpoint_validates_days() {
        let app = router(state_at_minutes(0));
        let (status, body) = send(app.clone(), "GET", "/api/tolerance?desired=100&days=14", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["equivalent_dose"], 100.0);

        let (status, _) = send(app.clone(), "GET", "/api/tolerance?desired=100&days=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, "GET", "/api/tolerance?desired=100", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn clear_and_health_report_counts() {
        let state = state_at_minutes(0);
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        state.dash.log_dose(NewDose::new("LSD", t0)).unwrap();
        state.dash.log_dose(NewDose::new("DMT", t0)).unwrap();

        let (_, health) = send(router(state.clone()), "GET", "/health", None).await;
        assert_eq!(health, json!({"status": "ok", "doses": 2, "substances": 1}));

        let (_, cleared) = send(router(state.clone()), "DELETE", "/api/doses", None).await;
        assert_eq!(cleared["cleared"], 2);
        let (_, health) = send(router(state), "GET", "/health", None).await;
        assert_eq!(health["doses"], 0);
    }
}
