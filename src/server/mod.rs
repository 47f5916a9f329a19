//! Dashboard HTTP surface
//!
//! Serves the chart page and a small JSON API over the replay driver:
//! the day list, day selection, and the current chart view.

mod page;

use crate::config::ChartConfig;
use crate::error::ReplayError;
use crate::replay::{ChartView, ReplayDriver, ReplayProgress};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct AppState {
    pub driver: ReplayDriver,
    pub chart: ChartConfig,
}

impl AppState {
    pub fn new(driver: ReplayDriver, chart: ChartConfig) -> Self {
        Self { driver, chart }
    }
}

impl IntoResponse for ReplayError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReplayError::UnknownDay(_) | ReplayError::NoDaySelected => StatusCode::NOT_FOUND,
            ReplayError::InvalidDocument(_)
            | ReplayError::MalformedRecords { .. }
            | ReplayError::InvalidTimezone(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct DayInfo {
    day: NaiveDate,
    records: usize,
}

#[derive(Debug, Serialize)]
struct DaysResponse {
    selected: Option<NaiveDate>,
    days: Vec<DayInfo>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/days", get(list_days))
        .route("/api/days/:day/select", post(select_day))
        .route("/api/view", get(get_view))
        .route("/api/progress", get(get_progress))
        .with_state(state)
}

async fn index_page() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

/// Available days with their record counts
async fn list_days(State(state): State<Arc<AppState>>) -> Json<DaysResponse> {
    let days = state
        .driver
        .days()
        .iter()
        .map(|(day, records)| DayInfo {
            day,
            records: records.len(),
        })
        .collect();

    Json(DaysResponse {
        selected: state.driver.selected_day().await,
        days,
    })
}

/// Switch the replay to another day
async fn select_day(
    State(state): State<Arc<AppState>>,
    Path(day): Path<String>,
) -> Result<Json<ReplayProgress>, ReplayError> {
    let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .map_err(|_| ReplayError::UnknownDay(day.clone()))?;

    state.driver.select_day(date).await?;
    info!("Dashboard switched to {}", date);

    Ok(Json(state.driver.progress()))
}

/// Chart view of the current session
async fn get_view(State(state): State<Arc<AppState>>) -> Result<Json<ChartView>, ReplayError> {
    state
        .driver
        .view(&state.chart)
        .await
        .map(Json)
        .ok_or(ReplayError::NoDaySelected)
}

async fn get_progress(State(state): State<Arc<AppState>>) -> Json<ReplayProgress> {
    Json(state.driver.progress())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::fixtures::{entry, exit, record};
    use crate::replay::group_by_day;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> Arc<AppState> {
        let tz = chrono_tz::Asia::Kolkata;
        let records = vec![
            record(0, "HOLD"),
            entry(1, "BUY CALL", 100.0, Some(95.0)),
            exit(2, "SQUARE OFF CALL", 100.0, 103.0),
        ];
        let driver = ReplayDriver::new(group_by_day(&records, tz), tz, Duration::ZERO);
        Arc::new(AppState::new(driver, ChartConfig::default()))
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_lists_days() {
        let (status, body) = send(router(state()), "GET", "/api/days").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected"], Value::Null);
        assert_eq!(body["days"][0]["day"], "2025-02-10");
        assert_eq!(body["days"][0]["records"], 3);
    }

    #[tokio::test]
    async fn test_view_requires_selection() {
        let (status, body) = send(router(state()), "GET", "/api/view").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no day selected");
    }

    #[tokio::test]
    async fn test_select_and_view() {
        let state = state();

        let (status, body) = send(router(Arc::clone(&state)), "POST", "/api/days/2025-02-10/select").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["day"], "2025-02-10");
        assert_eq!(body["total"], 3);

        let epoch = state.driver.progress().epoch;
        assert!(state.driver.wait_finished(epoch).await);

        let (status, body) = send(router(state), "GET", "/api/view").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "finished");
        assert_eq!(body["markers"].as_array().unwrap().len(), 2);
        assert_eq!(body["trades"][0]["trade_type"], "CALL");
        assert_eq!(body["trades"][0]["points_captured"], 3.0);
        assert_eq!(body["summary"]["total_trades"], 1);
    }

    #[tokio::test]
    async fn test_select_unknown_day() {
        let (status, _) = send(router(state()), "POST", "/api/days/2030-01-01/select").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(router(state()), "POST", "/api/days/not-a-date/select").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serves_page() {
        let app = router(state());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
