use super::AppState;
use crate::encode::{self, Format, Rendered};
use crate::error::{AppError, AppResult};
use crate::models::Series;
use crate::query::Filter;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters shared by the data endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub format: Option<String>,
    pub name: Option<String>,
    pub grade: Option<String>,
}

impl SeriesQuery {
    fn filter(&self) -> Filter {
        Filter::new(self.name.clone(), self.grade.clone())
    }
}

#[derive(Debug, Serialize)]
pub struct IndexResponse<'a> {
    pub latitude: f64,
    pub longitude: f64,
    /// Modification time of the current source, unix milliseconds
    pub time: i64,
    pub generation: u64,
    pub data: Vec<encode::ObservationRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub current_count: usize,
    pub history_count: usize,
}

fn into_response(rendered: Rendered) -> Response {
    ([(header::CONTENT_TYPE, rendered.content_type)], rendered.body).into_response()
}

async fn serve_series(state: &AppState, series: Series, params: &SeriesQuery) -> AppResult<Response> {
    let format = Format::parse(params.format.as_deref())
        .ok_or_else(|| AppError::Validation("unrecognized format".to_string()))?;

    let snapshot = state.publisher.read().await;
    let rendered = encode::render(format, snapshot.series(series), &params.filter())?;
    Ok(into_response(rendered))
}

/// Overview of the current data: map centre, load time and observations
pub async fn index(State(state): State<AppState>) -> Response {
    let snapshot = state.publisher.read().await;
    let current: Vec<_> = snapshot.current.iter().collect();

    let body = IndexResponse {
        latitude: state.latitude,
        longitude: state.longitude,
        time: snapshot.loaded_at.timestamp_millis(),
        generation: snapshot.generation,
        data: encode::records(&current),
    };
    Json(body).into_response()
}

pub async fn current(
    State(state): State<AppState>,
    Query(params): Query<SeriesQuery>,
) -> AppResult<Response> {
    serve_series(&state, Series::Current, &params).await
}

pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<SeriesQuery>,
) -> AppResult<Response> {
    if !state.history_enabled {
        return Err(AppError::Unavailable("history not available".to_string()));
    }
    serve_series(&state, Series::History, &params).await
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.publisher.read().await;
    Json(HealthResponse {
        status: "ok",
        generation: snapshot.generation,
        loaded_at: snapshot.loaded_at,
        current_count: snapshot.current.len(),
        history_count: snapshot.history.len(),
    })
}
