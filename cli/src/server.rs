use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use tally_core::models::{DayPlan, ObjectivesUpdate, Reason, SubstanceLog};
use tally_core::service::TrackerService;

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

#[derive(Clone)]
struct AppState {
    svc: Arc<Mutex<TrackerService>>,
}

impl AppState {
    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerService> {
        self.svc
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct DateQuery {
    date: Option<String>,
}

#[derive(Deserialize)]
struct AddReasonRequest {
    text: String,
}

#[derive(Deserialize)]
struct UpdateObjectivesRequest {
    kind: String,
    progress: Option<i64>,
    notes: Option<String>,
    weight: Option<f64>,
    sleep_hours: Option<f64>,
    food_satisfaction: Option<i64>,
}

#[derive(Deserialize)]
struct AddStepRequest {
    title: String,
}

#[derive(Deserialize)]
struct AddTaskRequest {
    date: String,
    title: String,
    time: Option<String>,
}

#[derive(Deserialize)]
struct AddSubstanceRequest {
    name: String,
}

#[derive(Deserialize)]
struct AddConsumptionRequest {
    substance_id: i64,
    date: String,
    quantity: Option<String>,
    note: Option<String>,
}

#[derive(Deserialize)]
struct SaveProductivityRequest {
    date: String,
    score: f64,
    note: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn applied(applied: bool) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "applied": applied }))
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                eprintln!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

fn parse_date_param(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{s}'. Use YYYY-MM-DD")))
}

fn resolve_date(query: &DateQuery) -> Result<NaiveDate, ApiError> {
    match query.date.as_deref() {
        Some(s) => parse_date_param(s),
        None => Ok(Local::now().date_naive()),
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Routine handlers ---

async fn get_routine(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = resolve_date(&query)?;
    let items = {
        let svc = state.lock();
        svc.routine_for(date).context("database error")?
    };
    Ok(Json(serde_json::json!({ "date": date, "items": items })))
}

async fn toggle_routine(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let touched = state.lock().toggle_routine_item(id).context("database error")?;
    Ok(applied(touched))
}

// --- Reasons handlers ---

async fn list_reasons(State(state): State<AppState>) -> Result<Json<Vec<Reason>>, ApiError> {
    let reasons = state.lock().list_reasons().context("database error")?;
    Ok(Json(reasons))
}

async fn add_reason(
    State(state): State<AppState>,
    Json(req): Json<AddReasonRequest>,
) -> Result<(StatusCode, Json<Reason>), ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    let reason = state.lock().add_reason(&req.text).context("failed to add reason")?;
    Ok((StatusCode::CREATED, Json(reason)))
}

async fn delete_reason(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let touched = state.lock().delete_reason(id).context("database error")?;
    Ok(applied(touched))
}

// --- Objectives handlers ---

async fn get_objectives(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let svc = state.lock();
    let objectives = svc.objectives().context("database error")?;
    let steps = svc.list_immigration_steps().context("database error")?;
    Ok(Json(serde_json::json!({
        "objectives": objectives,
        "immigration_steps": steps,
    })))
}

/// `kind` selects one of the four update groups; fields irrelevant to the
/// selected kind are ignored. An unrecognized kind mutates nothing and
/// reports `applied: false`.
async fn update_objectives(
    State(state): State<AppState>,
    Json(req): Json<UpdateObjectivesRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let update = match req.kind.as_str() {
        "studies" => ObjectivesUpdate::Studies {
            progress: req.progress.ok_or_else(|| {
                ApiError::BadRequest("'studies' requires a progress value".to_string())
            })?,
            notes: req.notes,
        },
        "weight" => ObjectivesUpdate::Weight(req.weight.ok_or_else(|| {
            ApiError::BadRequest("'weight' requires a weight value".to_string())
        })?),
        "sleep" => ObjectivesUpdate::Sleep(req.sleep_hours.ok_or_else(|| {
            ApiError::BadRequest("'sleep' requires a sleep_hours value".to_string())
        })?),
        "food" => ObjectivesUpdate::Food(req.food_satisfaction.ok_or_else(|| {
            ApiError::BadRequest("'food' requires a food_satisfaction value".to_string())
        })?),
        _ => return Ok(applied(false)),
    };

    let objectives = state
        .lock()
        .update_objectives(&update)
        .context("failed to update objectives")?;
    Ok(Json(serde_json::json!({
        "applied": true,
        "objectives": objectives,
    })))
}

async fn add_step(
    State(state): State<AppState>,
    Json(req): Json<AddStepRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    let step = state
        .lock()
        .add_immigration_step(&req.title)
        .context("failed to add step")?;
    let value = serde_json::to_value(step).context("failed to serialize step")?;
    Ok((StatusCode::CREATED, Json(value)))
}

async fn toggle_step(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let touched = state
        .lock()
        .toggle_immigration_step(id)
        .context("database error")?;
    Ok(applied(touched))
}

// --- Planner handlers ---

async fn get_plan(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<DayPlan>>, ApiError> {
    let today = resolve_date(&query)?;
    let week = state.lock().plan_week(today).context("database error")?;
    Ok(Json(week))
}

async fn add_task(
    State(state): State<AppState>,
    Json(req): Json<AddTaskRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    parse_date_param(&req.date)?;
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    let task = state
        .lock()
        .add_task(&req.date, &req.title, req.time)
        .context("failed to add task")?;
    let value = serde_json::to_value(task).context("failed to serialize task")?;
    Ok((StatusCode::CREATED, Json(value)))
}

async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let touched = state.lock().toggle_task(id).context("database error")?;
    Ok(applied(touched))
}

// --- Sobriety handlers ---

async fn get_sobriety(State(state): State<AppState>) -> Result<Json<Vec<SubstanceLog>>, ApiError> {
    let overview = state.lock().sobriety_overview().context("database error")?;
    Ok(Json(overview))
}

async fn add_substance(
    State(state): State<AppState>,
    Json(req): Json<AddSubstanceRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    let substance = state
        .lock()
        .add_substance(&req.name)
        .context("failed to add substance")?;
    let value = serde_json::to_value(substance).context("failed to serialize substance")?;
    Ok((StatusCode::CREATED, Json(value)))
}

async fn add_consumption(
    State(state): State<AppState>,
    Json(req): Json<AddConsumptionRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    parse_date_param(&req.date)?;

    let svc = state.lock();
    // The store leaves the substance reference unchecked; verify it here
    svc.get_substance(req.substance_id)
        .context("database error")?
        .ok_or_else(|| {
            ApiError::BadRequest(format!("Substance with id {} not found", req.substance_id))
        })?;

    let consumption = svc
        .add_consumption(req.substance_id, &req.date, req.quantity, req.note)
        .context("failed to add consumption")?;
    let value = serde_json::to_value(consumption).context("failed to serialize consumption")?;
    Ok((StatusCode::CREATED, Json(value)))
}

// --- Productivity handlers ---

async fn get_productivity(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let today = resolve_date(&query)?;
    let svc = state.lock();
    let entry = svc.productivity_for(today).context("database error")?;
    let history = svc.productivity_history(today).context("database error")?;
    Ok(Json(serde_json::json!({
        "date": today,
        "today": entry,
        "history": history,
    })))
}

async fn save_productivity(
    State(state): State<AppState>,
    Json(req): Json<SaveProductivityRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    parse_date_param(&req.date)?;
    if !req.score.is_finite() {
        return Err(ApiError::BadRequest("score must be a number".to_string()));
    }
    let entry = state
        .lock()
        .save_productivity(&req.date, req.score, req.note.as_deref())
        .context("failed to save productivity")?;
    let value = serde_json::to_value(entry).context("failed to serialize entry")?;
    Ok(Json(value))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/routine", get(get_routine))
        .route("/api/routine/toggle/{id}", post(toggle_routine))
        .route("/api/reasons", get(list_reasons).post(add_reason))
        .route("/api/reasons/{id}", delete(delete_reason))
        .route("/api/objectives", get(get_objectives))
        .route("/api/objectives/update", post(update_objectives))
        .route("/api/objectives/steps", post(add_step))
        .route("/api/objectives/steps/{id}/toggle", post(toggle_step))
        .route("/api/plan", get(get_plan))
        .route("/api/plan/tasks", post(add_task))
        .route("/api/plan/tasks/{id}/toggle", post(toggle_task))
        .route("/api/sobriety", get(get_sobriety))
        .route("/api/sobriety/substances", post(add_substance))
        .route("/api/sobriety/consumptions", post(add_consumption))
        .route(
            "/api/productivity",
            get(get_productivity).put(save_productivity),
        )
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(svc: TrackerService, port: u16, bind: &str) -> anyhow::Result<()> {
    let state = AppState {
        svc: Arc::new(Mutex::new(svc)),
    };

    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        eprintln!(
            "Warning: Listening on {bind}. Any device on your network can access this API."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
