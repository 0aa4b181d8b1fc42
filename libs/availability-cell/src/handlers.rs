use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{parse_clock_time, validate_sessions, ExistingSession, TimeConfiguration};
use crate::services::AvailabilityService;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQueryRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub config: Option<TimeConfiguration>,
    #[serde(default)]
    pub sessions: Vec<ExistingSession>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SlotValidationRequest {
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub config: Option<TimeConfiguration>,
    #[serde(default)]
    pub sessions: Vec<ExistingSession>,
}

/// Request configuration if one was sent, otherwise the clinic default.
fn resolve_config(state: &AppConfig, requested: Option<TimeConfiguration>) -> Result<TimeConfiguration, AppError> {
    match requested {
        Some(config) => Ok(config),
        None => TimeConfiguration::try_from(&state.schedule)
            .map_err(|e| AppError::Internal(format!("Default clinic schedule is invalid: {}", e))),
    }
}

fn into_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

#[axum::debug_handler]
pub async fn get_default_config(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let config = resolve_config(&state, None)?;
    Ok(Json(json!(config)))
}

#[axum::debug_handler]
pub async fn list_all_slots(
    State(state): State<Arc<AppConfig>>,
    payload: Result<Json<AvailabilityQueryRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request = into_payload(payload)?;
    let config = resolve_config(&state, request.config)?;
    let service = AvailabilityService::new(&config)?;
    validate_sessions(&request.sessions)?;

    let day = service.day_availability(request.date, &request.sessions);
    Ok(Json(json!(day)))
}

#[axum::debug_handler]
pub async fn list_available_slots(
    State(state): State<Arc<AppConfig>>,
    payload: Result<Json<AvailabilityQueryRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request = into_payload(payload)?;
    let config = resolve_config(&state, request.config)?;
    let service = AvailabilityService::new(&config)?;
    validate_sessions(&request.sessions)?;

    let slots = service.list_available_slots(request.date, &request.sessions);
    Ok(Json(json!({
        "date": request.date,
        "slots": slots,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn get_next_available_slot(
    State(state): State<Arc<AppConfig>>,
    payload: Result<Json<AvailabilityQueryRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request = into_payload(payload)?;
    let config = resolve_config(&state, request.config)?;
    let service = AvailabilityService::new(&config)?;
    validate_sessions(&request.sessions)?;

    let now = request.now.unwrap_or_else(Utc::now);
    let next = service.next_available_slot(request.date, &request.sessions, now);

    Ok(Json(json!({
        "date": request.date,
        "next_available": next
    })))
}

#[axum::debug_handler]
pub async fn validate_slot(
    State(state): State<Arc<AppConfig>>,
    payload: Result<Json<SlotValidationRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request = into_payload(payload)?;
    let config = resolve_config(&state, request.config)?;
    let service = AvailabilityService::new(&config)?;
    validate_sessions(&request.sessions)?;
    let time = parse_clock_time(&request.time)?;

    let slot = service.validate_requested_slot(request.date, time, &request.sessions)?;
    debug!("Requested slot {} on {} is bookable", slot.label(), request.date);

    Ok(Json(json!({
        "date": request.date,
        "slot": slot,
        "bookable": true
    })))
}
