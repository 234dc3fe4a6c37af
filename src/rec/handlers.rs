use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::error::RecError;
use super::types::{parse_new_recommendation, Envelope};
use crate::db::{Recommendation, RecommendationRepo};
use crate::server::AppState;

fn parse_id(raw: &str) -> Result<i64, RecError> {
    raw.parse::<i64>().map_err(|_| RecError::InvalidId)
}

pub async fn list_recommendations(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Recommendation>>>, RecError> {
    let recs = state.db.list().await?;
    Ok(Json(Envelope::success(recs)))
}

pub async fn get_recommendation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<Recommendation>>, RecError> {
    let id = parse_id(&raw_id)?;
    let rec = state.db.get(id).await?;
    Ok(Json(Envelope::success(rec)))
}

pub async fn create_recommendation(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<u64>>), RecError> {
    let Json(payload) = payload.map_err(|_| RecError::InvalidInput)?;

    // Advisory pre-check, answered before shape validation so clients see
    // the link conflict first. It races with concurrent writers; the
    // UNIQUE constraint on the column is the real enforcement.
    if let Some(link) = payload.get("link").and_then(Value::as_str) {
        if state.db.find_id_by_link(link).await?.is_some() {
            return Err(RecError::LinkTaken);
        }
    }

    let rec = parse_new_recommendation(state.config.schema, &payload)
        .ok_or(RecError::InvalidInput)?;

    let inserted = state.db.insert(&rec).await?;
    Ok((StatusCode::CREATED, Json(Envelope::success(inserted))))
}

pub async fn update_recommendation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<u64>>, RecError> {
    let id = parse_id(&raw_id)?;
    let Json(payload) = payload.map_err(|_| RecError::InvalidInput)?;

    // Same pre-check as create, except a link held by the row being
    // updated is not a conflict.
    if let Some(link) = payload.get("link").and_then(Value::as_str) {
        if let Some(owner) = state.db.find_id_by_link(link).await? {
            if owner != id {
                return Err(RecError::LinkTaken);
            }
        }
    }

    let rec = parse_new_recommendation(state.config.schema, &payload)
        .ok_or(RecError::InvalidInput)?;

    let affected = state.db.update(id, &rec).await?;
    if affected == 0 {
        return Err(RecError::NotFound);
    }
    Ok(Json(Envelope::success(affected)))
}

pub async fn delete_recommendation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<u64>>, RecError> {
    let id = parse_id(&raw_id)?;

    let affected = state.db.delete(id).await?;
    if affected == 0 {
        return Err(RecError::NotFound);
    }
    Ok(Json(Envelope::success(affected)))
}
