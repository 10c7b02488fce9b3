use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::SubmissionSettings;
use crate::errors::{ResolutionError, SubmitError};
use crate::logic::{SubmissionPipeline, SubmissionRequest};
use crate::model::{
    DataGraph, EntitySetId, FormValues, StoredAssociation, StoredEntity, SubmissionConfig,
    SubmissionResult, UserContext,
};
use crate::seed;
use crate::store::traits::Store;

/// Shared handler state: the graph store plus submission settings
pub struct ServiceState<S> {
    pub store: Arc<S>,
    pub settings: SubmissionSettings,
}

impl<S> ServiceState<S> {
    pub fn new(store: Arc<S>, settings: SubmissionSettings) -> Self {
        Self { store, settings }
    }
}

pub type AppState<S> = Arc<ServiceState<S>>;

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Body of a preset submission; the config comes from the preset
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetSubmission {
    #[serde(default)]
    pub values: FormValues,
    #[serde(default)]
    pub include_user_id: bool,
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse::new(message)))
}

fn submit_error_response(err: SubmitError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        SubmitError::Config(_) | SubmitError::InvalidValues { .. } => StatusCode::BAD_REQUEST,
        SubmitError::Resolution(ResolutionError::UnknownEntitySet(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SubmitError::Resolution(ResolutionError::Lookup(_)) | SubmitError::Write(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    error_response(status, &err.to_string())
}

fn find_preset(name: &str) -> Result<SubmissionConfig, (StatusCode, Json<ErrorResponse>)> {
    seed::preset(name).ok_or_else(|| {
        error_response(StatusCode::NOT_FOUND, &format!("Preset '{}' not found", name))
    })
}

async fn find_entity_set<S: Store>(
    store: &S,
    name: &str,
) -> Result<EntitySetId, (StatusCode, Json<ErrorResponse>)> {
    match store.get_entity_set_ids(&[name.to_string()]).await {
        Ok(mut ids) => ids.remove(name).ok_or_else(|| {
            error_response(StatusCode::NOT_FOUND, &format!("Entity set '{}' not found", name))
        }),
        Err(e) => Err(error_response(StatusCode::BAD_GATEWAY, &e.to_string())),
    }
}

pub async fn list_presets() -> Json<ListResponse<String>> {
    Json(ListResponse::new(
        seed::PRESET_NAMES.iter().map(|name| name.to_string()).collect(),
    ))
}

pub async fn get_preset(Path(name): Path<String>) -> ApiResult<SubmissionConfig> {
    find_preset(&name).map(Json)
}

pub async fn submit<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    RequestJson(request): RequestJson<SubmissionRequest>,
) -> ApiResult<SubmissionResult> {
    let mut pipeline = SubmissionPipeline::new(state.store.as_ref(), &state.settings);
    pipeline
        .submit(request, &user)
        .await
        .map(Json)
        .map_err(submit_error_response)
}

pub async fn compile_submission<S: Store>(
    State(state): State<AppState<S>>,
    user: UserContext,
    RequestJson(request): RequestJson<SubmissionRequest>,
) -> ApiResult<DataGraph> {
    let mut pipeline = SubmissionPipeline::new(state.store.as_ref(), &state.settings);
    pipeline
        .compile(request, &user)
        .await
        .map(Json)
        .map_err(submit_error_response)
}

pub async fn submit_preset<S: Store>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
    user: UserContext,
    RequestJson(body): RequestJson<PresetSubmission>,
) -> ApiResult<SubmissionResult> {
    let config = find_preset(&name)?;
    let request = SubmissionRequest {
        config,
        values: body.values,
        include_user_id: body.include_user_id,
    };
    let mut pipeline = SubmissionPipeline::new(state.store.as_ref(), &state.settings);
    pipeline
        .submit(request, &user)
        .await
        .map(Json)
        .map_err(submit_error_response)
}

pub async fn list_entities<S: Store>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> ApiResult<ListResponse<StoredEntity>> {
    let entity_set_id = find_entity_set(state.store.as_ref(), &name).await?;
    match state.store.list_entities(&entity_set_id).await {
        Ok(entities) => Ok(Json(ListResponse::new(entities))),
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())),
    }
}

pub async fn list_associations<S: Store>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> ApiResult<ListResponse<StoredAssociation>> {
    let entity_set_id = find_entity_set(state.store.as_ref(), &name).await?;
    match state.store.list_associations(&entity_set_id).await {
        Ok(associations) => Ok(Json(ListResponse::new(associations))),
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                SubmitError::Config(ConfigError::DuplicateAlias("a".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                SubmitError::invalid_values("readId", "missing entity key"),
                StatusCode::BAD_REQUEST,
            ),
            (
                ResolutionError::UnknownEntitySet("LPRZones".to_string()).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ResolutionError::Lookup(anyhow::anyhow!("timeout")).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                SubmitError::Write(anyhow::anyhow!("rejected")),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            let (status, Json(body)) = submit_error_response(err);
            assert_eq!(status, expected);
            assert!(!body.error.is_empty());
        }
    }
}
