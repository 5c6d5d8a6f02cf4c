use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{dto::CreatePropertyRequest, repo_types::Property, risk::AssessmentRequest};
use crate::{auth::session::AuthUser, error::AppError, state::AppState};

pub fn property_routes() -> Router<AppState> {
    Router::new()
        .route("/properties", get(list_properties).post(create_property))
        .route("/properties/:id", get(get_property).delete(delete_property))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id, role = %auth.role))]
pub async fn list_properties(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Property>>, AppError> {
    let items = state.properties.list_properties(auth.id).await?;
    Ok(Json(items))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id, role = %auth.role))]
pub async fn create_property(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreatePropertyRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<Property>), AppError> {
    let Json(payload) = payload?;
    let new = payload.validate()?;
    let property = state.properties.create_property(auth.id, new).await?;
    info!(property_id = %property.id, "property created");

    // Scoring failures never fail the create; the score just stays at 0.
    if let Err(e) = state
        .assessor
        .request_assessment(AssessmentRequest::from(&property))
        .await
    {
        warn!(error = %e, property_id = %property.id, "risk assessment request failed");
    }

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/properties/{}", property.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(property)))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id, role = %auth.role))]
pub async fn get_property(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Property>, AppError> {
    state
        .properties
        .get_property(auth.id, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Property"))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id, role = %auth.role))]
pub async fn delete_property(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.properties.delete_property(auth.id, id).await? {
        info!(property_id = %id, "property deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Property"))
    }
}
