pub mod stats;

use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{auth::session::AuthUser, error::AppError, state::AppState};
use stats::DashboardStats;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(dashboard_stats))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id, role = %auth.role))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    // One read, so the bucket counts and the total come from the same snapshot.
    let properties = state.properties.list_properties(auth.id).await?;
    Ok(Json(DashboardStats::from_properties(&properties)))
}
