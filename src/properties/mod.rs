mod dto;
pub mod handlers;
pub mod repo_types;
pub mod risk;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::property_routes()
}
