pub mod dto;
pub mod handlers;
pub mod memory;
pub mod model;
pub mod pg;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::user_routes())
}
