pub mod client;
pub mod dto;
pub mod handlers;
pub mod prompt;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
