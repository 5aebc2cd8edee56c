//! On-demand statistics inspection

use crate::AppState;
use axum::{extract::State, Json};
use todo_core::StatSnapshot;

/// Current window, left accumulating
pub async fn current(State(state): State<AppState>) -> Json<StatSnapshot> {
    Json(state.stats.snapshot())
}
