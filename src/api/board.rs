//! Kanban board endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::Board};

use super::AuthenticatedUser;

/// Requests grouped by status
#[utoipa::path(
    get,
    path = "/board",
    tag = "views",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Kanban board", body = Board),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_board(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Board>> {
    let board = state.services.board.build_board().await?;
    Ok(Json(board))
}
