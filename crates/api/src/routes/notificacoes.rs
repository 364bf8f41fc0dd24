//! Notification endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use domain::models::Notification;
use persistence::repositories::NotificationRepository;
use shared::pagination::clamp_limit;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/notificacoes
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let rows = NotificationRepository::new(state.pool.clone())
        .list(auth.user.id, clamp_limit(query.limit))
        .await?
        .into_iter()
        .map(Notification::from)
        .collect();
    Ok(Json(rows))
}

/// PATCH /api/v1/notificacoes/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    let row = NotificationRepository::new(state.pool.clone())
        .mark_read(id, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notificação não encontrada".into()))?;
    Ok(Json(row.into()))
}
