//! Reference catalog endpoints: problem categories and units.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use domain::models::{CreateProblemInput, CreateUnitInput, ProblemCategory, Unit};
use persistence::repositories::CatalogRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

/// GET /api/v1/problemas
pub async fn list_problems(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProblemCategory>>, ApiError> {
    let problems = CatalogRepository::new(state.pool.clone())
        .list_problems()
        .await?
        .into_iter()
        .map(ProblemCategory::from)
        .collect();
    Ok(Json(problems))
}

/// POST /api/v1/problemas (admin only)
pub async fn create_problem(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProblemInput>,
) -> Result<(StatusCode, Json<ProblemCategory>), ApiError> {
    auth.require_admin()?;
    input.validate()?;
    let created = CatalogRepository::new(state.pool.clone())
        .insert_problem(&input)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Problema já cadastrado".into()),
            other => other,
        })?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/v1/unidades
pub async fn list_units(State(state): State<AppState>) -> Result<Json<Vec<Unit>>, ApiError> {
    let units = CatalogRepository::new(state.pool.clone())
        .list_units()
        .await?
        .into_iter()
        .map(Unit::from)
        .collect();
    Ok(Json(units))
}

/// POST /api/v1/unidades (admin only)
pub async fn create_unit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateUnitInput>,
) -> Result<(StatusCode, Json<Unit>), ApiError> {
    auth.require_admin()?;
    input.validate()?;
    let created = CatalogRepository::new(state.pool.clone())
        .insert_unit(&input)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Unidade já cadastrada".into()),
            other => other,
        })?;
    Ok((StatusCode::CREATED, Json(created.into())))
}
