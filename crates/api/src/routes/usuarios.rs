//! User directory endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use domain::models::{CreateUserInput, User};
use persistence::repositories::UserRepository;
use shared::pagination::clamp_limit;
use shared::password::{generate_temp_password, hash_password};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

const TEMP_PASSWORD_LEN: usize = 10;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/usuarios
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    if !auth.is_staff() {
        return Err(ApiError::Forbidden("Acesso restrito".into()));
    }
    let users = UserRepository::new(state.pool.clone())
        .list(clamp_limit(query.limit))
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    Ok(Json(users))
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    #[serde(flatten)]
    pub user: User,
    /// Present only when the password was generated; shown exactly once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senha_temporaria: Option<String>,
}

/// POST /api/v1/usuarios (admin only)
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), ApiError> {
    auth.require_admin()?;
    input.validate()?;

    let (senha, senha_temporaria) = match &input.senha {
        Some(senha) => (senha.clone(), None),
        None => {
            let generated = generate_temp_password(TEMP_PASSWORD_LEN);
            (generated.clone(), Some(generated))
        }
    };
    let senha_hash = hash_password(&senha).map_err(|e| ApiError::Internal(e.to_string()))?;

    let entity = UserRepository::new(state.pool.clone())
        .create(&input, &senha_hash)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Usuário ou e-mail já cadastrado".into()),
            other => other,
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            user: entity.into(),
            senha_temporaria,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub usuario: Option<String>,
    pub email: Option<String>,
}

/// GET /api/v1/usuarios/availability
pub async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if query.usuario.is_none() && query.email.is_none() {
        return Err(ApiError::Validation(
            "Informe usuario e/ou email para consulta".into(),
        ));
    }
    let (usuario_livre, email_livre) = UserRepository::new(state.pool.clone())
        .availability(query.usuario.as_deref(), query.email.as_deref())
        .await?;
    Ok(Json(json!({
        "usuario_disponivel": usuario_livre,
        "email_disponivel": email_livre,
    })))
}
