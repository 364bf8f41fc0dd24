//! Login endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use domain::models::{LoginInput, User};
use persistence::repositories::UserRepository;
use shared::password::verify_password;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// POST /api/v1/auth/login
///
/// Failed attempts are counted; reaching the configured maximum blocks the
/// account until an admin unblocks it. The response for a wrong password
/// and an unknown account is the same on purpose.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginResponse>, ApiError> {
    input.validate()?;

    let users = UserRepository::new(state.pool.clone());
    let Some(entity) = users.find_by_usuario_or_email(&input.usuario).await? else {
        return Err(ApiError::Unauthorized("Usuário ou senha inválidos".into()));
    };

    if entity.bloqueado {
        return Err(ApiError::Unauthorized("Conta bloqueada".into()));
    }

    let valid = verify_password(&input.senha, &entity.senha_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        let attempts = users.record_failed_login(entity.id).await?;
        if attempts >= state.config.auth.max_login_attempts {
            warn!(usuario = %entity.usuario, attempts, "blocking account after failed logins");
            users.set_blocked(entity.id, true).await?;
        }
        return Err(ApiError::Unauthorized("Usuário ou senha inválidos".into()));
    }

    users.reset_failed_logins(entity.id).await?;

    let user: User = entity.into();
    let token = state.jwt.issue(user.id, user.nivel_acesso.as_str())?;
    info!(usuario = %user.usuario, "login successful");

    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt.expiry_secs,
        user,
    }))
}
