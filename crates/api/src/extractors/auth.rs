//! Authenticated user extractor.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

use domain::models::{NivelAcesso, User};
use persistence::repositories::UserRepository;
use shared::jwt::Claims;

use crate::app::AppState;
use crate::error::ApiError;

/// The logged-in user behind a request, resolved from the Bearer token.
///
/// Beyond signature and expiry checks, the account must still exist, not be
/// blocked, and the token must have been issued after the user's forced
/// session invalidation timestamp (set when an admin blocks the account).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub claims: Claims,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.user.nivel_acesso == NivelAcesso::Admin
    }

    /// Admins and technicians can operate on any ticket.
    pub fn is_staff(&self) -> bool {
        matches!(
            self.user.nivel_acesso,
            NivelAcesso::Admin | NivelAcesso::Tecnico
        )
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Acesso restrito a administradores".into(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Token ausente".into()))?;

        let claims = state.jwt.decode(token)?;
        let user_id = claims.user_id()?;

        let entity = UserRepository::new(state.pool.clone())
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Conta não encontrada".into()))?;
        let user: User = entity.into();

        if user.bloqueado {
            return Err(ApiError::Unauthorized("Conta bloqueada".into()));
        }
        if let Some(cutoff) = user.sessoes_invalidas_apos {
            if claims.iat < cutoff.timestamp() {
                return Err(ApiError::Unauthorized("Sessão invalidada".into()));
            }
        }

        Ok(AuthUser { user, claims })
    }
}
