//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{CreateUserInput, NivelAcesso};

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, nome, sobrenome, usuario, email, senha_hash, nivel_acesso, \
     setor, setores, alterar_senha_primeiro_acesso, bloqueado, tentativas_login, \
     sessoes_invalidas_apos, criado_em";

/// Repository for user directory database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an account. The caller hashes the password; username and
    /// e-mail collisions surface as 23505 database errors.
    pub async fn create(
        &self,
        input: &CreateUserInput,
        senha_hash: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_usuario");
        let setores = input
            .setores
            .as_ref()
            .map(|s| serde_json::json!(s))
            .unwrap_or_else(|| serde_json::json!([]));
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO usuarios
                (nome, sobrenome, usuario, email, senha_hash, nivel_acesso, setor,
                 setores, alterar_senha_primeiro_acesso, bloqueado)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&input.nome)
        .bind(&input.sobrenome)
        .bind(&input.usuario)
        .bind(&input.email)
        .bind(senha_hash)
        .bind(input.nivel_acesso.as_str())
        .bind(input.setor_principal())
        .bind(setores)
        .bind(input.alterar_senha_primeiro_acesso)
        .bind(input.bloqueado)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Look an account up by username or e-mail, for login.
    pub async fn find_by_usuario_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_usuario_by_login");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM usuarios WHERE usuario = $1 OR LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_usuario_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM usuarios WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_usuarios");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM usuarios ORDER BY nome, sobrenome LIMIT $1",
            USER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Bump the failed-login counter; returns the new count.
    pub async fn record_failed_login(&self, id: Uuid) -> Result<i32, sqlx::Error> {
        let timer = QueryTimer::new("record_failed_login");
        let result = sqlx::query_scalar(
            "UPDATE usuarios SET tentativas_login = tentativas_login + 1 \
             WHERE id = $1 RETURNING tentativas_login",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn reset_failed_logins(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("reset_failed_logins");
        sqlx::query("UPDATE usuarios SET tentativas_login = 0 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    /// Block or unblock an account. Blocking also invalidates tokens
    /// issued before now.
    pub async fn set_blocked(&self, id: Uuid, bloqueado: bool) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("set_usuario_blocked");
        let invalidate: Option<DateTime<Utc>> = bloqueado.then(Utc::now);
        sqlx::query(
            "UPDATE usuarios SET bloqueado = $1, \
             sessoes_invalidas_apos = COALESCE($2, sessoes_invalidas_apos) \
             WHERE id = $3",
        )
        .bind(bloqueado)
        .bind(invalidate)
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Check whether a username and an e-mail are still free.
    pub async fn availability(
        &self,
        usuario: Option<&str>,
        email: Option<&str>,
    ) -> Result<(bool, bool), sqlx::Error> {
        let timer = QueryTimer::new("usuario_availability");
        let usuario_taken: bool = match usuario {
            Some(u) => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM usuarios WHERE usuario = $1)")
                    .bind(u)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => false,
        };
        let email_taken: bool = match email {
            Some(e) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM usuarios WHERE LOWER(email) = LOWER($1))",
                )
                .bind(e)
                .fetch_one(&self.pool)
                .await?
            }
            None => false,
        };
        timer.record();
        Ok((!usuario_taken, !email_taken))
    }

    /// Admins and technicians, for notification fan-out targeting.
    pub async fn list_staff(&self) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_staff");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM usuarios WHERE nivel_acesso IN ($1, $2) AND NOT bloqueado",
            USER_COLUMNS
        ))
        .bind(NivelAcesso::Admin.as_str())
        .bind(NivelAcesso::Tecnico.as_str())
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
