//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::{NivelAcesso, User};

/// Database row mapping for the usuarios table.
///
/// `setores` is stored as a JSON array; rows predating multi-sector access
/// may hold null, which maps to a list containing just the primary sector.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub nome: String,
    pub sobrenome: String,
    pub usuario: String,
    pub email: String,
    pub senha_hash: String,
    pub nivel_acesso: String,
    pub setor: Option<String>,
    pub setores: Option<serde_json::Value>,
    pub alterar_senha_primeiro_acesso: bool,
    pub bloqueado: bool,
    pub tentativas_login: i32,
    pub sessoes_invalidas_apos: Option<DateTime<Utc>>,
    pub criado_em: DateTime<Utc>,
}

impl UserEntity {
    fn setores_list(&self) -> Vec<String> {
        let from_json = self.setores.as_ref().and_then(|v| {
            v.as_array().map(|arr| {
                arr.iter()
                    .filter_map(|s| s.as_str())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
        });
        match from_json {
            Some(list) if !list.is_empty() => list,
            _ => self.setor.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        let setores = entity.setores_list();
        Self {
            id: entity.id,
            nome: entity.nome,
            sobrenome: entity.sobrenome,
            usuario: entity.usuario,
            email: entity.email,
            senha_hash: entity.senha_hash,
            nivel_acesso: NivelAcesso::from_str(&entity.nivel_acesso)
                .unwrap_or(NivelAcesso::Colaborador),
            setor: entity.setor,
            setores,
            alterar_senha_primeiro_acesso: entity.alterar_senha_primeiro_acesso,
            bloqueado: entity.bloqueado,
            tentativas_login: entity.tentativas_login,
            sessoes_invalidas_apos: entity.sessoes_invalidas_apos,
            criado_em: entity.criado_em,
        }
    }
}
