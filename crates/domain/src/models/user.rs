//! User directory domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NivelAcesso {
    Admin,
    Tecnico,
    Colaborador,
}

impl NivelAcesso {
    pub fn as_str(&self) -> &'static str {
        match self {
            NivelAcesso::Admin => "admin",
            NivelAcesso::Tecnico => "tecnico",
            NivelAcesso::Colaborador => "colaborador",
        }
    }
}

impl FromStr for NivelAcesso {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(NivelAcesso::Admin),
            "tecnico" => Ok(NivelAcesso::Tecnico),
            "colaborador" => Ok(NivelAcesso::Colaborador),
            _ => Err(format!("Nível de acesso inválido: {}", s)),
        }
    }
}

impl fmt::Display for NivelAcesso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account in the user directory.
///
/// `setores` is the full sector access list; the primary sector (`setor`) is
/// its first element, kept denormalized for legacy readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub nome: String,
    pub sobrenome: String,
    pub usuario: String,
    pub email: String,
    #[serde(skip_serializing)] // never leaves the API
    pub senha_hash: String,
    pub nivel_acesso: NivelAcesso,
    pub setor: Option<String>,
    pub setores: Vec<String>,
    pub alterar_senha_primeiro_acesso: bool,
    pub bloqueado: bool,
    #[serde(skip_serializing)]
    pub tentativas_login: i32,
    #[serde(skip_serializing)]
    pub sessoes_invalidas_apos: Option<DateTime<Utc>>,
    pub criado_em: DateTime<Utc>,
}

/// Payload for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 100))]
    pub nome: String,

    #[validate(length(min = 1, max = 100))]
    pub sobrenome: String,

    #[validate(length(min = 3, max = 50, message = "Usuário deve ter ao menos 3 caracteres"))]
    pub usuario: String,

    #[validate(email(message = "E-mail inválido"))]
    pub email: String,

    /// When absent, a temporary password is generated and returned once.
    #[validate(length(min = 6, message = "Senha deve ter ao menos 6 caracteres"))]
    pub senha: Option<String>,

    pub nivel_acesso: NivelAcesso,

    pub setores: Option<Vec<String>>,

    #[serde(default = "default_true")]
    pub alterar_senha_primeiro_acesso: bool,

    #[serde(default)]
    pub bloqueado: bool,
}

fn default_true() -> bool {
    true
}

impl CreateUserInput {
    /// Primary sector: first entry of the sector list, when any.
    pub fn setor_principal(&self) -> Option<String> {
        self.setores
            .as_ref()
            .and_then(|s| s.first())
            .map(|s| s.to_string())
    }
}

/// Login payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Usuário é obrigatório"))]
    pub usuario: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub senha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nivel_acesso_roundtrip() {
        for nivel in [
            NivelAcesso::Admin,
            NivelAcesso::Tecnico,
            NivelAcesso::Colaborador,
        ] {
            assert_eq!(NivelAcesso::from_str(nivel.as_str()).unwrap(), nivel);
        }
        assert_eq!(NivelAcesso::from_str("ADMIN").unwrap(), NivelAcesso::Admin);
        assert!(NivelAcesso::from_str("root").is_err());
    }

    #[test]
    fn test_setor_principal_is_first_entry() {
        let mut input = CreateUserInput {
            nome: "Ana".to_string(),
            sobrenome: "Lima".to_string(),
            usuario: "ana.lima".to_string(),
            email: "ana@example.com".to_string(),
            senha: None,
            nivel_acesso: NivelAcesso::Tecnico,
            setores: Some(vec!["TI".to_string(), "Financeiro".to_string()]),
            alterar_senha_primeiro_acesso: true,
            bloqueado: false,
        };
        assert_eq!(input.setor_principal().as_deref(), Some("TI"));

        input.setores = None;
        assert_eq!(input.setor_principal(), None);
    }

    #[test]
    fn test_user_serialization_hides_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            nome: "Ana".to_string(),
            sobrenome: "Lima".to_string(),
            usuario: "ana.lima".to_string(),
            email: "ana@example.com".to_string(),
            senha_hash: "$argon2id$segredo".to_string(),
            nivel_acesso: NivelAcesso::Admin,
            setor: Some("TI".to_string()),
            setores: vec!["TI".to_string()],
            alterar_senha_primeiro_acesso: false,
            bloqueado: false,
            tentativas_login: 0,
            sessoes_invalidas_apos: None,
            criado_em: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("senha_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"nivel_acesso\":\"admin\""));
    }
}
