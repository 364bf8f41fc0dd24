//! Reference lookup entities: problem categories and units (branches).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A reportable problem category. Name is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemCategory {
    pub id: Uuid,
    pub nome: String,
    pub prioridade_padrao: String,
    pub requer_item_internet: bool,
    pub ativo: bool,
}

/// A company unit/branch. Name is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub nome: String,
    pub cidade: String,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProblemInput {
    #[validate(length(min = 1, max = 100, message = "Nome do problema é obrigatório"))]
    pub nome: String,

    #[validate(custom(function = "shared::validation::validate_prioridade"))]
    pub prioridade: String,

    #[serde(default)]
    pub requer_internet: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUnitInput {
    #[validate(length(min = 1, max = 100, message = "Nome da unidade é obrigatório"))]
    pub nome: String,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub cidade: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_problem_input_validation() {
        let input = CreateProblemInput {
            nome: "Internet".to_string(),
            prioridade: "Alta".to_string(),
            requer_internet: true,
        };
        assert!(input.validate().is_ok());

        let bad = CreateProblemInput {
            prioridade: "Urgentíssima".to_string(),
            ..input.clone()
        };
        assert!(bad.validate().is_err());

        let bad = CreateProblemInput {
            nome: String::new(),
            ..input
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_create_unit_input_validation() {
        let input = CreateUnitInput {
            nome: "Unidade Centro".to_string(),
            cidade: "São Paulo".to_string(),
        };
        assert!(input.validate().is_ok());

        let bad = CreateUnitInput {
            nome: String::new(),
            cidade: String::new(),
        };
        assert!(bad.validate().is_err());
    }
}
