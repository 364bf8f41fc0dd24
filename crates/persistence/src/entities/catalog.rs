//! Catalog entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{ProblemCategory, Unit};

/// Database row mapping for the problemas table.
#[derive(Debug, Clone, FromRow)]
pub struct ProblemCategoryEntity {
    pub id: Uuid,
    pub nome: String,
    pub prioridade_padrao: String,
    pub requer_item_internet: bool,
    pub ativo: bool,
}

impl From<ProblemCategoryEntity> for ProblemCategory {
    fn from(entity: ProblemCategoryEntity) -> Self {
        Self {
            id: entity.id,
            nome: entity.nome,
            prioridade_padrao: entity.prioridade_padrao,
            requer_item_internet: entity.requer_item_internet,
            ativo: entity.ativo,
        }
    }
}

/// Database row mapping for the unidades table.
#[derive(Debug, Clone, FromRow)]
pub struct UnitEntity {
    pub id: Uuid,
    pub nome: String,
    pub cidade: String,
    pub criado_em: DateTime<Utc>,
}

impl From<UnitEntity> for Unit {
    fn from(entity: UnitEntity) -> Self {
        Self {
            id: entity.id,
            nome: entity.nome,
            cidade: entity.cidade,
            criado_em: entity.criado_em,
        }
    }
}
