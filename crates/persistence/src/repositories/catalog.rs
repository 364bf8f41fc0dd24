//! Catalog repository (problem categories and units).

use sqlx::PgPool;

use domain::models::{CreateProblemInput, CreateUnitInput};

use crate::entities::{ProblemCategoryEntity, UnitEntity};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_problems(&self) -> Result<Vec<ProblemCategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_problemas");
        let result = sqlx::query_as::<_, ProblemCategoryEntity>(
            "SELECT id, nome, prioridade_padrao, requer_item_internet, ativo \
             FROM problemas WHERE ativo ORDER BY nome",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn insert_problem(
        &self,
        input: &CreateProblemInput,
    ) -> Result<ProblemCategoryEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_problema");
        let result = sqlx::query_as::<_, ProblemCategoryEntity>(
            r#"
            INSERT INTO problemas (nome, prioridade_padrao, requer_item_internet)
            VALUES ($1, $2, $3)
            RETURNING id, nome, prioridade_padrao, requer_item_internet, ativo
            "#,
        )
        .bind(&input.nome)
        .bind(&input.prioridade)
        .bind(input.requer_internet)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_units(&self) -> Result<Vec<UnitEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_unidades");
        let result = sqlx::query_as::<_, UnitEntity>(
            "SELECT id, nome, cidade, criado_em FROM unidades ORDER BY nome",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn insert_unit(&self, input: &CreateUnitInput) -> Result<UnitEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_unidade");
        let result = sqlx::query_as::<_, UnitEntity>(
            r#"
            INSERT INTO unidades (nome, cidade)
            VALUES ($1, $2)
            RETURNING id, nome, cidade, criado_em
            "#,
        )
        .bind(&input.nome)
        .bind(&input.cidade)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
