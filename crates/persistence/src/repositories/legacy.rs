//! Tolerant reader for the pre-migration attachment table.
//!
//! Old deployments carry an `anexos_arquivos` table whose column names
//! drifted across installations. The adapter introspects the table once per
//! process, picks the first recognized name for each logical column and
//! degrades to an empty result set when the table or a required column is
//! missing.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use domain::models::AttachmentMeta;

const LEGACY_ATTACHMENTS_TABLE: &str = "anexos_arquivos";

/// Recognized spellings per logical column, in preference order.
const NOME_CANDIDATES: &[&str] = &["nome_arquivo", "arquivo_nome"];
const CAMINHO_CANDIDATES: &[&str] = &["caminho_arquivo", "arquivo_caminho"];
const DATA_CANDIDATES: &[&str] = &["data_upload", "criado_em"];

/// Concrete column names resolved for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyColumnMap {
    pub nome: String,
    pub caminho: String,
    pub data: String,
}

/// Pick the concrete column names out of the table's actual columns.
/// Returns `None` when any logical column has no recognized spelling.
pub fn select_column_map<S: AsRef<str>>(columns: &[S]) -> Option<LegacyColumnMap> {
    let pick = |candidates: &[&str]| {
        candidates
            .iter()
            .find(|c| columns.iter().any(|have| have.as_ref() == **c))
            .map(|c| c.to_string())
    };
    Some(LegacyColumnMap {
        nome: pick(NOME_CANDIDATES)?,
        caminho: pick(CAMINHO_CANDIDATES)?,
        data: pick(DATA_CANDIDATES)?,
    })
}

/// A legacy attachment row, already shaped for the history feed.
#[derive(Debug, Clone)]
pub struct LegacyAttachment {
    pub meta: AttachmentMeta,
    pub data_upload: DateTime<Utc>,
}

/// Read-only adapter over `anexos_arquivos`. Schema resolution runs once
/// and is cached for the life of the process.
#[derive(Clone)]
pub struct LegacyAttachmentAdapter {
    pool: PgPool,
    column_map: std::sync::Arc<OnceCell<Option<LegacyColumnMap>>>,
}

impl LegacyAttachmentAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            column_map: std::sync::Arc::new(OnceCell::new()),
        }
    }

    async fn resolve(&self) -> &Option<LegacyColumnMap> {
        self.column_map
            .get_or_init(|| async {
                let columns: Vec<String> = match sqlx::query(
                    "SELECT column_name FROM information_schema.columns \
                     WHERE table_name = $1",
                )
                .bind(LEGACY_ATTACHMENTS_TABLE)
                .fetch_all(&self.pool)
                .await
                {
                    Ok(rows) => rows
                        .iter()
                        .filter_map(|r| r.try_get::<String, _>("column_name").ok())
                        .collect(),
                    Err(err) => {
                        debug!(error = %err, "could not introspect legacy attachment table");
                        return None;
                    }
                };
                if columns.is_empty() {
                    debug!("legacy attachment table absent, adapter disabled");
                    return None;
                }
                let map = select_column_map(&columns);
                match &map {
                    Some(m) => info!(
                        nome = %m.nome,
                        caminho = %m.caminho,
                        data = %m.data,
                        "legacy attachment columns resolved"
                    ),
                    None => info!(
                        ?columns,
                        "legacy attachment table present but unrecognized, adapter disabled"
                    ),
                }
                map
            })
            .await
    }

    /// Legacy attachments recorded for a ticket code. Any failure (missing
    /// table, unrecognized schema, query error) yields an empty list.
    pub async fn find_for_codigo(&self, codigo: &str) -> Vec<LegacyAttachment> {
        let Some(map) = self.resolve().await else {
            return Vec::new();
        };
        let query = format!(
            "SELECT {nome} AS nome, {caminho} AS caminho, {data} AS data_upload \
             FROM {table} WHERE chamado_codigo = $1 ORDER BY {data} ASC",
            nome = map.nome,
            caminho = map.caminho,
            data = map.data,
            table = LEGACY_ATTACHMENTS_TABLE,
        );
        let rows = match sqlx::query(&query).bind(codigo).fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(err) => {
                debug!(codigo, error = %err, "legacy attachment query failed, returning none");
                return Vec::new();
            }
        };
        rows.iter()
            .filter_map(|row| {
                let nome: String = row.try_get("nome").ok()?;
                let caminho: String = row.try_get("caminho").ok()?;
                let data_upload: DateTime<Utc> = row.try_get("data_upload").ok()?;
                Some(LegacyAttachment {
                    meta: AttachmentMeta {
                        id: None,
                        nome_original: nome,
                        caminho_arquivo: caminho,
                        tipo_mime: None,
                        tamanho_bytes: None,
                    },
                    data_upload,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_prefers_canonical_names() {
        let cols = vec![
            "id",
            "chamado_codigo",
            "nome_arquivo",
            "arquivo_nome",
            "caminho_arquivo",
            "data_upload",
            "criado_em",
        ];
        let map = select_column_map(&cols).unwrap();
        assert_eq!(map.nome, "nome_arquivo");
        assert_eq!(map.caminho, "caminho_arquivo");
        assert_eq!(map.data, "data_upload");
    }

    #[test]
    fn test_select_accepts_drifted_names() {
        let cols = vec!["arquivo_nome", "arquivo_caminho", "criado_em"];
        let map = select_column_map(&cols).unwrap();
        assert_eq!(map.nome, "arquivo_nome");
        assert_eq!(map.caminho, "arquivo_caminho");
        assert_eq!(map.data, "criado_em");
    }

    #[test]
    fn test_select_rejects_incomplete_schema() {
        let cols = vec!["arquivo_nome", "criado_em"];
        assert!(select_column_map(&cols).is_none());

        let empty: Vec<&str> = Vec::new();
        assert!(select_column_map(&empty).is_none());
    }
}
