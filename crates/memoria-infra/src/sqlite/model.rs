//! SQLite model registry.

use chrono::Utc;
use memoria_core::llm::registry::ModelRegistry;
use memoria_types::error::RepositoryError;
use memoria_types::llm::AiModel;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_uuid};

/// SQLite-backed implementation of `ModelRegistry`.
pub struct SqliteModelRegistry {
    pool: DatabasePool,
}

impl SqliteModelRegistry {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Register a model. Identifiers are unique.
    pub async fn create(&self, model: &AiModel) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO ai_models (id, name, model_identifier, is_active, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(model.id.to_string())
        .bind(&model.name)
        .bind(&model.model_identifier)
        .bind(model.is_active)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => RepositoryError::Conflict(
                format!("model '{}' already registered", model.model_identifier),
            ),
            other => RepositoryError::Query(other.to_string()),
        })?;

        Ok(())
    }

    /// Activate or deactivate a model by identifier.
    pub async fn set_active(&self, model_identifier: &str, active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE ai_models SET is_active = ? WHERE model_identifier = ?")
            .bind(active)
            .bind(model_identifier)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn row_to_model(row: &sqlx::sqlite::SqliteRow) -> Result<AiModel, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    Ok(AiModel {
        id: parse_uuid(&id, "model id")?,
        name: row
            .try_get("name")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        model_identifier: row
            .try_get("model_identifier")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        is_active: row
            .try_get("is_active")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
    })
}

impl ModelRegistry for SqliteModelRegistry {
    async fn list(&self, active_only: bool) -> Result<Vec<AiModel>, RepositoryError> {
        let sql = if active_only {
            "SELECT * FROM ai_models WHERE is_active = 1 ORDER BY created_at, id"
        } else {
            "SELECT * FROM ai_models ORDER BY created_at, id"
        };

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(row_to_model).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_registry() -> SqliteModelRegistry {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        std::mem::forget(dir);
        SqliteModelRegistry::new(DatabasePool::new(&url).await.unwrap())
    }

    fn model(identifier: &str, is_active: bool) -> AiModel {
        AiModel {
            id: Uuid::now_v7(),
            name: identifier.to_uppercase(),
            model_identifier: identifier.to_string(),
            is_active,
        }
    }

    #[tokio::test]
    async fn test_list_in_registration_order() {
        let registry = test_registry().await;
        registry.create(&model("gpt-4o-mini", true)).await.unwrap();
        registry.create(&model("gpt-4o", false)).await.unwrap();
        registry.create(&model("llama3", true)).await.unwrap();

        let all = registry.list(false).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].model_identifier, "gpt-4o-mini");

        let active: Vec<String> = registry
            .list(true)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.model_identifier)
            .collect();
        assert_eq!(active, vec!["gpt-4o-mini", "llama3"]);
    }

    #[tokio::test]
    async fn test_duplicate_identifier_conflicts() {
        let registry = test_registry().await;
        registry.create(&model("gpt-4o-mini", true)).await.unwrap();
        let err = registry.create(&model("gpt-4o-mini", true)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_set_active() {
        let registry = test_registry().await;
        registry.create(&model("gpt-4o-mini", true)).await.unwrap();

        registry.set_active("gpt-4o-mini", false).await.unwrap();
        assert!(registry.list(true).await.unwrap().is_empty());

        let err = registry.set_active("missing", true).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
