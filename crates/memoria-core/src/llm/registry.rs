//! ModelRegistry trait and extraction-model selection.
//!
//! The registry lists the models an operator has configured. Extraction
//! resolves the configured default identifier against the *active* models,
//! falling back to the first active model unless strict selection is on.

use memoria_types::error::{MemoryError, RepositoryError};
use memoria_types::llm::AiModel;

/// Repository trait for the registered model catalog.
///
/// Implementations live in memoria-infra (e.g., `SqliteModelRegistry`).
pub trait ModelRegistry: Send + Sync {
    /// List registered models in registration order, optionally only active ones.
    fn list(
        &self,
        active_only: bool,
    ) -> impl std::future::Future<Output = Result<Vec<AiModel>, RepositoryError>> + Send;
}

/// Pick the model used for extraction from a list of active models.
///
/// - A model whose `model_identifier` equals `default_identifier` wins.
/// - Otherwise the first active model is used, unless `strict` is set.
/// - With no active models at all, this is a configuration error.
pub fn choose_model(
    models: Vec<AiModel>,
    default_identifier: Option<&str>,
    strict: bool,
) -> Result<AiModel, MemoryError> {
    let mut active: Vec<AiModel> = models.into_iter().filter(|m| m.is_active).collect();

    if let Some(wanted) = default_identifier {
        if let Some(pos) = active.iter().position(|m| m.model_identifier == wanted) {
            return Ok(active.swap_remove(pos));
        }
        if strict {
            return Err(MemoryError::Configuration(format!(
                "default model '{wanted}' is not an active model"
            )));
        }
        tracing::warn!(
            default_model = wanted,
            "Configured default model not active; falling back to first active model"
        );
    }

    if active.is_empty() {
        return Err(MemoryError::Configuration(
            "no active models available for memory extraction".to_string(),
        ));
    }

    Ok(active.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn model(identifier: &str, active: bool) -> AiModel {
        AiModel {
            id: Uuid::now_v7(),
            name: identifier.to_uppercase(),
            model_identifier: identifier.to_string(),
            is_active: active,
        }
    }

    #[test]
    fn picks_configured_default() {
        let models = vec![model("a", true), model("b", true)];
        let chosen = choose_model(models, Some("b"), false).unwrap();
        assert_eq!(chosen.model_identifier, "b");
    }

    #[test]
    fn falls_back_to_first_active() {
        let models = vec![model("a", false), model("b", true), model("c", true)];
        let chosen = choose_model(models, Some("missing"), false).unwrap();
        assert_eq!(chosen.model_identifier, "b");
    }

    #[test]
    fn ignores_inactive_default() {
        let models = vec![model("a", false), model("b", true)];
        let chosen = choose_model(models, Some("a"), false).unwrap();
        assert_eq!(chosen.model_identifier, "b");
    }

    #[test]
    fn no_default_uses_first_active() {
        let models = vec![model("a", true), model("b", true)];
        let chosen = choose_model(models, None, false).unwrap();
        assert_eq!(chosen.model_identifier, "a");
    }

    #[test]
    fn strict_mode_rejects_missing_default() {
        let models = vec![model("a", true)];
        let err = choose_model(models, Some("b"), true).unwrap_err();
        assert!(matches!(err, MemoryError::Configuration(_)));
    }

    #[test]
    fn no_active_models_is_configuration_error() {
        let models = vec![model("a", false)];
        let err = choose_model(models, None, false).unwrap_err();
        assert!(matches!(err, MemoryError::Configuration(_)));

        let err = choose_model(Vec::new(), Some("a"), false).unwrap_err();
        assert!(matches!(err, MemoryError::Configuration(_)));
    }
}
