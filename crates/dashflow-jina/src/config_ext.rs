//! Build DocumentCompressor from config
//!
//! This module provides functions to build `JinaRerank` instances from configuration.

use crate::rerank::JinaRerank;
use dashflow::core::config_loader::RerankerConfig;
use dashflow::core::documents::DocumentCompressor;
use dashflow::core::Error as DashFlowError;
use std::sync::Arc;

/// Build a Jina Reranker from a RerankerConfig
///
/// # Example
///
/// ```rust,ignore
/// use dashflow::core::config_loader::{RerankerConfig, SecretReference};
/// use dashflow_jina::build_reranker;
///
/// let config = RerankerConfig::Jina {
///     model: "jina-reranker-v1-base-en".to_string(),
///     api_key: SecretReference::from_env("JINA_API_KEY"),
///     top_n: Some(3),
/// };
///
/// let reranker = build_reranker(&config)?;
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The config is not a Jina config
/// - Secret resolution fails (e.g., environment variable not set)
pub fn build_reranker(
    config: &RerankerConfig,
) -> Result<Arc<dyn DocumentCompressor>, DashFlowError> {
    match config {
        RerankerConfig::Jina {
            model,
            api_key,
            top_n,
        } => {
            let key = api_key.resolve()?;

            let reranker = JinaRerank::builder()
                .api_key(key)
                .model(model.clone())
                .top_n(*top_n)
                .build()
                .map_err(|e| {
                    DashFlowError::InvalidInput(format!("Failed to build Jina reranker: {e}"))
                })?;

            Ok(Arc::new(reranker))
        }
    }
}
