pub mod config_store;
pub mod descriptor;

use std::sync::Arc;

use thiserror::Error;

pub use config_store::StaticTemplateRegistry;
pub use descriptor::{TemplateDescriptor, UploadRequirement};

#[derive(Error, Debug)]
pub enum RegistryError {
    /// Carries the name exactly as the caller supplied it.
    #[error("no template registered for '{0}'")]
    NotFound(String),

    #[error("failed to read template registry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template registry: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid template registry: {0}")]
    Invalid(String),
}

/// Source of template descriptors. The static table is the only
/// implementation today; a database-backed one slots in behind the same trait.
#[async_trait::async_trait]
pub trait TemplateProvider: Send + Sync {
    async fn resolve(&self, template_name: &str) -> Result<Arc<TemplateDescriptor>, RegistryError>;
    async fn template_ids(&self) -> Vec<String>;
}

pub fn normalize_template_id(name: &str) -> String {
    name.trim().to_lowercase()
}
