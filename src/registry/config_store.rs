use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::descriptor::TemplateDescriptor;
use super::{RegistryError, TemplateProvider, normalize_template_id};

const BUILTIN_REGISTRY: &str = include_str!("../../data/templates.toml");

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    templates: Vec<TemplateDescriptor>,
}

/// Template descriptors loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct StaticTemplateRegistry {
    templates: BTreeMap<String, Arc<TemplateDescriptor>>,
}

impl StaticTemplateRegistry {
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_REGISTRY)
    }

    /// Loads from `path` when given, otherwise falls back to the registry
    /// compiled into the binary.
    pub fn load(path: Option<&Path>) -> Result<Self, RegistryError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(raw)?;
        Self::from_descriptors(file.templates)
    }

    pub fn from_descriptors(descriptors: Vec<TemplateDescriptor>) -> Result<Self, RegistryError> {
        if descriptors.is_empty() {
            return Err(RegistryError::Invalid(
                "at least one template must be defined".into(),
            ));
        }

        let mut templates = BTreeMap::new();
        for mut descriptor in descriptors {
            let id = normalize_template_id(&descriptor.id);
            if id.is_empty() {
                return Err(RegistryError::Invalid("template id must not be empty".into()));
            }
            validate_fields(&id, &descriptor)?;

            descriptor.id = id.clone();
            if templates.insert(id.clone(), Arc::new(descriptor)).is_some() {
                return Err(RegistryError::Invalid(format!(
                    "template '{id}' is defined more than once"
                )));
            }
        }

        Ok(Self { templates })
    }
}

fn validate_fields(id: &str, descriptor: &TemplateDescriptor) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for field in &descriptor.fields {
        if field.name.trim().is_empty() || field.prompt.trim().is_empty() {
            return Err(RegistryError::Invalid(format!(
                "template '{id}' has a field with an empty name or prompt"
            )));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(RegistryError::Invalid(format!(
                "template '{id}' lists field '{}' twice",
                field.name
            )));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl TemplateProvider for StaticTemplateRegistry {
    async fn resolve(&self, template_name: &str) -> Result<Arc<TemplateDescriptor>, RegistryError> {
        self.templates
            .get(&normalize_template_id(template_name))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(template_name.to_string()))
    }

    async fn template_ids(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_resolves_competitor_analysis_variants() {
        let registry = StaticTemplateRegistry::builtin().unwrap();
        let canonical = registry.resolve("competitor analysis").await.unwrap();

        for variant in [
            "Competitor Analysis",
            "  competitor analysis  ",
            "COMPETITOR ANALYSIS",
            "\tCompetitor analysis\n",
        ] {
            let descriptor = registry.resolve(variant).await.unwrap();
            assert_eq!(descriptor.field_names(), canonical.field_names());
            assert_eq!(descriptor.user_prompts(), canonical.user_prompts());
            assert_eq!(
                descriptor.field_names().len(),
                descriptor.user_prompts().len()
            );
        }
    }

    #[tokio::test]
    async fn test_builtin_contents() {
        let registry = StaticTemplateRegistry::builtin().unwrap();
        let descriptor = registry.resolve("competitor analysis").await.unwrap();

        assert_eq!(descriptor.id, "competitor analysis");
        assert_eq!(descriptor.fields.len(), 7);
        assert_eq!(descriptor.field_names()[0], "clientName");
        assert_eq!(descriptor.user_prompts()[6], "List the competitors being analyzed.");
        assert_eq!(descriptor.uploads.len(), 2);
        assert_eq!(descriptor.uploads[0].kind, "graph");
        assert_eq!(descriptor.uploads[0].source.as_deref(), Some("Meltwater"));
        assert_eq!(
            descriptor.uploads[1].format,
            Some(vec!["csv".to_string(), "xlsx".to_string()])
        );
    }

    #[tokio::test]
    async fn test_unknown_template_keeps_original_name() {
        let registry = StaticTemplateRegistry::builtin().unwrap();
        let err = registry.resolve("  Brand Audit ").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(ref name) if name == "  Brand Audit "));
    }

    #[tokio::test]
    async fn test_ids_are_normalized_at_load() {
        let registry = StaticTemplateRegistry::from_toml_str(
            r#"
            [[templates]]
            id = "  Press Review "
            [[templates.fields]]
            name = "outlet"
            prompt = "Which outlet?"
            "#,
        )
        .unwrap();

        assert_eq!(registry.template_ids().await, vec!["press review"]);
        let descriptor = registry.resolve("PRESS REVIEW").await.unwrap();
        assert!(descriptor.uploads.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = StaticTemplateRegistry::from_toml_str(
            r#"
            [[templates]]
            id = "weekly"
            fields = []
            [[templates]]
            id = "WEEKLY "
            fields = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Invalid(_)));
    }

    #[test]
    fn test_empty_registry_rejected() {
        let err = StaticTemplateRegistry::from_toml_str("").unwrap_err();
        assert!(matches!(err, RegistryError::Invalid(_)));
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let err = StaticTemplateRegistry::from_toml_str(
            r#"
            [[templates]]
            id = "weekly"
            [[templates.fields]]
            name = "topic"
            prompt = "   "
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("weekly"));
    }

    #[test]
    fn test_misspelled_table_is_parse_error() {
        let raw = concat!(
            "[[templates]]\nid = \"brand audit\"\n",
            "[[templates.fields]]\nname = \"brand\"\nprompt = \"Which brand?\"\n",
            "[[templates.upload]]\ntype = \"graph\"\ndescription = \"Graphs\"\n",
        );
        let err = StaticTemplateRegistry::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[test]
    fn test_unknown_upload_key_is_parse_error() {
        let raw = concat!(
            "[[templates]]\nid = \"brand audit\"\n",
            "[[templates.fields]]\nname = \"brand\"\nprompt = \"Which brand?\"\n",
            "[[templates.uploads]]\ntype = \"spreadsheet\"\nformats = [\"csv\"]\ndescription = \"Coverage\"\n",
        );
        let err = StaticTemplateRegistry::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = StaticTemplateRegistry::from_toml_str("[[templates]\nid =").unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[tokio::test]
    async fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.toml");
        std::fs::write(
            &path,
            "[[templates]]\nid = \"brand audit\"\n[[templates.fields]]\nname = \"brand\"\nprompt = \"Which brand?\"\n",
        )
        .unwrap();

        let registry = StaticTemplateRegistry::load(Some(&path)).unwrap();
        assert_eq!(registry.template_ids().await, vec!["brand audit"]);

        let missing = StaticTemplateRegistry::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(missing, Err(RegistryError::Read { .. })));
    }
}
