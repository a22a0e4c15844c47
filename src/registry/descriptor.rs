use serde::{Deserialize, Serialize};

/// One entry the user must fill in for a template, paired with the question
/// shown to them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateField {
    pub name: String,
    pub prompt: String,
}

/// A file the caller is expected to upload alongside the field answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadRequirement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Vec<String>>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateDescriptor {
    pub id: String,
    pub fields: Vec<TemplateField>,
    #[serde(default)]
    pub uploads: Vec<UploadRequirement>,
}

impl TemplateDescriptor {
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn user_prompts(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.prompt.clone()).collect()
    }
}
