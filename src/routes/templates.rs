use axum::{Json, extract::State};
use opentelemetry::KeyValue;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::AppResult;
use crate::registry::UploadRequirement;
use crate::telemetry::metrics::TEMPLATE_LOOKUPS;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFieldsBody {
    pub client_name: String,
    pub template_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFieldsResponse {
    pub client_name: String,
    pub template: String,
    pub field_names: Vec<String>,
    pub user_prompts: Vec<String>,
    pub requires_uploads: Vec<UploadRequirement>,
}

#[tracing::instrument(
    name = "report_template_fields",
    skip(state, body),
    fields(template.requested = %body.template_name, template.id)
)]
pub async fn report_template_fields(
    State(state): State<AppState>,
    Json(body): Json<TemplateFieldsBody>,
) -> AppResult<Json<TemplateFieldsResponse>> {
    let descriptor = match state.templates.resolve(&body.template_name).await {
        Ok(descriptor) => {
            TEMPLATE_LOOKUPS.add(1, &[KeyValue::new("outcome", "found")]);
            tracing::Span::current().record("template.id", descriptor.id.as_str());
            descriptor
        }
        Err(err) => {
            TEMPLATE_LOOKUPS.add(1, &[KeyValue::new("outcome", "unsupported")]);
            return Err(err.into());
        }
    };

    Ok(Json(TemplateFieldsResponse {
        client_name: body.client_name,
        template: body.template_name,
        field_names: descriptor.field_names(),
        user_prompts: descriptor.user_prompts(),
        requires_uploads: descriptor.uploads.clone(),
    }))
}
