use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::pipeline::{FieldResponses, SummaryInput, compose};
use crate::telemetry::metrics::SUMMARIES_COMPOSED;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummaryBody {
    pub client_name: String,
    pub template_name: String,
    pub field_responses: FieldResponses,
    #[serde(default)]
    pub graph_insights: Option<Vec<String>>,
    #[serde(default)]
    pub spreadsheet_insights: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummaryResponse {
    pub client_name: String,
    pub executive_summary: String,
}

#[tracing::instrument(
    name = "generate_executive_summary",
    skip(body),
    fields(template.requested = %body.template_name)
)]
pub async fn generate_executive_summary(
    Json(body): Json<ExecutiveSummaryBody>,
) -> AppResult<Json<ExecutiveSummaryResponse>> {
    let graph_insights = body.graph_insights.unwrap_or_default();
    let spreadsheet_insights = body.spreadsheet_insights.unwrap_or_default();

    let executive_summary = compose(SummaryInput {
        client_name: &body.client_name,
        field_responses: &body.field_responses,
        graph_insights: &graph_insights,
        spreadsheet_insights: &spreadsheet_insights,
    });

    SUMMARIES_COMPOSED.add(1, &[]);

    Ok(Json(ExecutiveSummaryResponse {
        client_name: body.client_name,
        executive_summary,
    }))
}
