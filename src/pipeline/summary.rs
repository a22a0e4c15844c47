use serde_json::{Map, Value};

/// Field name to answer, in the order the request supplied them.
pub type FieldResponses = Map<String, Value>;

pub struct SummaryInput<'a> {
    pub client_name: &'a str,
    pub field_responses: &'a FieldResponses,
    pub graph_insights: &'a [String],
    pub spreadsheet_insights: &'a [String],
}

#[tracing::instrument(
    name = "pipeline_stage compose",
    skip(input),
    fields(
        pipeline.stage = "compose",
        summary.fields = input.field_responses.len(),
        summary.insights = input.graph_insights.len() + input.spreadsheet_insights.len(),
    )
)]
pub fn compose(input: SummaryInput<'_>) -> String {
    let title = format!("Executive Summary for {}:", input.client_name);

    let field_lines = input
        .field_responses
        .iter()
        .map(|(field, value)| format!("- {field}: {}", render_value(value)));
    let insight_lines = input
        .graph_insights
        .iter()
        .chain(input.spreadsheet_insights)
        .map(|insight| format!("• {insight}"));

    let bullets: Vec<String> = field_lines.chain(insight_lines).collect();
    if bullets.is_empty() {
        return title;
    }

    format!("{title}\n\n{}", bullets.join("\n"))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
