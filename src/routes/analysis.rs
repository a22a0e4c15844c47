use axum::{
    Json,
    extract::{Multipart, State},
};
use opentelemetry::KeyValue;
use serde::Serialize;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::telemetry::metrics::INSIGHTS_PRODUCED;

use super::uploads::read_upload;

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: Vec<String>,
}

#[tracing::instrument(name = "analyze_graphs", skip_all, fields(upload.files))]
pub async fn analyze_graphs(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<InsightsResponse>> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("files") {
            files.push(read_upload(field).await?);
        }
    }

    if files.is_empty() {
        return Err(AppError::Validation(
            "at least one 'files' upload is required".into(),
        ));
    }
    tracing::Span::current().record("upload.files", files.len());

    let insights = state
        .insights
        .analyze_graphs(&files)
        .await
        .map_err(|e| AppError::Analysis(e.to_string()))?;

    INSIGHTS_PRODUCED.add(
        insights.len() as u64,
        &[
            KeyValue::new("insight.kind", "graph"),
            KeyValue::new("insight.provider", state.insights.name().to_string()),
        ],
    );

    Ok(Json(InsightsResponse { insights }))
}

#[tracing::instrument(name = "analyze_spreadsheet", skip_all, fields(upload.bytes))]
pub async fn analyze_spreadsheet(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<InsightsResponse>> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            if file.is_some() {
                return Err(AppError::Validation(
                    "exactly one 'file' upload is expected".into(),
                ));
            }
            file = Some(read_upload(field).await?);
        }
    }

    let file =
        file.ok_or_else(|| AppError::Validation("a 'file' upload is required".into()))?;
    tracing::Span::current().record("upload.bytes", file.data.len());

    let insights = state
        .insights
        .analyze_spreadsheet(&file)
        .await
        .map_err(|e| AppError::Analysis(e.to_string()))?;

    INSIGHTS_PRODUCED.add(
        insights.len() as u64,
        &[
            KeyValue::new("insight.kind", "spreadsheet"),
            KeyValue::new("insight.provider", state.insights.name().to_string()),
        ],
    );

    Ok(Json(InsightsResponse { insights }))
}
