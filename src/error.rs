use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::pipeline::docx::DocxError;
use crate::registry::RegistryError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported template '{0}'.")]
    UnsupportedTemplate(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Template not found: {0}")]
    TemplateFileNotFound(String),

    #[error("Write failure: {0}")]
    WriteFailure(#[source] std::io::Error),

    #[error("Document error: {0}")]
    Document(#[from] DocxError),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(name) => AppError::UnsupportedTemplate(name),
            other => AppError::Internal(other.to_string()),
        }
    }
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UnsupportedTemplate(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Multipart(e) => {
                let status = e.status();
                if status == StatusCode::BAD_REQUEST {
                    (status, format!("malformed multipart body: {}", e.body_text()))
                } else {
                    (status, e.body_text())
                }
            }
            AppError::TemplateFileNotFound(path) => {
                tracing::warn!(template.path = %path, "Template file missing");
                (StatusCode::NOT_FOUND, "Template not found".to_string())
            }
            AppError::WriteFailure(e) => {
                tracing::error!(error = %e, "Failed to write report document");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to write report document".to_string(),
                )
            }
            AppError::Document(e @ DocxError::InvalidCharacter(_)) => {
                (StatusCode::BAD_REQUEST, format!("Report {e}"))
            }
            AppError::Document(e) => {
                tracing::error!(error = %e, "Document error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Analysis(msg) => {
                tracing::error!(error = %msg, "Analysis error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = if let Some(trace_id) = get_trace_id() {
            json!({
                "error": error_message,
                "status": status.as_u16(),
                "trace_id": trace_id,
            })
        } else {
            json!({
                "error": error_message,
                "status": status.as_u16(),
            })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unsupported_template_message_keeps_original_name() {
        let error = AppError::UnsupportedTemplate("  Market Review ".to_string());
        assert_eq!(error.to_string(), "Unsupported template '  Market Review '.");
    }

    #[test]
    fn test_registry_not_found_maps_to_unsupported_template() {
        let error: AppError = RegistryError::NotFound("Press Kit".to_string()).into();
        assert!(matches!(error, AppError::UnsupportedTemplate(ref name) if name == "Press Kit"));
    }

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (
                AppError::Validation("test".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::UnsupportedTemplate("test".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::TemplateFileNotFound("templates/x_template.docx".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::WriteFailure(io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Document(DocxError::MissingPart("word/document.xml")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Document(DocxError::InvalidCharacter('\u{FFFF}')),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Analysis("test".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Internal("test".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let (status, _) = error.status_and_message();
            assert_eq!(status, expected_status, "status for {error}");
        }
    }

    #[test]
    fn test_invalid_character_message_names_code_point() {
        let error = AppError::Document(DocxError::InvalidCharacter('\u{1}'));
        let (_, message) = error.status_and_message();
        assert_eq!(
            message,
            "Report text contains U+0001, which XML 1.0 does not allow"
        );
    }

    #[test]
    fn test_template_not_found_hides_path() {
        let error = AppError::TemplateFileNotFound("/srv/templates/x_template.docx".to_string());
        let (_, message) = error.status_and_message();
        assert_eq!(message, "Template not found");
    }

    #[tokio::test]
    async fn test_into_response_body_shape() {
        let response = AppError::UnsupportedTemplate("Nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Unsupported template 'Nope'.");
        assert_eq!(body["status"], 400);
    }
}
