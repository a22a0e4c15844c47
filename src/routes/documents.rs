use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{AssembleRequest, DOCX_CONTENT_TYPE};

#[derive(Debug, Default)]
struct ReportForm {
    client_name: Option<String>,
    template_name: Option<String>,
    executive_summary: Option<String>,
    key_findings: Vec<String>,
    graph_files: usize,
}

impl ReportForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "clientName" => form.client_name = Some(field.text().await?),
                "templateName" => form.template_name = Some(field.text().await?),
                "executiveSummary" => form.executive_summary = Some(field.text().await?),
                "keyFindings" => form.key_findings.push(field.text().await?),
                // Accepted for a future embedding step; the bytes are drained and dropped.
                "graphFiles" => {
                    field.bytes().await?;
                    form.graph_files += 1;
                }
                _ => {}
            }
        }
        Ok(form)
    }

    fn into_request(self) -> AppResult<AssembleRequest> {
        if self.key_findings.is_empty() {
            return Err(AppError::Validation("keyFindings is required".into()));
        }
        Ok(AssembleRequest {
            client_name: required(self.client_name, "clientName")?,
            template_name: required(self.template_name, "templateName")?,
            executive_summary: required(self.executive_summary, "executiveSummary")?,
            key_findings: self.key_findings,
        })
    }
}

fn required(value: Option<String>, name: &str) -> AppResult<String> {
    value.ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

#[tracing::instrument(name = "generate_report_docx", skip_all, fields(upload.graph_files))]
pub async fn generate_report_docx(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = ReportForm::read(multipart).await?;
    tracing::Span::current().record("upload.graph_files", form.graph_files);

    let artifact = state.documents.assemble(form.into_request()?).await?;
    tracing::debug!(path = %artifact.path.display(), "Streaming report document");

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&artifact.file_name),
            ),
        ],
        artifact.content,
    ))
}

/// Quoted `filename` for plain ASCII names, RFC 5987 `filename*` otherwise.
fn content_disposition(file_name: &str) -> String {
    if file_name
        .chars()
        .all(|c| c.is_ascii_graphic() || c == ' ')
    {
        let escaped = file_name.replace('\\', "\\\\").replace('"', "\\\"");
        return format!("attachment; filename=\"{escaped}\"");
    }

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename*=utf-8''{encoded}")
}
