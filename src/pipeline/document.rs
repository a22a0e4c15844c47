use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use opentelemetry::KeyValue;

use crate::error::AppError;
use crate::telemetry::metrics::{
    REPORT_ASSEMBLY_DURATION, REPORT_DOCUMENT_BYTES, REPORT_DOCUMENTS_GENERATED,
    REPORT_KEY_FINDINGS,
};

use super::docx::{self, Paragraph};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Directories the assembler reads templates from and writes reports into.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AssembleRequest {
    pub template_name: String,
    pub executive_summary: String,
    pub key_findings: Vec<String>,
    pub client_name: String,
}

#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub path: PathBuf,
    pub content: Vec<u8>,
}

/// `Competitor Analysis` becomes `competitor_analysis_template.docx`.
pub fn template_file_name(template_name: &str) -> String {
    format!("{}_template.docx", template_name.replace(' ', "_").to_lowercase())
}

/// Second-granularity timestamps: two reports for the same client in the same
/// second share a name and the later write replaces the earlier file.
pub fn output_file_name(client_name: &str, generated_at: NaiveDateTime) -> String {
    let client = client_name.replace([' ', '/', '\\'], "_");
    format!(
        "{client}_report_{}.docx",
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

impl DocumentStore {
    pub fn new(templates_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn template_path(&self, template_name: &str) -> Result<PathBuf, AppError> {
        if template_name.contains(['/', '\\']) || template_name.contains("..") {
            return Err(AppError::Validation(format!(
                "invalid template name '{template_name}'"
            )));
        }
        Ok(self.templates_dir.join(template_file_name(template_name)))
    }

    pub async fn ensure_output_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.output_dir).await
    }

    #[tracing::instrument(
        name = "pipeline_stage assemble",
        skip(self, request),
        fields(
            pipeline.stage = "assemble",
            report.template = %request.template_name,
            report.key_findings = request.key_findings.len(),
            report.file_name,
            report.bytes,
        )
    )]
    pub async fn assemble(&self, request: AssembleRequest) -> Result<ReportArtifact, AppError> {
        let start = Instant::now();

        let template_path = self.template_path(&request.template_name)?;
        if !tokio::fs::try_exists(&template_path).await.unwrap_or(false) {
            return Err(AppError::TemplateFileNotFound(
                template_path.display().to_string(),
            ));
        }

        let template = tokio::fs::read(&template_path)
            .await
            .map_err(|e| AppError::Internal(format!("reading {}: {e}", template_path.display())))?;

        let paragraphs = report_paragraphs(&request.executive_summary, &request.key_findings);
        let content = tokio::task::spawn_blocking(move || docx::append_paragraphs(&template, &paragraphs))
            .await
            .map_err(|e| AppError::Internal(format!("document assembly task failed: {e}")))??;

        let file_name = output_file_name(&request.client_name, Local::now().naive_local());
        let path = self.output_dir.join(&file_name);
        write_artifact(&path, &content).await?;

        let span = tracing::Span::current();
        span.record("report.file_name", file_name.as_str());
        span.record("report.bytes", content.len());

        let template_kv = KeyValue::new("report.template", request.template_name.to_lowercase());
        REPORT_DOCUMENTS_GENERATED.add(1, &[template_kv.clone()]);
        REPORT_DOCUMENT_BYTES.record(content.len() as f64, &[template_kv.clone()]);
        REPORT_KEY_FINDINGS.record(request.key_findings.len() as f64, &[template_kv.clone()]);
        REPORT_ASSEMBLY_DURATION.record(start.elapsed().as_secs_f64(), &[template_kv]);

        tracing::info!(
            client = %request.client_name,
            file = %path.display(),
            "Report document written"
        );

        Ok(ReportArtifact {
            file_name,
            path,
            content,
        })
    }
}

fn report_paragraphs(executive_summary: &str, key_findings: &[String]) -> Vec<Paragraph> {
    let mut paragraphs = vec![
        Paragraph::heading("Executive Summary"),
        Paragraph::plain(executive_summary),
        Paragraph::heading("Key Findings"),
    ];
    paragraphs.extend(key_findings.iter().map(|f| Paragraph::bullet(f.as_str())));
    paragraphs
}

async fn write_artifact(path: &Path, content: &[u8]) -> Result<(), AppError> {
    tokio::fs::write(path, content)
        .await
        .map_err(AppError::WriteFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::docx::fixtures;
    use chrono::NaiveDate;

    fn store_with_template(name: &str) -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        let output = dir.path().join("uploads");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::create_dir_all(&output).unwrap();
        std::fs::write(templates.join(template_file_name(name)), fixtures::template()).unwrap();
        (dir, DocumentStore::new(templates, output))
    }

    fn request(template_name: &str, findings: &[&str]) -> AssembleRequest {
        AssembleRequest {
            template_name: template_name.to_string(),
            executive_summary: "Executive Summary for Acme Corp:\n\n- a: 1".to_string(),
            key_findings: findings.iter().map(|f| f.to_string()).collect(),
            client_name: "Acme Corp".to_string(),
        }
    }

    #[test]
    fn test_template_file_name_convention() {
        assert_eq!(
            template_file_name("Competitor Analysis"),
            "competitor_analysis_template.docx"
        );
        assert_eq!(template_file_name("weekly"), "weekly_template.docx");
    }

    #[test]
    fn test_output_file_name_format() {
        let at = NaiveDate::from_ymd_opt(2024, 7, 10)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap();
        assert_eq!(
            output_file_name("Acme Corp", at),
            "Acme_Corp_report_20240710_090503.docx"
        );
        assert_eq!(
            output_file_name("a/b\\c", at),
            "a_b_c_report_20240710_090503.docx"
        );
    }

    #[test]
    fn test_same_second_same_client_collides() {
        let at = NaiveDate::from_ymd_opt(2024, 7, 10)
            .unwrap()
            .and_hms_milli_opt(9, 5, 3, 120)
            .unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 7, 10)
            .unwrap()
            .and_hms_milli_opt(9, 5, 3, 980)
            .unwrap();
        assert_eq!(output_file_name("Acme", at), output_file_name("Acme", later));
    }

    #[test]
    fn test_template_path_rejects_traversal() {
        let store = DocumentStore::new("templates", "uploads");
        assert!(matches!(
            store.template_path("../secrets"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            store.template_path("a/b"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            store.template_path("Competitor Analysis").unwrap(),
            PathBuf::from("templates/competitor_analysis_template.docx")
        );
    }

    #[tokio::test]
    async fn test_assemble_writes_findings_in_order() {
        let (_dir, store) = store_with_template("Competitor Analysis");

        let artifact = store
            .assemble(request("Competitor Analysis", &["A", "B"]))
            .await
            .unwrap();

        assert!(artifact.file_name.starts_with("Acme_Corp_report_"));
        assert!(artifact.file_name.ends_with(".docx"));
        assert_eq!(std::fs::read(&artifact.path).unwrap(), artifact.content);

        let xml = fixtures::document_xml(&artifact.content).unwrap();
        assert_eq!(xml.matches(r#"w:val="ListBullet""#).count(), 2);
        assert_eq!(xml.matches(r#"w:val="Heading1""#).count(), 2);

        let summary = xml.find("Executive Summary</w:t>").unwrap();
        let findings = xml.find("Key Findings</w:t>").unwrap();
        let a = xml.find(r#"<w:t xml:space="preserve">A</w:t>"#).unwrap();
        let b = xml.find(r#"<w:t xml:space="preserve">B</w:t>"#).unwrap();
        assert!(summary < findings);
        assert!(findings < a);
        assert!(a < b);
    }

    #[tokio::test]
    async fn test_missing_template_writes_nothing() {
        let (_dir, store) = store_with_template("Competitor Analysis");

        let err = store
            .assemble(request("Market Review", &["A"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TemplateFileNotFound(_)));
        assert_eq!(std::fs::read_dir(&store.output_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_template_writes_nothing() {
        let (_dir, store) = store_with_template("Competitor Analysis");
        std::fs::write(
            store.templates_dir.join("broken_template.docx"),
            b"not a zip archive",
        )
        .unwrap();

        let err = store.assemble(request("broken", &["A"])).await.unwrap_err();

        assert!(matches!(err, AppError::Document(_)));
        assert_eq!(std::fs::read_dir(&store.output_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unwritable_output_is_write_failure() {
        let (dir, mut store) = store_with_template("Competitor Analysis");
        store.output_dir = dir.path().join("missing").join("nested");

        let err = store
            .assemble(request("Competitor Analysis", &["A"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::WriteFailure(_)));
    }

    #[tokio::test]
    async fn test_ensure_output_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("t"), dir.path().join("out/reports"));
        store.ensure_output_dir().await.unwrap();
        assert!(store.output_dir.is_dir());
    }
}
