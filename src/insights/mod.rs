pub mod stub;

use std::sync::Arc;

use axum::body::Bytes;

pub use stub::StubInsightProvider;

/// An uploaded file as received from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Turns uploaded media exports into short insight strings.
#[async_trait::async_trait]
pub trait InsightProvider: Send + Sync {
    async fn analyze_graphs(&self, files: &[UploadedFile]) -> anyhow::Result<Vec<String>>;
    async fn analyze_spreadsheet(&self, file: &UploadedFile) -> anyhow::Result<Vec<String>>;
    fn name(&self) -> &str;
}

pub fn build_provider(kind: &str) -> anyhow::Result<Arc<dyn InsightProvider>> {
    match kind {
        "stub" => Ok(Arc::new(StubInsightProvider)),
        other => Err(anyhow::anyhow!("unknown insight provider '{other}'")),
    }
}
