use super::{InsightProvider, UploadedFile};

const GRAPH_INSIGHTS: [&str; 3] = [
    "Spike in mentions during launch.",
    "Positive sentiment overall.",
    "Top engagement from Instagram.",
];

const SPREADSHEET_INSIGHTS: [&str; 3] = [
    "TechCrunch and Wired were top sources.",
    "Coverage spike on July 10.",
    "Sentiment 65% positive overall.",
];

/// Placeholder analyzer: ignores the uploads and returns canned insights.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubInsightProvider;

#[async_trait::async_trait]
impl InsightProvider for StubInsightProvider {
    #[tracing::instrument(name = "insights.analyze_graphs", skip_all, fields(files = files.len()))]
    async fn analyze_graphs(&self, files: &[UploadedFile]) -> anyhow::Result<Vec<String>> {
        tracing::debug!(
            names = ?files.iter().map(|f| f.file_name.as_deref()).collect::<Vec<_>>(),
            "Returning placeholder graph insights"
        );
        Ok(GRAPH_INSIGHTS.iter().map(|s| s.to_string()).collect())
    }

    #[tracing::instrument(
        name = "insights.analyze_spreadsheet",
        skip_all,
        fields(bytes = file.data.len())
    )]
    async fn analyze_spreadsheet(&self, file: &UploadedFile) -> anyhow::Result<Vec<String>> {
        tracing::debug!(
            name = ?file.file_name,
            content_type = ?file.content_type,
            "Returning placeholder spreadsheet insights"
        );
        Ok(SPREADSHEET_INSIGHTS.iter().map(|s| s.to_string()).collect())
    }

    fn name(&self) -> &str {
        "stub"
    }
}
