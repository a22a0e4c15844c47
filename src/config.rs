use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    pub template_registry_path: Option<PathBuf>,
    pub insight_provider: String,
    pub max_upload_bytes: usize,
    pub request_timeout_secs: u64,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: parse_var("APP_PORT", "8080")?,
            environment: env::var("APP_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            templates_dir: env::var("TEMPLATES_DIR")
                .unwrap_or_else(|_| "templates".to_string())
                .into(),
            output_dir: env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            template_registry_path: env::var("TEMPLATE_REGISTRY_PATH").ok().map(PathBuf::from),
            insight_provider: env::var("INSIGHT_PROVIDER").unwrap_or_else(|_| "stub".to_string()),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", "52428800")?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", "60")?,
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "report-assembler".to_string()),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .with_context(|| format!("{name} must be a number, got {raw:?}"))
}

#[cfg(test)]
impl Config {
    pub fn for_dirs(templates_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            port: 0,
            environment: "test".to_string(),
            templates_dir,
            output_dir,
            template_registry_path: None,
            insight_provider: "stub".to_string(),
            max_upload_bytes: 1024 * 1024,
            request_timeout_secs: 5,
            otel_service_name: "report-assembler-test".to_string(),
            otel_exporter_endpoint: "http://localhost:4317".to_string(),
        }
    }
}
