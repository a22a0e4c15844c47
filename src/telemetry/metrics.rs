use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("report-assembler"));

// --- Domain Metrics ---

pub static TEMPLATE_LOOKUPS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.template.lookups")
        .with_description("Template field lookups by outcome")
        .with_unit("{lookup}")
        .build()
});

pub static INSIGHTS_PRODUCED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.insights.produced")
        .with_description("Insight strings returned by analysis providers")
        .with_unit("{insight}")
        .build()
});

pub static SUMMARIES_COMPOSED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.summaries.composed")
        .with_description("Executive summaries composed")
        .with_unit("{summary}")
        .build()
});

pub static REPORT_DOCUMENTS_GENERATED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.documents.generated")
        .with_description("Report documents written to the output directory")
        .with_unit("{document}")
        .build()
});

pub static REPORT_DOCUMENT_BYTES: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.document.size")
        .with_description("Size of generated report documents")
        .with_unit("By")
        .build()
});

pub static REPORT_KEY_FINDINGS: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.key_findings")
        .with_description("Number of key findings per generated document")
        .with_unit("{finding}")
        .build()
});

pub static REPORT_ASSEMBLY_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.assembly.duration")
        .with_description("Document assembly duration in seconds")
        .with_unit("s")
        .build()
});

// --- HTTP Metrics ---

pub static HTTP_REQUESTS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("http.requests.total")
        .with_description("Total number of HTTP requests")
        .with_unit("{request}")
        .build()
});

pub static HTTP_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("http.request.duration")
        .with_description("HTTP request duration in milliseconds")
        .with_unit("ms")
        .with_boundaries(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
        ])
        .build()
});
