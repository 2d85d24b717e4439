//! Typed payloads for the API's data envelopes. Numeric and optional fields
//! default on absence so a partial response degrades to zeroes in the views
//! instead of failing the whole command.

use serde::{Deserialize, Serialize};

/// `/users/me/dashboard`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardMetrics {
    #[serde(default)]
    pub num_batches: u64,
    #[serde(default)]
    pub num_documents: u64,
}

impl DashboardMetrics {
    /// Average documents per batch; zero for an empty denominator.
    pub fn avg_documents_per_batch(&self) -> f64 {
        if self.num_batches == 0 {
            0.0
        } else {
            self.num_documents as f64 / self.num_batches as f64
        }
    }
}

/// `/users/me/credits`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreditBalance {
    #[serde(default)]
    pub credits: i64,
}

/// `/ai-check`. `score` is the AI probability in `[0, 1]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AiCheckResult {
    #[serde(default)]
    pub is_ai: bool,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub message: String,
}

/// One row of `/batch/{id}/results`. `similarity` is in `[0, 1]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimilarityRow {
    #[serde(default)]
    pub document_name: String,
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub similar_document_name: String,
}

/// `/batch/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_docs: u64,
    #[serde(default)]
    pub analysis_type: String,
}

/// `/admin/stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_batches: u64,
    #[serde(default)]
    pub total_documents: u64,
    #[serde(default)]
    pub storage_usage_mb: f64,
    #[serde(default)]
    pub system_status: String,
    #[serde(default)]
    pub version: String,
}

/// One web source recorded by a plagiarism scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlagiarismSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub max_similarity: f64,
}

/// `data` payload of `/check-plagiarism`. `plagiarism_score` is already a
/// percentage in `[0, 100]`, unlike the fractional scores elsewhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlagiarismReport {
    #[serde(default)]
    pub plagiarism_score: f64,
    #[serde(default)]
    pub sources: Vec<PlagiarismSource>,
    #[serde(default)]
    pub checked_chunks: u64,
    #[serde(default)]
    pub message: String,
}

/// Full outcome of a scan: the report plus the credit balance the server
/// reports next to (not inside) the data envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct PlagiarismOutcome {
    pub report: PlagiarismReport,
    pub remaining_credits: Option<i64>,
}

/// `data` payload of `/documents/upload`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UploadReceipt {
    #[serde(default)]
    pub batch_id: String,
}

/// Export flavors offered by the batch report endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Pdf,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = crate::error::ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "pdf" => Ok(ReportFormat::Pdf),
            other => Err(crate::error::ClientError::input(format!("unknown report format: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default_to_zeroes() {
        let r: AiCheckResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(r.score, 0.0);
        assert!(!r.is_ai);
        assert!(r.label.is_empty());

        let m: DashboardMetrics = serde_json::from_value(json!({"num_documents": 12})).unwrap();
        assert_eq!(m.num_batches, 0);
        assert_eq!(m.num_documents, 12);
    }

    #[test]
    fn avg_documents_per_batch_handles_empty_denominator() {
        let empty = DashboardMetrics::default();
        assert_eq!(empty.avg_documents_per_batch(), 0.0);
        let m = DashboardMetrics { num_batches: 4, num_documents: 10 };
        assert!((m.avg_documents_per_batch() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn similarity_row_decodes() {
        let row: SimilarityRow = serde_json::from_value(json!({
            "document_name": "essay_a.pdf",
            "similarity": 0.42,
            "similar_document_name": "essay_b.pdf",
        }))
        .unwrap();
        assert_eq!(row.document_name, "essay_a.pdf");
        assert!((row.similarity - 0.42).abs() < 1e-9);
    }

    #[test]
    fn report_format_parses() {
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert_eq!("pdf".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert!("xlsx".parse::<ReportFormat>().is_err());
    }
}
