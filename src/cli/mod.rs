//! Terminal rendering for the client: percent and average formatting, the
//! similarity results table, and the dashboard's top-up deep link.

use crate::client::models::{AdminStats, AiCheckResult, DashboardMetrics, PlagiarismOutcome, SimilarityRow};

/// Fallback contact used by the top-up link when none is configured.
pub const DEFAULT_ADMIN_WHATSAPP: &str = "6285226462973";

/// Render a fractional score the way the views do: one decimal of value*100.
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Severity bucket for a similarity fraction, matching the report coloring.
pub fn severity(similarity: f64) -> &'static str {
    if similarity > 0.7 {
        "high"
    } else if similarity > 0.3 {
        "medium"
    } else {
        "low"
    }
}

/// WhatsApp deep link asking the operator for a credit top-up.
pub fn topup_link(admin_number: &str, email: &str) -> String {
    let message = format!(
        "Halo admin, saya mau top up plagiarism scan (Paket 150rb untuk 3 kali scan). Email saya: {}",
        email
    );
    format!("https://wa.me/{}?text={}", admin_number, urlencoding::encode(&message))
}

/// Dashboard block: metrics, per-batch average, credit balance and top-up hint.
pub fn render_dashboard(metrics: &DashboardMetrics, credits: i64, email: &str, admin_number: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("batches:         {}\n", metrics.num_batches));
    out.push_str(&format!("documents:       {}\n", metrics.num_documents));
    out.push_str(&format!("avg. per batch:  {:.1}\n", metrics.avg_documents_per_batch()));
    out.push_str(&format!("scan credits:    {}\n", credits));
    if credits == 0 {
        out.push_str("warning: insufficient credits for new scans\n");
        out.push_str(&format!("top up: {}\n", topup_link(admin_number, email)));
    }
    out
}

pub fn render_ai_result(result: &AiCheckResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("score:      {}\n", percent(result.score)));
    out.push_str(&format!("label:      {}\n", result.label));
    out.push_str(&format!("confidence: {}\n", percent(result.confidence)));
    if !result.message.is_empty() {
        out.push_str(&format!("{}\n", result.message));
    }
    out
}

pub fn render_admin_stats(stats: &AdminStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("users:       {}\n", stats.total_users));
    out.push_str(&format!("batches:     {}\n", stats.total_batches));
    out.push_str(&format!("documents:   {}\n", stats.total_documents));
    out.push_str(&format!("storage:     {:.1} MB\n", stats.storage_usage_mb));
    out.push_str(&format!("status:      {}\n", stats.system_status));
    out.push_str(&format!("version:     {}\n", stats.version));
    out
}

pub fn render_scan_outcome(outcome: &PlagiarismOutcome) -> String {
    let mut out = String::new();
    // The scan endpoint reports its score already scaled to [0, 100].
    out.push_str(&format!("plagiarism score: {:.1}%\n", outcome.report.plagiarism_score));
    out.push_str(&format!("chunks checked:   {}\n", outcome.report.checked_chunks));
    for src in &outcome.report.sources {
        out.push_str(&format!(
            "  {} (seen {}x, {})\n",
            if src.title.is_empty() { "(untitled)" } else { src.title.as_str() },
            src.count,
            percent(src.max_similarity)
        ));
    }
    if let Some(credits) = outcome.remaining_credits {
        out.push_str(&format!("remaining credits: {}\n", credits));
    }
    if !outcome.report.message.is_empty() {
        out.push_str(&format!("{}\n", outcome.report.message));
    }
    out
}

/// Render similarity findings as an ASCII table, or the no-findings notice:
/// an empty result set is a clean report, not an empty grid.
pub fn render_results(rows: &[SimilarityRow]) -> String {
    if rows.is_empty() {
        return "No significant similarities were detected in this batch.\n".to_string();
    }

    let headers = ["document", "similarity", "closest match", "severity"];
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            [
                r.document_name.clone(),
                percent(r.similarity),
                r.similar_document_name.clone(),
                severity(r.similarity).to_string(),
            ]
        })
        .collect();

    // Compute widths, capped to keep output readable
    let max_col_width: usize = 60;
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            let w = cell.chars().count().min(max_col_width);
            if w > widths[i] {
                widths[i] = w;
            }
        }
    }

    let mut out = String::new();
    let sep = build_separator(&widths);
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&build_row(&headers.map(|h| h.to_string()), &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&build_row(row, &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&format!("rows: {}\n", rows.len()));
    out
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        s.push(' ');
        s.push_str(&text);
        let pad = w.saturating_sub(text.chars().count());
        s.push_str(&" ".repeat(pad));
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_renders_one_decimal() {
        assert_eq!(percent(0.87), "87.0%");
        assert_eq!(percent(0.0), "0.0%");
        assert_eq!(percent(1.0), "100.0%");
        assert_eq!(percent(0.456), "45.6%");
    }

    #[test]
    fn severity_buckets() {
        assert_eq!(severity(0.9), "high");
        assert_eq!(severity(0.71), "high");
        assert_eq!(severity(0.7), "medium");
        assert_eq!(severity(0.31), "medium");
        assert_eq!(severity(0.3), "low");
        assert_eq!(severity(0.0), "low");
    }

    #[test]
    fn topup_link_encodes_the_email() {
        let link = topup_link(DEFAULT_ADMIN_WHATSAPP, "me@example.com");
        assert!(link.starts_with("https://wa.me/6285226462973?text="));
        assert!(link.contains("me%40example.com"));
        assert!(!link.contains(' '));
    }

    #[test]
    fn empty_results_render_the_notice() {
        let out = render_results(&[]);
        assert!(out.contains("No significant similarities"));
        assert!(!out.contains('|'));
    }

    #[test]
    fn results_table_contains_rows_and_buckets() {
        let rows = vec![
            SimilarityRow {
                document_name: "essay_a.pdf".into(),
                similarity: 0.82,
                similar_document_name: "essay_b.pdf".into(),
            },
            SimilarityRow {
                document_name: "notes.txt".into(),
                similarity: 0.12,
                similar_document_name: "draft.txt".into(),
            },
        ];
        let out = render_results(&rows);
        assert!(out.contains("essay_a.pdf"));
        assert!(out.contains("82.0%"));
        assert!(out.contains("high"));
        assert!(out.contains("low"));
        assert!(out.contains("rows: 2"));
    }

    #[test]
    fn dashboard_warns_only_at_zero_credits() {
        let metrics = DashboardMetrics { num_batches: 2, num_documents: 5 };
        let broke = render_dashboard(&metrics, 0, "me@example.com", DEFAULT_ADMIN_WHATSAPP);
        assert!(broke.contains("insufficient credits"));
        assert!(broke.contains("wa.me"));
        let funded = render_dashboard(&metrics, 3, "me@example.com", DEFAULT_ADMIN_WHATSAPP);
        assert!(!funded.contains("insufficient credits"));
        assert!(funded.contains("avg. per batch:  2.5"));
    }
}
