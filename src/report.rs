use crate::models::{AggregateMetrics, Cluster, FunnelBucket};
use crate::projection::GoalProjection;

pub fn render_report(
    date: &str,
    stats: &AggregateMetrics,
    keyword_count: usize,
    buckets: &[FunnelBucket],
    projection: Option<&GoalProjection>,
    clusters: &[Cluster],
) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Keyword Research Report — {date}\n\n"));

    md.push_str("## Overview\n");
    md.push_str(&format!("- Keywords: {}\n", keyword_count));
    md.push_str(&format!("- Total volume: {}\n", stats.total_volume));
    md.push_str(&format!("- Average KD: {}\n", stats.avg_difficulty));
    md.push_str(&format!("- Potential traffic: {}/month\n", stats.total_traffic));
    md.push_str(&format!("- Potential revenue: €{}\n\n", stats.total_revenue));

    md.push_str("## Marketing Funnel\n");
    let analyzed: usize = buckets.iter().map(|b| b.keyword_count).sum();
    if analyzed == 0 {
        md.push_str("No analyzed keywords yet.\n\n");
    } else {
        md.push_str("| Stage | Keywords | Share | Potential visits | Potential revenue |\n");
        md.push_str("|-------|----------|-------|------------------|-------------------|\n");
        for b in buckets {
            md.push_str(&format!(
                "| {} | {} | {:.1}% | {} | €{} |\n",
                b.stage, b.keyword_count, b.percentage, b.potential_visits, b.potential_revenue
            ));
        }
        md.push('\n');
    }

    md.push_str("## Goal Projection\n");
    match projection {
        Some(p) => {
            md.push_str(&format!(
                "{} monthly sessions needed to reach the quantitative goal.\n\n",
                p.monthly_sessions_projection
            ));
            md.push_str("| Position | CTR | Required volume |\n");
            md.push_str("|----------|-----|------------------|\n");
            for row in &p.required_volume {
                md.push_str(&format!(
                    "| {} | {}% | {} |\n",
                    row.position, row.ctr, row.required_volume
                ));
            }
            md.push('\n');
        }
        // undefined projection renders N/A, never a number
        None => md.push_str("N/A — current result is zero, projection undefined.\n\n"),
    }

    if !clusters.is_empty() {
        md.push_str("## Clusters\n");
        for c in clusters {
            md.push_str(&format!(
                "- **{}** — {} keywords, volume {}, KD {}, projected €{}\n",
                c.name,
                c.keywords.len(),
                c.total_volume,
                c.avg_difficulty,
                c.metrics.potential_revenue
            ));
        }
        md.push('\n');
    }

    md
}
