use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api_types::ApiSuggestRow;
use crate::cluster::generate_clusters;
use crate::fetch::{fetch_analysis, load_analysis_file, merge_analysis, merge_auto_suggest};
use crate::import::{dedupe_keywords, parse_keywords};
use crate::metrics::{aggregate, funnel_breakdown, keyword_metrics};
use crate::models::{BusinessContext, Keyword, KeywordMetrics};
use crate::projection::project_goal;
use crate::report::render_report;
use crate::similarity::{word_overlap_similarity, SIMILARITY_THRESHOLD};

pub struct ResearchOptions {
    pub csv_path: String,
    pub context_path: Option<String>,
    pub analysis_url: Option<String>,
    pub analysis_file: Option<String>,
    pub suggest_file: Option<String>,
    pub output_dir: String,
}

/// Keyword as persisted: the stored record plus metrics freshly
/// recomputed under the current context, never a stale copy.
#[derive(Serialize)]
struct KeywordRecord<'a> {
    #[serde(flatten)]
    keyword: &'a Keyword,
    metrics: KeywordMetrics,
}

pub async fn run_research(opts: &ResearchOptions, ymd: &str) -> Result<()> {
    let pipeline_start = std::time::Instant::now();
    info!("Research pipeline started - input={}", opts.csv_path);

    // 1) import keywords
    let import_start = std::time::Instant::now();
    let csv_text = std::fs::read_to_string(&opts.csv_path)
        .with_context(|| format!("Reading {}", opts.csv_path))?;
    let keywords = parse_keywords(&csv_text)?;
    let mut keywords = dedupe_keywords(keywords);
    info!(
        "Import completed - duration={:.2}s, keywords={}",
        import_start.elapsed().as_secs_f32(),
        keywords.len()
    );

    // 2) business context
    let ctx: BusinessContext = match &opts.context_path {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("Reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("Decoding context file {path}"))?
        }
        None => {
            warn!("No business context provided - conversion and revenue figures will be zero");
            BusinessContext::default()
        }
    };

    // 3) classifier enrichment: webhook endpoint wins over a local file
    if let Some(endpoint) = &opts.analysis_url {
        let client = Client::builder().build()?;
        match fetch_analysis(&client, endpoint, &keywords).await {
            Ok(results) => {
                let merged = merge_analysis(&mut keywords, &results);
                info!("Analysis merged - tagged={}/{}", merged, keywords.len());
            }
            // keywords stay unanalyzed; totals still work, funnel split is empty
            Err(e) => warn!("Classifier fetch failed, continuing unanalyzed: {e:#}"),
        }
    } else if let Some(path) = &opts.analysis_file {
        let results = load_analysis_file(path)?;
        let merged = merge_analysis(&mut keywords, &results);
        info!("Analysis merged from file - tagged={}/{}", merged, keywords.len());
    } else {
        debug!("No analysis source configured");
    }

    // 3.5) optional auto-suggest attachments
    if let Some(path) = &opts.suggest_file {
        let text = std::fs::read_to_string(path).with_context(|| format!("Reading {path}"))?;
        let rows: Vec<ApiSuggestRow> = serde_json::from_str(&text)
            .with_context(|| format!("Decoding auto-suggest file {path}"))?;
        let merged = merge_auto_suggest(&mut keywords, &rows);
        debug!("Auto-suggest merged - rows={}", merged);
    }

    // 4) aggregate metrics and funnel split
    let stats = aggregate(&keywords, &ctx);
    let buckets = funnel_breakdown(&keywords, &ctx);
    info!(
        "Aggregation - total_volume={}, avg_kd={}, potential_revenue={}",
        stats.total_volume, stats.avg_difficulty, stats.total_revenue
    );

    // 5) goal projection (may be undefined)
    let projection = project_goal(&ctx);
    match &projection {
        Some(p) => info!(
            "Goal projection - monthly_sessions={}",
            p.monthly_sessions_projection
        ),
        None => info!("Goal projection unavailable"),
    }

    // 6) clustering
    let cluster_start = std::time::Instant::now();
    let clusters = generate_clusters(&keywords, &ctx, SIMILARITY_THRESHOLD, |a, b| {
        Ok(word_overlap_similarity(a, b))
    });
    info!(
        "Clustering completed - duration={:.2}s, clusters={}",
        cluster_start.elapsed().as_secs_f32(),
        clusters.len()
    );

    // 7) persist to date-scoped directory
    let date_dir = std::path::Path::new(&opts.output_dir).join(ymd);
    std::fs::create_dir_all(&date_dir)
        .with_context(|| format!("Creating {}", date_dir.display()))?;

    let records: Vec<KeywordRecord> = keywords
        .iter()
        .map(|k| KeywordRecord {
            keyword: k,
            metrics: keyword_metrics(k.volume, &ctx),
        })
        .collect();
    std::fs::write(
        date_dir.join("keywords.json"),
        serde_json::to_vec_pretty(&records)?,
    )?;
    debug!("Wrote keywords.json");

    std::fs::write(
        date_dir.join("clusters.json"),
        serde_json::to_vec_pretty(&clusters)?,
    )?;
    debug!("Wrote clusters.json");

    let report = render_report(
        ymd,
        &stats,
        keywords.len(),
        &buckets,
        projection.as_ref(),
        &clusters,
    );
    std::fs::write(date_dir.join("report.md"), report.as_bytes())?;
    debug!("Wrote report.md");

    info!(
        "Pipeline completed - total_duration={:.2}s, keywords={}, clusters={}, directory={}",
        pipeline_start.elapsed().as_secs_f32(),
        keywords.len(),
        clusters.len(),
        date_dir.display()
    );
    Ok(())
}
