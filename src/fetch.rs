use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::api_types::{ApiKeywordAnalysis, ApiSuggestRow};
use crate::models::{AnalysisResult, Keyword};

/// POST the keyword batch to the classifier webhook and decode its
/// per-keyword analysis map.
///
/// The response is keyed by keyword text. Entries carrying an error
/// or no body are skipped with a warning; they stay unanalyzed.
pub async fn fetch_analysis(
    client: &Client,
    endpoint: &str,
    keywords: &[Keyword],
) -> Result<HashMap<String, AnalysisResult>> {
    let start = std::time::Instant::now();
    debug!("Classifier request - endpoint={}, keywords={}", endpoint, keywords.len());

    let payload = json!({
        "keywords": keywords
            .iter()
            .map(|k| json!({"keyword": k.keyword, "volume": k.volume}))
            .collect::<Vec<_>>(),
    });

    let resp = client
        .post(endpoint)
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("Request failed for {endpoint}"))?
        .error_for_status()
        .with_context(|| format!("HTTP error for {endpoint}"))?;

    let raw: HashMap<String, ApiKeywordAnalysis> = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {endpoint}"))?;

    let results = flatten_analysis(raw);
    info!(
        "Classifier fetch completed - duration={:.2}s, analyzed={}",
        start.elapsed().as_secs_f32(),
        results.len()
    );
    Ok(results)
}

/// Same map shape as the webhook, read from a local JSON file instead.
pub fn load_analysis_file(path: &str) -> Result<HashMap<String, AnalysisResult>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading analysis file {path}"))?;
    let raw: HashMap<String, ApiKeywordAnalysis> =
        serde_json::from_str(&text).with_context(|| format!("Decoding analysis file {path}"))?;
    Ok(flatten_analysis(raw))
}

fn flatten_analysis(
    raw: HashMap<String, ApiKeywordAnalysis>,
) -> HashMap<String, AnalysisResult> {
    let mut results = HashMap::new();
    for (keyword, entry) in raw {
        if let Some(err) = entry.error {
            warn!("Classifier reported error for {keyword:?}: {err}");
            continue;
        }
        match entry.keyword_analysis {
            Some(body) => {
                let analysis = body.into_analysis(&keyword);
                results.insert(keyword, analysis);
            }
            None => warn!("Classifier returned no body for {keyword:?}"),
        }
    }
    results
}

/// Attach analysis results to their keywords, matching by exact text.
/// Returns how many keywords were newly tagged.
pub fn merge_analysis(
    keywords: &mut [Keyword],
    results: &HashMap<String, AnalysisResult>,
) -> usize {
    let mut merged = 0;
    for kw in keywords.iter_mut() {
        if let Some(analysis) = results.get(&kw.keyword) {
            kw.analysis = Some(analysis.clone());
            merged += 1;
        }
    }
    merged
}

/// Attach auto-suggest strings to their keywords. Suggestions arrive
/// as one newline-separated blob per keyword; they carry no numeric
/// meaning anywhere downstream.
pub fn merge_auto_suggest(keywords: &mut [Keyword], rows: &[ApiSuggestRow]) -> usize {
    let mut merged = 0;
    for row in rows {
        if let Some(kw) = keywords.iter_mut().find(|k| k.keyword == row.id) {
            kw.auto_suggest = row
                .auto_suggest
                .lines()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            merged += 1;
        } else {
            debug!("Auto-suggest row for unknown keyword {:?}", row.id);
        }
    }
    merged
}
