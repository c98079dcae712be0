use anyhow::Result;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::metrics::{aggregate, keyword_metrics};
use crate::models::{BusinessContext, Cluster, Keyword};

/// A cluster is kept only when it groups at least this many keywords...
const MIN_CLUSTER_SIZE: usize = 2;
/// ...or its lone keyword carries at least this much monthly volume.
const SINGLETON_VOLUME_FLOOR: u64 = 1000;

/// Greedy topical clustering over a confirmed keyword set.
///
/// Keywords are seeded in volume-descending order (stable sort, so
/// volume ties keep their input order and reruns are reproducible).
/// Each seed absorbs every still-unassigned keyword whose similarity
/// to it reaches `threshold`. A scoring failure for a pair is logged
/// and treated as "not similar" rather than aborting the pass.
pub fn generate_clusters<S>(
    keywords: &[Keyword],
    ctx: &BusinessContext,
    threshold: f64,
    similarity: S,
) -> Vec<Cluster>
where
    S: Fn(&str, &str) -> Result<f64> + Sync,
{
    debug!(
        "Clustering started - keywords={}, threshold={}",
        keywords.len(),
        threshold
    );

    let mut sorted: Vec<&Keyword> = keywords.iter().collect();
    sorted.sort_by(|a, b| b.volume.cmp(&a.volume));

    // assignment is by exact keyword text, as duplicates within a tier
    // are the same research entry
    let mut assigned: HashSet<&str> = HashSet::new();
    let mut clusters = Vec::new();
    let mut dropped = 0usize;

    for (i, seed) in sorted.iter().enumerate() {
        if assigned.contains(seed.keyword.as_str()) {
            continue;
        }
        assigned.insert(seed.keyword.as_str());

        // grow cluster - parallel pairwise scan against the seed only;
        // order-stable because assignment happens after collect
        let candidates: Vec<&Keyword> = sorted[i + 1..]
            .iter()
            .filter(|k| !assigned.contains(k.keyword.as_str()))
            .copied()
            .collect();

        let matched: Vec<&Keyword> = candidates
            .par_iter()
            .filter(|k| match similarity(&seed.keyword, &k.keyword) {
                Ok(score) => score >= threshold,
                Err(e) => {
                    warn!(
                        "Similarity scoring failed - seed={:?}, keyword={:?}: {e:#}",
                        seed.keyword, k.keyword
                    );
                    false
                }
            })
            .copied()
            .collect();

        let mut members: Vec<Keyword> = Vec::with_capacity(matched.len() + 1);
        members.push((*seed).clone());
        for k in matched {
            assigned.insert(k.keyword.as_str());
            members.push(k.clone());
        }

        // skip single low-volume clusters
        if members.len() < MIN_CLUSTER_SIZE && members[0].volume < SINGLETON_VOLUME_FLOOR {
            dropped += 1;
            continue;
        }

        let agg = aggregate(&members, ctx);
        let cluster_id = stable_cluster_id(&members);

        clusters.push(Cluster {
            cluster_id,
            name: seed.keyword.clone(),
            funnel_stage: seed.funnel_stage(),
            intent: seed.intent.clone(),
            total_volume: agg.total_volume,
            avg_difficulty: agg.avg_difficulty,
            // pooled volume projected as if it were a single keyword
            metrics: keyword_metrics(agg.total_volume, ctx),
            keywords: members,
        });
    }

    let sizes: Vec<usize> = clusters.iter().map(|c| c.keywords.len()).collect();
    if let (Some(max), Some(min)) = (sizes.iter().max(), sizes.iter().min()) {
        debug!(
            "Cluster size distribution - clusters={}, min={}, max={}, dropped_singletons={}",
            clusters.len(),
            min,
            max,
            dropped
        );
    }

    clusters
}

/// Stable id from member texts so a rerun over the same grouping keeps
/// the same identity.
fn stable_cluster_id(members: &[Keyword]) -> String {
    let seed = members
        .iter()
        .map(|k| k.keyword.as_str())
        .collect::<Vec<_>>()
        .join("|");
    format!("{:016x}", xxh3_64(seed.as_bytes()))
}
