use tracing::debug;

use crate::ctr::FIRST_POSITION_CTR;
use crate::models::{AggregateMetrics, BusinessContext, FunnelBucket, FunnelStage, Keyword, KeywordMetrics};

/// Round-half-up to a non-negative integer. Non-finite or negative
/// intermediates collapse to 0 so a half-filled business context can
/// never poison the pipeline.
fn round_count(x: f64) -> u64 {
    if x.is_finite() && x > 0.0 {
        x.round() as u64
    } else {
        0
    }
}

fn sane_rate(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Non-negative finite values pass through; anything else is 0. Shared
/// with the goal projector, which applies the same input policy.
pub(crate) fn sane_amount(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Project traffic, conversions and revenue for one keyword's monthly
/// search volume, assuming a first-position ranking.
///
/// Pure and idempotent; bad context values degrade to zero outputs
/// instead of failing.
pub fn keyword_metrics(volume: u64, ctx: &BusinessContext) -> KeywordMetrics {
    let potential_traffic = round_count(volume as f64 * FIRST_POSITION_CTR);
    let conversion_rate = sane_rate(ctx.conversion_rate) / 100.0;
    let potential_conversions = round_count(potential_traffic as f64 * conversion_rate);
    let potential_revenue =
        round_count(potential_conversions as f64 * sane_amount(ctx.average_order_value));

    KeywordMetrics {
        potential_traffic,
        potential_conversions,
        potential_revenue,
    }
}

/// Fold a keyword set into totals under the *current* context.
///
/// Per-keyword metrics are recomputed from volume here rather than read
/// from any stored field, so a context edit is reflected immediately
/// even when individual records carry stale numbers.
pub fn aggregate(keywords: &[Keyword], ctx: &BusinessContext) -> AggregateMetrics {
    let mut acc = AggregateMetrics::default();
    let mut difficulty_sum = 0.0f64;

    for kw in keywords {
        let m = keyword_metrics(kw.volume, ctx);
        acc.total_volume += kw.volume;
        acc.total_traffic += m.potential_traffic;
        acc.total_revenue += m.potential_revenue;
        difficulty_sum += sane_rate(kw.difficulty);
    }

    // empty set stays all-zero, no division
    if !keywords.is_empty() {
        acc.avg_difficulty = round_count(difficulty_sum / keywords.len() as f64);
    }
    acc
}

/// Partition the analyzed subset by funnel stage.
///
/// Keywords without a classifier tag are left out entirely, and each
/// stage's percentage is taken over the analyzed count — unanalyzed
/// keywords must not dilute the funnel split.
pub fn funnel_breakdown(keywords: &[Keyword], ctx: &BusinessContext) -> Vec<FunnelBucket> {
    let analyzed: Vec<&Keyword> = keywords.iter().filter(|k| k.funnel_stage().is_some()).collect();
    debug!(
        "Funnel breakdown - analyzed={}/{} keywords",
        analyzed.len(),
        keywords.len()
    );

    FunnelStage::ALL
        .iter()
        .map(|&stage| {
            let stage_keywords: Vec<&&Keyword> = analyzed
                .iter()
                .filter(|k| k.funnel_stage() == Some(stage))
                .collect();

            let stage_volume: u64 = stage_keywords.iter().map(|k| k.volume).sum();
            let m = keyword_metrics(stage_volume, ctx);
            let percentage = if analyzed.is_empty() {
                0.0
            } else {
                stage_keywords.len() as f64 / analyzed.len() as f64 * 100.0
            };

            FunnelBucket {
                stage,
                keyword_count: stage_keywords.len(),
                percentage,
                potential_visits: m.potential_traffic,
                potential_revenue: m.potential_revenue,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisResult;

    fn ctx(conversion_rate: f64, average_order_value: f64) -> BusinessContext {
        BusinessContext {
            conversion_rate,
            average_order_value,
            ..Default::default()
        }
    }

    fn tagged(keyword: &str, volume: u64, stage: FunnelStage) -> Keyword {
        let mut kw = Keyword::new(keyword, volume, 30.0);
        kw.analysis = Some(AnalysisResult {
            content_type: "Target Page".into(),
            search_intent: "Commercial".into(),
            funnel_stage: Some(stage),
            priority: 5.0,
        });
        kw
    }

    #[test]
    fn metrics_for_reference_keyword() {
        // volume 1000 at 2% conversion and €125 AOV
        let m = keyword_metrics(1000, &ctx(2.0, 125.0));
        assert_eq!(m.potential_traffic, 320);
        assert_eq!(m.potential_conversions, 6);
        assert_eq!(m.potential_revenue, 750);
    }

    #[test]
    fn zero_volume_yields_all_zero() {
        let m = keyword_metrics(0, &ctx(2.0, 125.0));
        assert_eq!(m, KeywordMetrics::default());
    }

    #[test]
    fn metrics_are_idempotent() {
        let c = ctx(3.5, 80.0);
        assert_eq!(keyword_metrics(7500, &c), keyword_metrics(7500, &c));
    }

    #[test]
    fn traffic_is_monotone_in_volume() {
        let c = ctx(2.0, 125.0);
        let mut prev = keyword_metrics(0, &c);
        for volume in (0..=20_000).step_by(250) {
            let m = keyword_metrics(volume, &c);
            assert!(m.potential_traffic >= prev.potential_traffic);
            assert!(m.potential_conversions >= prev.potential_conversions);
            assert!(m.potential_revenue >= prev.potential_revenue);
            prev = m;
        }
    }

    #[test]
    fn bad_context_values_degrade_to_zero() {
        assert_eq!(keyword_metrics(1000, &ctx(-5.0, 125.0)).potential_conversions, 0);
        assert_eq!(keyword_metrics(1000, &ctx(2.0, -1.0)).potential_revenue, 0);
        assert_eq!(keyword_metrics(1000, &ctx(f64::NAN, f64::INFINITY)).potential_revenue, 0);
    }

    #[test]
    fn empty_set_aggregates_to_zero() {
        let agg = aggregate(&[], &ctx(2.0, 125.0));
        assert_eq!(agg, AggregateMetrics::default());
    }

    #[test]
    fn aggregate_is_order_independent() {
        let c = ctx(2.0, 125.0);
        let kws = vec![
            Keyword::new("running shoes", 5000, 45.0),
            Keyword::new("trail shoes", 1200, 38.0),
            Keyword::new("blue socks", 500, 12.0),
            Keyword::new("marathon plan", 900, 61.0),
        ];
        let forward = aggregate(&kws, &c);
        let mut reversed = kws.clone();
        reversed.reverse();
        assert_eq!(aggregate(&reversed, &c), forward);

        let mut rotated = kws.clone();
        rotated.rotate_left(2);
        assert_eq!(aggregate(&rotated, &c), forward);
    }

    #[test]
    fn aggregate_reflects_the_current_context() {
        let c = ctx(2.0, 125.0);
        let kws = vec![Keyword::new("running shoes", 1000, 40.0)];
        let agg = aggregate(&kws, &c);
        assert_eq!(agg.total_traffic, 320);
        assert_eq!(agg.total_revenue, 750);
        assert_eq!(agg.avg_difficulty, 40);

        // same keywords under a doubled conversion rate
        let agg2 = aggregate(&kws, &ctx(4.0, 125.0));
        assert_eq!(agg2.total_revenue, 1625); // round(320*0.04)=13, 13*125
    }

    #[test]
    fn funnel_percentage_is_scoped_to_analyzed_keywords() {
        // 10 keywords, 4 analyzed, 2 of them TOFU
        let mut kws = vec![
            tagged("a", 100, FunnelStage::Tofu),
            tagged("b", 100, FunnelStage::Tofu),
            tagged("c", 100, FunnelStage::Mofu),
            tagged("d", 100, FunnelStage::Bofu),
        ];
        for i in 0..6 {
            kws.push(Keyword::new(format!("raw{i}"), 100, 20.0));
        }

        let buckets = funnel_breakdown(&kws, &ctx(2.0, 125.0));
        let tofu = buckets.iter().find(|b| b.stage == FunnelStage::Tofu).unwrap();
        assert_eq!(tofu.keyword_count, 2);
        assert!((tofu.percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn funnel_breakdown_of_unanalyzed_set_is_empty_buckets() {
        let kws = vec![Keyword::new("raw", 100, 20.0)];
        for bucket in funnel_breakdown(&kws, &ctx(2.0, 125.0)) {
            assert_eq!(bucket.keyword_count, 0);
            assert_eq!(bucket.percentage, 0.0);
        }
    }
}
