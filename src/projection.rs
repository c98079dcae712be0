use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ctr::SERP_CTR;
use crate::metrics::sane_amount;
use crate::models::BusinessContext;

/// Session target derived from the quantitative goal, plus the search
/// volume needed to hit it from each SERP position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProjection {
    pub monthly_avg_sessions: f64,
    pub monthly_sessions_projection: u64,
    /// One row per CTR table entry, in position order 1..=10.
    pub required_volume: Vec<PositionVolume>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionVolume {
    pub position: u8,
    pub ctr: f64,
    pub required_volume: u64,
}

/// Derive the monthly session target from historical performance.
///
/// Returns `None` when `current_result` is zero (or otherwise unusable):
/// the projection is undefined, and callers render "N/A" instead of a
/// number. NaN/Infinity never escape this function.
pub fn project_goal(ctx: &BusinessContext) -> Option<GoalProjection> {
    if !(ctx.current_result.is_finite() && ctx.current_result > 0.0) {
        warn!(
            "Goal projection unavailable - current_result={} (division guard)",
            ctx.current_result
        );
        return None;
    }

    let monthly_avg_sessions = sane_amount(ctx.current_sessions) / 12.0;
    let projection =
        (sane_amount(ctx.quantitative_goal) * monthly_avg_sessions / ctx.current_result).ceil();
    let monthly_sessions_projection = projection as u64;

    let required_volume = SERP_CTR
        .iter()
        .map(|row| PositionVolume {
            position: row.position,
            ctr: row.ctr,
            // ctr is stored as whole percent, hence the *100
            required_volume: (monthly_sessions_projection as f64 * 100.0 / row.ctr).round() as u64,
        })
        .collect();

    Some(GoalProjection {
        monthly_avg_sessions,
        monthly_sessions_projection,
        required_volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(current_sessions: f64, quantitative_goal: f64, current_result: f64) -> BusinessContext {
        BusinessContext {
            current_sessions,
            quantitative_goal,
            current_result,
            ..Default::default()
        }
    }

    #[test]
    fn reference_projection() {
        // 120k annual sessions, €50k goal against €40k current result
        let p = project_goal(&ctx(120_000.0, 50_000.0, 40_000.0)).unwrap();
        assert_eq!(p.monthly_avg_sessions, 10_000.0);
        assert_eq!(p.monthly_sessions_projection, 12_500);
    }

    #[test]
    fn zero_current_result_is_unavailable() {
        assert!(project_goal(&ctx(120_000.0, 50_000.0, 0.0)).is_none());
        assert!(project_goal(&ctx(120_000.0, 50_000.0, f64::NAN)).is_none());
    }

    #[test]
    fn required_volume_rows_follow_table_order() {
        let p = project_goal(&ctx(120_000.0, 50_000.0, 40_000.0)).unwrap();
        assert_eq!(p.required_volume.len(), SERP_CTR.len());
        for (row, table) in p.required_volume.iter().zip(SERP_CTR.iter()) {
            assert_eq!(row.position, table.position);
            assert_eq!(row.ctr, table.ctr);
        }
        // worse positions need strictly more volume
        for pair in p.required_volume.windows(2) {
            assert!(pair[1].required_volume > pair[0].required_volume);
        }
        // position 1 at 32.26% CTR: round(12500 * 100 / 32.26)
        assert_eq!(p.required_volume[0].required_volume, 38_748);
    }

    #[test]
    fn negative_history_degrades_to_zero_not_unavailable() {
        // only current_result = 0 is undefined; bad sessions/goal clamp to 0
        let p = project_goal(&ctx(-120_000.0, 50_000.0, 40_000.0)).unwrap();
        assert_eq!(p.monthly_avg_sessions, 0.0);
        assert_eq!(p.monthly_sessions_projection, 0);
        assert!(p.required_volume.iter().all(|r| r.required_volume == 0));
    }

    #[test]
    fn fractional_projection_rounds_up() {
        // 100 * (1200/12) / 3000 = 3.33.. → 4
        let p = project_goal(&ctx(1200.0, 100.0, 3000.0)).unwrap();
        assert_eq!(p.monthly_sessions_projection, 4);
    }
}
