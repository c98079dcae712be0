use serde::{Deserialize, Serialize};
use std::fmt;

/// A search term under research. `analysis` stays `None` until the
/// classifier webhook has returned for this keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub keyword: String,
    pub volume: u64,
    pub difficulty: f64, // KD%, 0..=100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_suggest: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

impl Keyword {
    pub fn new(keyword: impl Into<String>, volume: u64, difficulty: f64) -> Self {
        Self {
            keyword: keyword.into(),
            volume,
            difficulty,
            intent: None,
            cpc: None,
            trend: None,
            auto_suggest: Vec::new(),
            analysis: None,
        }
    }

    /// Funnel stage assigned by the classifier, if any.
    pub fn funnel_stage(&self) -> Option<FunnelStage> {
        self.analysis.as_ref().and_then(|a| a.funnel_stage)
    }
}

/// Classifier output for one keyword, flattened from the webhook's
/// nested `keyword_analysis` JSON (see api_types).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub content_type: String,
    pub search_intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_stage: Option<FunnelStage>,
    pub priority: f64, // 0..=10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunnelStage {
    Tofu,
    Mofu,
    Bofu,
}

impl FunnelStage {
    pub const ALL: [FunnelStage; 3] = [FunnelStage::Tofu, FunnelStage::Mofu, FunnelStage::Bofu];
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunnelStage::Tofu => write!(f, "TOFU"),
            FunnelStage::Mofu => write!(f, "MOFU"),
            FunnelStage::Bofu => write!(f, "BOFU"),
        }
    }
}

/// Per-project economic parameters. Percentage fields hold whole
/// percent (2 means 2%); divide by 100 at point of use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessContext {
    #[serde(default)]
    pub conversion_rate: f64, // percent, 0..=100
    #[serde(default)]
    pub average_order_value: f64,
    #[serde(default)]
    pub current_sessions: f64, // annual
    #[serde(default)]
    pub current_result: f64,
    #[serde(default)]
    pub quantitative_goal: f64,
}

/// Projected outcomes for one keyword (or one cluster's pooled volume).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    pub potential_traffic: u64,
    pub potential_conversions: u64,
    pub potential_revenue: u64,
}

/// Totals over a keyword set, recomputed from volumes and the current
/// context rather than summed from stored per-keyword fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_volume: u64,
    pub avg_difficulty: u64,
    pub total_traffic: u64,
    pub total_revenue: u64,
}

/// One funnel stage's slice of the analyzed keyword set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelBucket {
    pub stage: FunnelStage,
    pub keyword_count: usize,
    /// Share of *analyzed* keywords, not of the full set.
    pub percentage: f64,
    pub potential_visits: u64,
    pub potential_revenue: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: String,
    /// Seed keyword's text.
    pub name: String,
    pub keywords: Vec<Keyword>,
    pub total_volume: u64,
    pub avg_difficulty: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_stage: Option<FunnelStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Projection treating the cluster's pooled volume as one keyword.
    pub metrics: KeywordMetrics,
}
