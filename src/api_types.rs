use serde::Deserialize;
use tracing::warn;

use crate::models::{AnalysisResult, FunnelStage};

/// Classifier webhook response entry for one keyword. The body is
/// absent when the service errored for that keyword.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeywordAnalysis {
    #[serde(default)]
    pub keyword_analysis: Option<ApiAnalysisBody>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAnalysisBody {
    pub content_classification: ApiTyped,
    pub search_intent: ApiTyped,
    pub marketing_funnel_position: ApiStage,
    pub overall_priority: ApiScore,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTyped {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStage {
    pub stage: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiScore {
    pub score: f64,
}

/// Auto-suggest webhook row. `ID` carries the keyword text it belongs
/// to; the suggestions are opaque strings, one per line.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSuggestRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Auto Suggest")]
    pub auto_suggest: String,
}

impl ApiAnalysisBody {
    /// Flatten the nested wire shape into the model record. An
    /// unrecognized stage string leaves the keyword out of funnel
    /// bucketing but keeps the rest of the classification.
    pub fn into_analysis(self, keyword: &str) -> AnalysisResult {
        let funnel_stage = match self.marketing_funnel_position.stage.as_str() {
            "TOFU" => Some(FunnelStage::Tofu),
            "MOFU" => Some(FunnelStage::Mofu),
            "BOFU" => Some(FunnelStage::Bofu),
            other => {
                warn!("Unknown funnel stage {other:?} for keyword {keyword:?}");
                None
            }
        };
        AnalysisResult {
            content_type: self.content_classification.kind,
            search_intent: self.search_intent.kind,
            funnel_stage,
            priority: self.overall_priority.score.clamp(0.0, 10.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_nested_classifier_shape() {
        let raw = r#"{
            "keyword_analysis": {
                "content_classification": {"type": "Target Page"},
                "search_intent": {"type": "Commercial"},
                "marketing_funnel_position": {"stage": "MOFU"},
                "overall_priority": {"score": 7}
            }
        }"#;
        let api: ApiKeywordAnalysis = serde_json::from_str(raw).unwrap();
        let analysis = api.keyword_analysis.unwrap().into_analysis("running shoes");
        assert_eq!(analysis.funnel_stage, Some(FunnelStage::Mofu));
        assert_eq!(analysis.content_type, "Target Page");
        assert_eq!(analysis.priority, 7.0);
    }

    #[test]
    fn unknown_stage_maps_to_none() {
        let body = ApiAnalysisBody {
            content_classification: ApiTyped { kind: "Blog".into() },
            search_intent: ApiTyped { kind: "Informational".into() },
            marketing_funnel_position: ApiStage { stage: "FUNNEL?".into() },
            overall_priority: ApiScore { score: 22.0 },
        };
        let analysis = body.into_analysis("x");
        assert_eq!(analysis.funnel_stage, None);
        assert_eq!(analysis.priority, 10.0); // clamped
    }
}
