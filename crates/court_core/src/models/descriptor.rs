use serde::{Deserialize, Serialize};

/// Handle and quality metrics for the recorded play the service picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDescriptor {
    pub match_id: String,
    pub event_id: String,
    /// 0.0~1.0
    pub similarity_score: f32,
    /// 0.0~1.0
    pub quality_score: f32,
    /// Candidate plays the service considered, when it reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_count: Option<u32>,
}

impl MatchDescriptor {
    pub fn new(
        match_id: impl Into<String>,
        event_id: impl Into<String>,
        similarity_score: f32,
        quality_score: f32,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            event_id: event_id.into(),
            similarity_score,
            quality_score,
            similar_count: None,
        }
    }

    pub fn with_similar_count(mut self, count: u32) -> Self {
        self.similar_count = Some(count);
        self
    }

    /// Both scores are finite and inside `[0, 1]`.
    pub fn scores_in_range(&self) -> bool {
        let ok = |s: f32| s.is_finite() && (0.0..=1.0).contains(&s);
        ok(self.similarity_score) && ok(self.quality_score)
    }

    pub fn similarity_percent(&self) -> String {
        format!("{:.1}%", self.similarity_score * 100.0)
    }

    pub fn quality_percent(&self) -> String {
        format!("{:.1}%", self.quality_score * 100.0)
    }
}
