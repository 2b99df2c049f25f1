use crate::references::ResolutionStats;
use crate::variants::ExpansionStats;
use serde::Serialize;
use std::time::Duration;

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub resolution: ResolutionStats,
    pub expansion: ExpansionStats,
    pub override_documents: usize,
    pub base_tokens: usize,
    pub stylesheet_bytes: usize,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl PipelineStats {
    /// Tokens defined per layer, in cascade order
    pub fn tokens_per_layer(&self) -> Vec<(&str, usize)> {
        self.resolution
            .layers
            .iter()
            .map(|layer| (layer.label.as_str(), layer.tokens))
            .collect()
    }

    pub fn references_resolved(&self) -> usize {
        self.resolution.references_resolved
    }

    pub fn processing_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.base_tokens as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} tokens, {} references, {} override leaves across {} variants in {:.2?}",
            self.base_tokens,
            self.resolution.references_resolved,
            self.expansion.override_leaves_applied,
            self.expansion.variants,
            self.duration
        )
    }
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::LayerStats;

    #[test]
    fn test_tokens_per_layer() {
        let stats = PipelineStats {
            resolution: ResolutionStats {
                layers: vec![
                    LayerStats { label: "primitive".into(), tokens: 4, references: 0 },
                    LayerStats { label: "semantic".into(), tokens: 2, references: 2 },
                ],
                references_resolved: 2,
                cascade_overrides: 0,
            },
            ..PipelineStats::default()
        };

        assert_eq!(stats.tokens_per_layer(), vec![("primitive", 4), ("semantic", 2)]);
        assert_eq!(stats.resolution.total_tokens(), 6);
        assert_eq!(stats.references_resolved(), 2);
        assert_eq!(stats.processing_rate(), 0.0);
    }

    #[test]
    fn test_duration_serialized_as_millis() {
        let stats = PipelineStats {
            duration: Duration::from_millis(1500),
            ..PipelineStats::default()
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["duration_ms"], 1500);
        assert!(value.get("duration").is_none());
    }
}
