use crate::config::FeatureConfig;
use crate::error::CoreResult;
use crate::kinds::{DescriptorFamily, DescriptorKind, DetectorKind, MatcherKind, SelectorKind};

/// Fluent builder for a validated [`FeatureConfig`]
#[derive(Debug, Clone)]
pub struct FeatureConfigBuilder {
    config: FeatureConfig,
}

impl Default for FeatureConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: FeatureConfig::default(),
        }
    }

    /// Create a builder from an existing configuration
    pub fn from_config(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn detector(mut self, detector: DetectorKind) -> Self {
        self.config.detector = detector;
        self
    }

    pub fn descriptor(mut self, descriptor: DescriptorKind) -> Self {
        self.config.descriptor = descriptor;
        self
    }

    pub fn matcher(mut self, matcher: MatcherKind) -> Self {
        self.config.matcher = matcher;
        self
    }

    pub fn selector(mut self, selector: SelectorKind) -> Self {
        self.config.selector = selector;
        self
    }

    /// Force the descriptor family instead of deriving it from the descriptor
    pub fn family(mut self, family: DescriptorFamily) -> Self {
        self.config.family = Some(family);
        self
    }

    /// Enable or disable overlap suppression of Harris corners
    pub fn harris_nms(mut self, enable: bool) -> Self {
        self.config.harris.run_nms = enable;
        self
    }

    /// Set the minimum normalized Harris response (0..255)
    pub fn harris_min_response(mut self, min_response: f32) -> Self {
        self.config.harris.min_response = min_response;
        self
    }

    pub fn fast_threshold(mut self, threshold: i32) -> Self {
        self.config.fast.threshold = threshold;
        self
    }

    /// Set the distance-ratio threshold of the k-NN selector
    pub fn max_ratio(mut self, ratio: f32) -> Self {
        self.config.matching.max_ratio = ratio;
        self
    }

    pub fn cross_check(mut self, enable: bool) -> Self {
        self.config.matching.cross_check = enable;
        self
    }

    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.n_threads = n_threads;
        self
    }

    pub fn metadata(mut self, name: &str, description: &str) -> Self {
        self.config = self.config.with_metadata(name, description);
        self
    }

    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Validate and return the configuration
    pub fn build(self) -> CoreResult<FeatureConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_builder_sets_fields() {
        let cfg = FeatureConfigBuilder::new()
            .detector(DetectorKind::Harris)
            .descriptor(DescriptorKind::Freak)
            .matcher(MatcherKind::Flann)
            .selector(SelectorKind::NearestNeighbor)
            .harris_nms(false)
            .harris_min_response(120.0)
            .max_ratio(0.7)
            .threads(2)
            .build()
            .unwrap();

        assert_eq!(cfg.detector, DetectorKind::Harris);
        assert_eq!(cfg.descriptor, DescriptorKind::Freak);
        assert_eq!(cfg.matcher, MatcherKind::Flann);
        assert_eq!(cfg.selector, SelectorKind::NearestNeighbor);
        assert!(!cfg.harris.run_nms);
        assert_eq!(cfg.harris.min_response, 120.0);
        assert_eq!(cfg.matching.max_ratio, 0.7);
        assert_eq!(cfg.n_threads, 2);
    }

    #[test]
    fn test_builder_validates() {
        let result = FeatureConfigBuilder::new()
            .detector(DetectorKind::Sift)
            .descriptor(DescriptorKind::Orb)
            .build();
        assert!(matches!(result, Err(CoreError::IncompatibleCombination { .. })));

        assert!(FeatureConfigBuilder::new().fast_threshold(0).build().is_err());
        assert!(FeatureConfigBuilder::new().threads(0).build().is_err());
    }

    #[test]
    fn test_round_trip_through_config() {
        let cfg = FeatureConfig::binary_preset();
        let rebuilt = cfg.clone().to_builder().build().unwrap();
        assert_eq!(rebuilt, cfg);
    }

    #[test]
    fn test_family_override() {
        let cfg = FeatureConfigBuilder::new()
            .family(DescriptorFamily::Hog)
            .build()
            .unwrap();
        assert_eq!(cfg.family(), DescriptorFamily::Hog);
    }
}
