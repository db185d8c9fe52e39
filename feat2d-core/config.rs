use crate::error::{CoreError, CoreResult};
use crate::kinds::{
    validate_combination, DescriptorFamily, DescriptorKind, DetectorKind, MatcherKind, SelectorKind,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the Shi-Tomasi minimum-eigenvalue corner detector
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShiTomasiParams {
    /// Neighbourhood used for the derivative covariation matrix
    pub block_size: usize,
    /// Permissible overlap between two corners, fraction in [0, 1)
    pub max_overlap: f64,
    /// Minimal accepted quality relative to the best corner
    pub quality_level: f64,
    pub k: f64,
}

impl Default for ShiTomasiParams {
    fn default() -> Self {
        Self {
            block_size: 4,
            max_overlap: 0.0,
            quality_level: 0.01,
            k: 0.04,
        }
    }
}

impl ShiTomasiParams {
    pub fn min_distance(&self) -> f64 {
        (1.0 - self.max_overlap) * self.block_size as f64
    }

    /// Corner budget for an image, one corner per `min_distance` pixels
    pub fn max_corners(&self, rows: usize, cols: usize) -> usize {
        ((rows * cols) as f64 / self.min_distance().max(1.0)) as usize
    }
}

/// Parameters of the Harris corner detector and its suppression step
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HarrisParams {
    pub block_size: usize,
    /// Sobel aperture, odd
    pub aperture_size: usize,
    /// Minimum value in the response normalized to 0..255
    pub min_response: f32,
    pub k: f64,
    pub run_nms: bool,
}

impl Default for HarrisParams {
    fn default() -> Self {
        Self {
            block_size: 4,
            aperture_size: 3,
            min_response: 100.0,
            k: 0.04,
            run_nms: true,
        }
    }
}

impl HarrisParams {
    pub fn keypoint_size(&self) -> f32 {
        (2 * self.aperture_size) as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FastParams {
    pub threshold: i32,
    pub nonmax_suppression: bool,
}

impl Default for FastParams {
    fn default() -> Self {
        Self {
            threshold: 30,
            nonmax_suppression: true,
        }
    }
}

/// BRISK extractor settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BriskParams {
    /// FAST/AGAST detection threshold score
    pub threshold: i32,
    /// Detection octaves, 0 for single scale
    pub octaves: i32,
    /// Scale applied to the sampling pattern
    pub pattern_scale: f32,
}

impl Default for BriskParams {
    fn default() -> Self {
        Self {
            threshold: 30,
            octaves: 3,
            pattern_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchParams {
    pub cross_check: bool,
    /// Neighbours requested by the k-NN selector
    pub k: usize,
    /// Largest accepted best/second-best distance ratio
    pub max_ratio: f32,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            cross_check: false,
            k: 2,
            max_ratio: 0.8,
        }
    }
}

/// Complete algorithm selection with all tuning parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureConfig {
    pub detector: DetectorKind,
    pub descriptor: DescriptorKind,
    pub matcher: MatcherKind,
    pub selector: SelectorKind,
    /// Overrides the family derived from the descriptor
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub family: Option<DescriptorFamily>,
    #[cfg_attr(feature = "serde", serde(default = "crate::default_threads"))]
    pub n_threads: usize,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shi_tomasi: ShiTomasiParams,
    #[cfg_attr(feature = "serde", serde(default))]
    pub harris: HarrisParams,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fast: FastParams,
    #[cfg_attr(feature = "serde", serde(default))]
    pub brisk: BriskParams,
    #[cfg_attr(feature = "serde", serde(default))]
    pub matching: MatchParams,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::new(DetectorKind::ShiTomasi, DescriptorKind::Brisk)
    }
}

impl FeatureConfig {
    /// Brute-force k-NN matching with default parameters for the given pair
    pub fn new(detector: DetectorKind, descriptor: DescriptorKind) -> Self {
        Self {
            detector,
            descriptor,
            matcher: MatcherKind::BruteForce,
            selector: SelectorKind::KNearestNeighbors,
            family: None,
            n_threads: crate::default_threads(),
            name: None,
            description: None,
            shi_tomasi: ShiTomasiParams::default(),
            harris: HarrisParams::default(),
            fast: FastParams::default(),
            brisk: BriskParams::default(),
            matching: MatchParams::default(),
        }
    }

    /// FAST corners with BRIEF bit strings, the quickest binary pipeline
    pub fn binary_preset() -> Self {
        Self::new(DetectorKind::Fast, DescriptorKind::Brief)
            .with_metadata("Binary", "FAST keypoints, BRIEF descriptors, brute-force ratio matching")
    }

    /// SIFT keypoints and descriptors matched through FLANN
    pub fn float_preset() -> Self {
        let mut cfg = Self::new(DetectorKind::Sift, DescriptorKind::Sift)
            .with_metadata("Float", "SIFT keypoints and descriptors, FLANN ratio matching");
        cfg.matcher = MatcherKind::Flann;
        cfg
    }

    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    pub fn to_builder(self) -> crate::builder::FeatureConfigBuilder {
        crate::builder::FeatureConfigBuilder::from_config(self)
    }

    /// Family used to pick the matching norm
    pub fn family(&self) -> DescriptorFamily {
        self.family.unwrap_or_else(|| self.descriptor.family())
    }

    pub fn summary(&self) -> String {
        format!(
            "FeatureConfig: detector={}, descriptor={} ({}), matcher={}, selector={}, harris_nms={}, ratio={:.2}, threads={}",
            self.detector,
            self.descriptor,
            self.family(),
            self.matcher,
            self.selector,
            self.harris.run_nms,
            self.matching.max_ratio,
            self.n_threads
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> CoreResult<()> {
        validate_combination(self.detector, self.descriptor)?;

        let st = &self.shi_tomasi;
        if st.block_size == 0 {
            return Err(CoreError::invalid("shi_tomasi.block_size", "must be > 0"));
        }
        if !(0.0..1.0).contains(&st.max_overlap) {
            return Err(CoreError::invalid(
                "shi_tomasi.max_overlap",
                format!("{} not in [0, 1)", st.max_overlap),
            ));
        }
        if st.quality_level <= 0.0 {
            return Err(CoreError::invalid("shi_tomasi.quality_level", "must be > 0"));
        }

        let h = &self.harris;
        if h.block_size == 0 {
            return Err(CoreError::invalid("harris.block_size", "must be > 0"));
        }
        if h.aperture_size < 3 || h.aperture_size % 2 == 0 {
            return Err(CoreError::invalid(
                "harris.aperture_size",
                format!("{} must be odd and >= 3", h.aperture_size),
            ));
        }

        if self.fast.threshold <= 0 {
            return Err(CoreError::invalid("fast.threshold", "must be > 0"));
        }

        let m = &self.matching;
        if !(m.max_ratio > 0.0 && m.max_ratio <= 1.0) {
            return Err(CoreError::invalid(
                "matching.max_ratio",
                format!("{} not in (0, 1]", m.max_ratio),
            ));
        }
        if m.k == 0 {
            return Err(CoreError::invalid("matching.k", "must be > 0"));
        }
        if i32::try_from(m.k).is_err() {
            return Err(CoreError::invalid(
                "matching.k",
                format!("{} exceeds {}", m.k, i32::MAX),
            ));
        }
        if self.selector == SelectorKind::KNearestNeighbors && m.k < 2 {
            return Err(CoreError::invalid(
                "matching.k",
                "the distance-ratio selector needs at least 2 neighbours",
            ));
        }

        if m.cross_check && self.selector == SelectorKind::KNearestNeighbors {
            return Err(CoreError::invalid(
                "matching.cross_check",
                "cross-checked matching returns a single neighbour, not usable with SEL_KNN",
            ));
        }

        if self.n_threads == 0 {
            return Err(CoreError::invalid("n_threads", "must be > 0"));
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> CoreResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> CoreResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> CoreResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
