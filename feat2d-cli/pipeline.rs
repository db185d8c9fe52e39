use std::fmt;
use std::path::Path;

use feat2d_core::{FeatureConfig, Keypoint, Match};
use feat2d_cv::{describe_keypoints, detect_keypoints, gray_to_mat, match_descriptors, Descriptors};
use feat2d_filter::{neighbourhood_stats, retain_best, retain_in_region, Region, SizeStats};
use image::GrayImage;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::buffer::{FrameBuffer, DEFAULT_CAPACITY};
use crate::error::{PipelineError, PipelineResult};
use crate::sequence::SequenceConfig;

/// Everything needed to run detection, description and matching over a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Drop keypoints outside `region`
    pub focus_region: bool,
    /// Keep only the strongest keypoints per frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_keypoints: Option<usize>,
    pub buffer_size: usize,
    pub region: Region,
    pub sequence: SequenceConfig,
    pub features: FeatureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            focus_region: true,
            max_keypoints: None,
            buffer_size: DEFAULT_CAPACITY,
            region: Region::preceding_vehicle(),
            sequence: SequenceConfig::default(),
            features: FeatureConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        self.features.validate()?;
        self.sequence.validate()?;
        if self.focus_region {
            self.region.validate()?;
        }
        if self.buffer_size < 2 {
            return Err(PipelineError::InvalidSetting {
                name: "buffer_size",
                reason: format!("{} frames cannot hold a matching pair", self.buffer_size),
            });
        }
        if self.max_keypoints == Some(0) {
            return Err(PipelineError::InvalidSetting {
                name: "max_keypoints",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Load a `.toml` or `.json` file, picked by extension, and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content)?,
            Some("json") => Self::from_json(&content)?,
            _ => return Err(PipelineError::ConfigFormat(path.to_path_buf())),
        };
        info!("loaded {}", path.display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(PipelineError::ConfigFormat(path.to_path_buf())),
        };
        std::fs::write(path, content).map_err(|e| PipelineError::io(path, e))
    }

    pub fn to_toml(&self) -> PipelineResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(toml_str: &str) -> PipelineResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// One processed image with the keypoints that survived description
#[derive(Debug)]
pub struct Frame {
    pub index: usize,
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Descriptors,
    /// Matches from the previous frame's keypoints (query) into this frame's (train)
    pub matches: Vec<Match>,
}

/// Per-frame result
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    /// Keypoints before region and count limits
    pub detected: usize,
    /// Keypoints that received a descriptor
    pub keypoints: usize,
    pub size_stats: Option<SizeStats>,
    /// `None` until two frames are buffered
    pub matches: Option<usize>,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {:>3}: {:>5} detected, {:>5} described",
            self.index, self.detected, self.keypoints
        )?;
        match self.size_stats {
            Some(s) => write!(f, ", size {:.1}±{:.1}", s.mean, s.std_dev)?,
            None => write!(f, ", size -")?,
        }
        match self.matches {
            Some(n) => write!(f, ", {:>5} matches", n)?,
            None => write!(f, ",     - matches")?,
        }
        Ok(())
    }
}

/// Totals over a processed sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: usize,
    pub keypoints: usize,
    pub matched_pairs: usize,
    pub matches: usize,
}

impl RunSummary {
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.keypoints += report.keypoints;
        if let Some(n) = report.matches {
            self.matched_pairs += 1;
            self.matches += n;
        }
    }

    pub fn mean_keypoints(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.keypoints as f64 / self.frames as f64
        }
    }

    pub fn mean_matches(&self) -> f64 {
        if self.matched_pairs == 0 {
            0.0
        } else {
            self.matches as f64 / self.matched_pairs as f64
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {:.1} keypoints/frame, {:.1} matches/pair over {} pairs",
            self.frames,
            self.mean_keypoints(),
            self.mean_matches(),
            self.matched_pairs
        )
    }
}

/// Detect, describe and match consecutive frames
pub struct Pipeline {
    config: PipelineConfig,
    frames: FrameBuffer<Frame>,
    next_index: usize,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        info!("{}", config.features.summary());
        let frames = FrameBuffer::new(config.buffer_size);
        let next_index = config.sequence.start;
        Ok(Self {
            config,
            frames,
            next_index,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn frames(&self) -> &FrameBuffer<Frame> {
        &self.frames
    }

    /// Run one image through the pipeline and buffer it.
    ///
    /// Once a previous frame is buffered, its descriptors are the source and
    /// this frame's descriptors the reference of the match.
    pub fn process(&mut self, image: &GrayImage) -> PipelineResult<FrameReport> {
        let index = self.next_index;
        self.next_index += 1;
        let features = &self.config.features;
        let mat = gray_to_mat(image)?;

        let mut keypoints = detect_keypoints(&mat, features)?;
        let detected = keypoints.len();

        if self.config.focus_region {
            retain_in_region(&mut keypoints, &self.config.region);
            debug!("{} of {} keypoints inside {:?}", keypoints.len(), detected, self.config.region);
        }
        if let Some(n) = self.config.max_keypoints {
            retain_best(&mut keypoints, n);
        }

        let described = describe_keypoints(&mat, &keypoints, features)?;
        let size_stats = neighbourhood_stats(&described.keypoints);

        let mut frame = Frame {
            index,
            keypoints: described.keypoints,
            descriptors: described.descriptors,
            matches: Vec::new(),
        };

        let matches = match self.frames.latest() {
            Some(previous) => {
                frame.matches = match_descriptors(
                    &previous.descriptors,
                    &frame.descriptors,
                    features.family(),
                    features,
                )?;
                Some(frame.matches.len())
            }
            None => None,
        };

        if frame.keypoints.is_empty() {
            warn!("frame {} has no described keypoints", index);
        }
        let report = FrameReport {
            index,
            detected,
            keypoints: frame.keypoints.len(),
            size_stats,
            matches,
        };
        self.frames.push(frame);
        info!("{}", report);
        Ok(report)
    }

    /// Load and process every frame of the configured sequence, handing each report to `on_frame`
    pub fn run<F>(&mut self, mut on_frame: F) -> PipelineResult<RunSummary>
    where
        F: FnMut(&FrameReport, &FrameBuffer<Frame>) -> PipelineResult<()>,
    {
        let mut summary = RunSummary::default();
        let sequence = self.config.sequence.clone();
        self.next_index = sequence.start;
        self.frames.clear();
        for index in sequence.indices() {
            let image = sequence.load_frame(index)?;
            let report = self.process(&image)?;
            summary.record(&report);
            on_frame(&report, &self.frames)?;
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feat2d_core::{DescriptorKind, DetectorKind, FeatureConfigBuilder, MatcherKind};
    use image::Luma;

    fn textured(shift: u32) -> GrayImage {
        GrayImage::from_fn(320, 240, |x, y| {
            let bx = (x + shift) / 12;
            let by = y / 12;
            let h = bx.wrapping_mul(73_856_093) ^ by.wrapping_mul(19_349_663);
            Luma([(h % 200 + 28) as u8])
        })
    }

    fn whole_image_config(detector: DetectorKind, descriptor: DescriptorKind) -> PipelineConfig {
        PipelineConfig {
            focus_region: false,
            features: FeatureConfigBuilder::new()
                .detector(detector)
                .descriptor(descriptor)
                .threads(1)
                .build()
                .unwrap(),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.focus_region);
        assert_eq!(config.buffer_size, 2);
        assert_eq!(config.region, Region::preceding_vehicle());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut config = PipelineConfig::default();
        config.buffer_size = 1;
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidSetting { name: "buffer_size", .. })
        ));

        let mut config = PipelineConfig::default();
        config.max_keypoints = Some(0);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.features.descriptor = DescriptorKind::Akaze;
        assert!(matches!(config.validate(), Err(PipelineError::Core(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = whole_image_config(DetectorKind::Fast, DescriptorKind::Orb);
        config.max_keypoints = Some(50);
        let text = config.to_toml().unwrap();
        assert_eq!(PipelineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
            focus_region = false

            [sequence]
            base_dir = "frames"
            end = 4

            [features]
            detector = "FAST"
            descriptor = "BRIEF"
            matcher = "MAT_FLANN"
            selector = "SEL_NN"
        "#;
        let config = PipelineConfig::from_toml(text).unwrap();
        assert!(!config.focus_region);
        assert_eq!(config.sequence.prefix, "000000");
        assert_eq!(config.sequence.len(), 5);
        assert_eq!(config.features.matcher, MatcherKind::Flann);
        assert_eq!(config.region, Region::preceding_vehicle());
    }

    #[test]
    fn test_json_load_by_extension() {
        let dir = std::env::temp_dir().join(format!("feat2d-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = whole_image_config(DetectorKind::Orb, DescriptorKind::Orb);

        let json = dir.join("pipeline.json");
        config.save(&json).unwrap();
        assert_eq!(PipelineConfig::load(&json).unwrap(), config);

        let yaml = dir.join("pipeline.yaml");
        assert!(matches!(config.save(&yaml), Err(PipelineError::ConfigFormat(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_first_frame_has_no_matches() {
        let mut pipeline =
            Pipeline::new(whole_image_config(DetectorKind::Fast, DescriptorKind::Brief)).unwrap();
        let report = pipeline.process(&textured(0)).unwrap();
        assert_eq!(report.index, 0);
        assert!(report.keypoints > 0);
        assert_eq!(report.matches, None);
        assert_eq!(pipeline.frames().len(), 1);
    }

    #[test]
    fn test_consecutive_frames_match() {
        let mut pipeline =
            Pipeline::new(whole_image_config(DetectorKind::Orb, DescriptorKind::Orb)).unwrap();
        pipeline.process(&textured(0)).unwrap();
        let report = pipeline.process(&textured(6)).unwrap();
        assert_eq!(report.index, 1);
        assert!(report.matches.unwrap_or(0) > 0);

        let (previous, current) = pipeline.frames().last_pair().unwrap();
        assert_eq!(current.matches.len(), report.matches.unwrap());
        assert!(current.matches.iter().all(|m| m.query_idx < previous.keypoints.len()
            && m.train_idx < current.keypoints.len()));
    }

    #[test]
    fn test_buffer_keeps_last_two_frames() {
        let mut pipeline =
            Pipeline::new(whole_image_config(DetectorKind::Fast, DescriptorKind::Brisk)).unwrap();
        for shift in [0, 4, 8] {
            pipeline.process(&textured(shift)).unwrap();
        }
        let indices: Vec<usize> = pipeline.frames().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_region_and_limit_applied() {
        let mut config = whole_image_config(DetectorKind::Fast, DescriptorKind::Brief);
        config.focus_region = true;
        config.region = Region::new(60, 40, 200, 160).unwrap();
        config.max_keypoints = Some(25);
        let mut pipeline = Pipeline::new(config).unwrap();
        let report = pipeline.process(&textured(0)).unwrap();

        assert!(report.keypoints <= 25);
        let frame = pipeline.frames().latest().unwrap();
        assert!(frame.keypoints.iter().all(|kp| kp.x >= 60.0 && kp.x < 260.0));
        assert_eq!(report.size_stats.map(|s| s.count), Some(report.keypoints));
    }

    #[test]
    fn test_summary_counts_pairs() {
        let report = |matches| FrameReport {
            index: 0,
            detected: 10,
            keypoints: 8,
            size_stats: None,
            matches,
        };
        let mut summary = RunSummary::default();
        summary.record(&report(None));
        summary.record(&report(Some(4)));
        summary.record(&report(Some(6)));
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.matched_pairs, 2);
        assert_eq!(summary.mean_matches(), 5.0);
        assert_eq!(summary.mean_keypoints(), 8.0);
    }

    #[test]
    fn test_run_over_saved_sequence() {
        let dir = std::env::temp_dir().join(format!("feat2d-seq-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut config = whole_image_config(DetectorKind::Fast, DescriptorKind::Orb);
        config.sequence = SequenceConfig {
            end: 2,
            ..SequenceConfig::default().with_base_dir(&dir)
        };
        for (i, path) in config.sequence.paths().enumerate() {
            textured(i as u32 * 4).save(path).unwrap();
        }

        let mut seen = Vec::new();
        let mut pipeline = Pipeline::new(config).unwrap();
        let summary = pipeline
            .run(|report, frames| {
                seen.push((report.index, frames.len()));
                Ok(())
            })
            .unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(seen, vec![(0, 1), (1, 2), (2, 2)]);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.matched_pairs, 2);
    }
}
