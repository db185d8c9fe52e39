use std::path::{Path, PathBuf};

use image::{GrayImage, ImageReader};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Numbered image files on disk, named `prefix + zero-padded index + extension`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub base_dir: PathBuf,
    pub prefix: String,
    pub fill_width: usize,
    pub start: usize,
    pub end: usize,
    pub extension: String,
}

impl Default for SequenceConfig {
    /// First ten grayscale frames of KITTI drive 2011_09_26, camera 0
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("images/KITTI/2011_09_26/image_00/data"),
            prefix: "000000".to_string(),
            fill_width: 4,
            start: 0,
            end: 9,
            extension: ".png".to_string(),
        }
    }
}

impl SequenceConfig {
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.start > self.end {
            return Err(PipelineError::EmptySequence {
                start: self.start,
                end: self.end,
            });
        }
        if self.extension.is_empty() {
            return Err(PipelineError::InvalidSetting {
                name: "sequence.extension",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Frame count, `start..=end`
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn file_name(&self, index: usize) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.extension,
            width = self.fill_width
        )
    }

    pub fn path(&self, index: usize) -> PathBuf {
        self.base_dir.join(self.file_name(index))
    }

    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.indices().map(move |i| self.path(i))
    }

    /// Decode frame `index` into 8-bit grayscale
    pub fn load_frame(&self, index: usize) -> PipelineResult<GrayImage> {
        load_gray(&self.path(index))
    }
}

pub fn load_gray(path: &Path) -> PipelineResult<GrayImage> {
    let reader = ImageReader::open(path).map_err(|e| PipelineError::io(path, e))?;
    let image = reader.decode().map_err(|source| PipelineError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_luma8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitti_naming() {
        let seq = SequenceConfig::default().with_base_dir("data");
        assert_eq!(seq.file_name(0), "0000000000.png");
        assert_eq!(seq.file_name(9), "0000000009.png");
        assert_eq!(seq.file_name(123), "0000000123.png");
        assert_eq!(seq.path(3), Path::new("data").join("0000000003.png"));
    }

    #[test]
    fn test_index_wider_than_fill() {
        let seq = SequenceConfig {
            prefix: "img_".to_string(),
            fill_width: 2,
            ..SequenceConfig::default()
        };
        assert_eq!(seq.file_name(7), "img_07.png");
        assert_eq!(seq.file_name(1234), "img_1234.png");
    }

    #[test]
    fn test_range_is_inclusive() {
        let seq = SequenceConfig {
            start: 3,
            end: 5,
            ..SequenceConfig::default()
        };
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.paths().count(), 3);
        assert_eq!(seq.indices().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let seq = SequenceConfig {
            start: 5,
            end: 4,
            ..SequenceConfig::default()
        };
        assert!(seq.is_empty());
        assert!(matches!(
            seq.validate(),
            Err(PipelineError::EmptySequence { start: 5, end: 4 })
        ));
    }

    #[test]
    fn test_missing_frame_reports_path() {
        let seq = SequenceConfig::default().with_base_dir("/nonexistent/feat2d");
        let err = seq.load_frame(0).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
        assert!(err.to_string().contains("0000000000.png"));
    }
}
