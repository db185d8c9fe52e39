use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Keypoint detector selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum DetectorKind {
    ShiTomasi,
    Harris,
    Fast,
    Brisk,
    Orb,
    Akaze,
    Sift,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 7] = [
        DetectorKind::ShiTomasi,
        DetectorKind::Harris,
        DetectorKind::Fast,
        DetectorKind::Brisk,
        DetectorKind::Orb,
        DetectorKind::Akaze,
        DetectorKind::Sift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::ShiTomasi => "SHITOMASI",
            DetectorKind::Harris => "HARRIS",
            DetectorKind::Fast => "FAST",
            DetectorKind::Brisk => "BRISK",
            DetectorKind::Orb => "ORB",
            DetectorKind::Akaze => "AKAZE",
            DetectorKind::Sift => "SIFT",
        }
    }

    /// Gradient-based corner detectors handled outside the generic feature detector interface
    pub fn is_classic(&self) -> bool {
        matches!(self, DetectorKind::ShiTomasi | DetectorKind::Harris)
    }
}

/// Descriptor extractor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum DescriptorKind {
    Brisk,
    Brief,
    Orb,
    Freak,
    Akaze,
    Sift,
}

impl DescriptorKind {
    pub const ALL: [DescriptorKind; 6] = [
        DescriptorKind::Brisk,
        DescriptorKind::Brief,
        DescriptorKind::Orb,
        DescriptorKind::Freak,
        DescriptorKind::Akaze,
        DescriptorKind::Sift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorKind::Brisk => "BRISK",
            DescriptorKind::Brief => "BRIEF",
            DescriptorKind::Orb => "ORB",
            DescriptorKind::Freak => "FREAK",
            DescriptorKind::Akaze => "AKAZE",
            DescriptorKind::Sift => "SIFT",
        }
    }

    /// SIFT is the only gradient-histogram descriptor, the rest are bit strings.
    pub fn family(&self) -> DescriptorFamily {
        match self {
            DescriptorKind::Sift => DescriptorFamily::Hog,
            _ => DescriptorFamily::Binary,
        }
    }
}

/// Numeric family of a descriptor, decides the matching norm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DescriptorFamily {
    /// Bit strings compared with the Hamming norm
    #[cfg_attr(feature = "serde", serde(rename = "DES_BINARY"))]
    Binary,
    /// Floating-point histograms compared with the L2 norm
    #[cfg_attr(feature = "serde", serde(rename = "DES_HOG"))]
    Hog,
}

impl DescriptorFamily {
    pub const ALL: [DescriptorFamily; 2] = [DescriptorFamily::Binary, DescriptorFamily::Hog];

    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorFamily::Binary => "DES_BINARY",
            DescriptorFamily::Hog => "DES_HOG",
        }
    }
}

/// Descriptor matcher selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatcherKind {
    #[cfg_attr(feature = "serde", serde(rename = "MAT_BF"))]
    BruteForce,
    #[cfg_attr(feature = "serde", serde(rename = "MAT_FLANN"))]
    Flann,
}

impl MatcherKind {
    pub const ALL: [MatcherKind; 2] = [MatcherKind::BruteForce, MatcherKind::Flann];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatcherKind::BruteForce => "MAT_BF",
            MatcherKind::Flann => "MAT_FLANN",
        }
    }
}

/// How candidate matches are selected per query descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SelectorKind {
    /// Best match only
    #[cfg_attr(feature = "serde", serde(rename = "SEL_NN"))]
    NearestNeighbor,
    /// Two best matches followed by the distance-ratio test
    #[cfg_attr(feature = "serde", serde(rename = "SEL_KNN"))]
    KNearestNeighbors,
}

impl SelectorKind {
    pub const ALL: [SelectorKind; 2] = [SelectorKind::NearestNeighbor, SelectorKind::KNearestNeighbors];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::NearestNeighbor => "SEL_NN",
            SelectorKind::KNearestNeighbors => "SEL_KNN",
        }
    }
}

macro_rules! impl_string_key {
    ($ty:ty, $category:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> CoreResult<Self> {
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.as_str() == s)
                    .ok_or_else(|| CoreError::UnknownKind {
                        category: $category,
                        key: s.to_string(),
                    })
            }
        }
    };
}

impl_string_key!(DetectorKind, "detector");
impl_string_key!(DescriptorKind, "descriptor");
impl_string_key!(DescriptorFamily, "descriptor family");
impl_string_key!(MatcherKind, "matcher");
impl_string_key!(SelectorKind, "selector");

/// Reject detector/descriptor pairs the vision library cannot serve.
///
/// AKAZE descriptors read the scale-space octave stored by the AKAZE detector
/// and ORB rejects the octave encoding of SIFT keypoints.
pub fn validate_combination(detector: DetectorKind, descriptor: DescriptorKind) -> CoreResult<()> {
    let compatible = match descriptor {
        DescriptorKind::Akaze => detector == DetectorKind::Akaze,
        DescriptorKind::Orb => detector != DetectorKind::Sift,
        _ => true,
    };
    if compatible {
        Ok(())
    } else {
        Err(CoreError::IncompatibleCombination {
            detector,
            descriptor,
        })
    }
}
