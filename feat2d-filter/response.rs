use feat2d_core::Keypoint;
use rayon::prelude::*;

use crate::error::{FilterError, FilterResult};

/// Dense per-pixel corner response, row major
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ResponseMap {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> FilterResult<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(FilterError::ResponseSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Smallest and largest response, `None` for an empty map
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Linearly map `[min, max]` onto `[lo, hi]`. A constant map becomes `lo`.
    ///
    /// Computed in `f64`: raw Harris responses of low-contrast images span
    /// ranges far below `f32::EPSILON`.
    pub fn normalize_min_max(&mut self, lo: f32, hi: f32) {
        let Some((min, max)) = self.min_max() else {
            return;
        };
        let (min, lo) = (min as f64, lo as f64);
        let range = max as f64 - min;
        let scale = if range > f64::EPSILON {
            (hi as f64 - lo) / range
        } else {
            0.0
        };
        self.data
            .par_iter_mut()
            .for_each(|v| *v = ((*v as f64 - min) * scale + lo) as f32);
    }

    pub fn normalized(mut self, lo: f32, hi: f32) -> Self {
        self.normalize_min_max(lo, hi);
        self
    }

    /// Turn every pixel strictly above `min_response` into a keypoint of the
    /// given size carrying the pixel value as response, in row-major order.
    pub fn threshold(&self, min_response: f32, size: f32) -> Vec<Keypoint> {
        let w = self.width;
        (0..self.height)
            .into_par_iter()
            .flat_map_iter(|y| {
                let row = &self.data[y * w..(y + 1) * w];
                row.iter().enumerate().filter_map(move |(x, &value)| {
                    (value > min_response)
                        .then(|| Keypoint::new(x as f32, y as f32, size).with_response(value))
                })
            })
            .collect()
    }
}
