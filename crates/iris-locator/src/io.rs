//! JSON configuration and report helpers for batch iris detection.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::core::{Circle, Rect};
use crate::segment::{RoiOutcome, SegmentParams, StageEvent};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for one detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrisDetectConfig {
    pub image_path: String,
    /// Eye regions in source-image pixels, as produced by an eye locator.
    pub rois: Vec<Rect>,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Directory receiving PNG dumps of the intermediate stages.
    #[serde(default)]
    pub debug_dir: Option<String>,
    #[serde(default)]
    pub params: SegmentParams,
}

impl IrisDetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("iris_report.json"))
    }
}

/// Result for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    pub index: usize,
    pub roi: Rect,
    /// Iris in region-local coordinates.
    pub circle: Option<Circle>,
    /// Same circle in source-image coordinates.
    pub circle_image: Option<Circle>,
    pub error: Option<String>,
}

impl RoiReport {
    pub fn from_outcome(index: usize, roi: Rect, outcome: &RoiOutcome) -> Self {
        let (circle, error) = match outcome {
            Ok(circle) => (*circle, None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            index,
            roi,
            circle,
            circle_image: circle.map(|c| c.to_image(&roi)),
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrisReport {
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub regions: Vec<RoiReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<StageEvent>,
}

impl IrisReport {
    /// Pair every ROI with its outcome. Both slices are in the same order.
    pub fn new(
        image_path: impl Into<String>,
        width: u32,
        height: u32,
        rois: &[Rect],
        outcomes: &[RoiOutcome],
    ) -> Self {
        let regions = rois
            .iter()
            .zip(outcomes)
            .enumerate()
            .map(|(i, (roi, outcome))| RoiReport::from_outcome(i, *roi, outcome))
            .collect();
        Self {
            image_path: image_path.into(),
            width,
            height,
            regions,
            events: Vec::new(),
        }
    }

    /// Number of regions with an iris.
    pub fn found(&self) -> usize {
        self.regions.iter().filter(|r| r.circle.is_some()).count()
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Parse a region given as `x,y,width,height`.
pub fn parse_roi(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, w, h] = parts.as_slice() else {
        return Err(format!("expected x,y,width,height, got '{s}'"));
    };
    let num = |v: &str| {
        v.parse::<u32>()
            .map_err(|e| format!("invalid region component '{v}': {e}"))
    };
    Ok(Rect::new(num(*x)?, num(*y)?, num(*w)?, num(*h)?))
}
