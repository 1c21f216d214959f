//! Image quality scoring and the QC acceptance gate.
//!
//! Two conventions for the blur metric coexist here. The gate treats a blur
//! value above [`BlurThresholds::max`] as "too blurry", while the fusion
//! quality score treats a larger blur value as sharper. Both are kept as-is
//! until the metric's unit is settled with the QC service owners.

use serde::{Deserialize, Serialize};

use crate::model::QualityControlResult;

pub const MID_GRAY: f64 = 127.5;
pub const TARGET_CONTRAST: f64 = 0.5;
pub const TARGET_SHARPNESS: f64 = 200.0;
pub const WARNING_PENALTY: f64 = 0.1;

pub const TOO_DARK: &str = "Image is too dark";
pub const TOO_BRIGHT: &str = "Image is too bright";
pub const BRIGHTNESS_SUBOPTIMAL: &str = "Brightness could be improved";
pub const LOW_CONTRAST: &str = "Image has low contrast";
pub const CONTRAST_SUBOPTIMAL: &str = "Contrast could be improved";
pub const TOO_BLURRY: &str = "Image is too blurry";
pub const SHARPNESS_SUBOPTIMAL: &str = "Image could be sharper";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessThresholds {
    pub min: f64,
    pub max: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
}

impl Default for BrightnessThresholds {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 245.0,
            optimal_min: 50.0,
            optimal_max: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastThresholds {
    pub min: f64,
    pub optimal_min: f64,
    /// Carried for completeness; high contrast never produces a warning.
    pub optimal_max: f64,
}

impl Default for ContrastThresholds {
    fn default() -> Self {
        Self {
            min: 0.1,
            optimal_min: 0.3,
            optimal_max: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurThresholds {
    pub max: f64,
    pub optimal_min: f64,
}

impl Default for BlurThresholds {
    fn default() -> Self {
        Self {
            max: 100.0,
            optimal_min: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QcThresholds {
    pub brightness: BrightnessThresholds,
    pub contrast: ContrastThresholds,
    pub blur: BlurThresholds,
}

/// Applies the acceptance gate to raw metrics. Warnings are collected in
/// brightness, contrast, blur order; advisory warnings never flip an
/// acceptable verdict.
pub fn evaluate_image_quality(
    brightness: f64,
    contrast: f64,
    blur: f64,
    thresholds: &QcThresholds,
) -> QualityControlResult {
    let mut warnings = Vec::new();
    let mut is_acceptable = true;

    let b = &thresholds.brightness;
    if brightness < b.min {
        warnings.push(TOO_DARK.to_string());
        is_acceptable = false;
    } else if brightness > b.max {
        warnings.push(TOO_BRIGHT.to_string());
        is_acceptable = false;
    } else if brightness < b.optimal_min || brightness > b.optimal_max {
        warnings.push(BRIGHTNESS_SUBOPTIMAL.to_string());
    }

    let c = &thresholds.contrast;
    if contrast < c.min {
        warnings.push(LOW_CONTRAST.to_string());
        is_acceptable = false;
    } else if contrast < c.optimal_min {
        warnings.push(CONTRAST_SUBOPTIMAL.to_string());
    }

    let s = &thresholds.blur;
    if blur > s.max {
        warnings.push(TOO_BLURRY.to_string());
        is_acceptable = false;
    } else if blur < s.optimal_min {
        warnings.push(SHARPNESS_SUBOPTIMAL.to_string());
    }

    log::debug!(
        "qc gate: brightness={brightness} contrast={contrast} blur={blur} acceptable={is_acceptable} warnings={}",
        warnings.len()
    );

    QualityControlResult {
        brightness,
        contrast,
        blur,
        is_acceptable,
        warnings,
    }
}

/// Intermediate terms of the quality score, kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityBreakdown {
    /// `1.0` minus the warning penalty; may be negative.
    pub base: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub sharpness: f64,
    pub score: f64,
}

/// Returns `None` for images that failed QC.
pub fn quality_breakdown(qc: &QualityControlResult) -> Option<QualityBreakdown> {
    if !qc.is_acceptable {
        return None;
    }

    let base = 1.0 - qc.warnings.len() as f64 * WARNING_PENALTY;

    // Sub-scores are not floored before averaging.
    let brightness = 1.0 - (qc.brightness - MID_GRAY).abs() / MID_GRAY;
    let contrast = cap_at_one(qc.contrast / TARGET_CONTRAST);
    let sharpness = cap_at_one(qc.blur / TARGET_SHARPNESS);

    let score = ((base + brightness + contrast + sharpness) / 4.0).clamp(0.0, 1.0);

    Some(QualityBreakdown {
        base,
        brightness,
        contrast,
        sharpness,
        score,
    })
}

/// Quality score in `[0, 1]`; exactly `0.0` when QC rejected the image.
pub fn quality_score(qc: &QualityControlResult) -> f64 {
    quality_breakdown(qc).map_or(0.0, |b| b.score)
}

// NaN passes through, unlike f64::min.
fn cap_at_one(value: f64) -> f64 {
    if value > 1.0 { 1.0 } else { value }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QcStatus {
    Good,
    Fair,
    Poor,
}

impl QcStatus {
    pub fn of(qc: &QualityControlResult) -> Self {
        if !qc.is_acceptable {
            QcStatus::Poor
        } else if !qc.warnings.is_empty() {
            QcStatus::Fair
        } else {
            QcStatus::Good
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QcStatus::Good => "Good",
            QcStatus::Fair => "Fair",
            QcStatus::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Ok,
    Warning,
    Failing,
}

/// Per-metric verdicts against the gate's bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricReport {
    pub brightness: MetricStatus,
    pub contrast: MetricStatus,
    pub blur: MetricStatus,
}

impl MetricReport {
    pub fn new(qc: &QualityControlResult, thresholds: &QcThresholds) -> Self {
        let b = &thresholds.brightness;
        let brightness = if qc.brightness < b.min || qc.brightness > b.max {
            MetricStatus::Failing
        } else if qc.brightness < b.optimal_min || qc.brightness > b.optimal_max {
            MetricStatus::Warning
        } else {
            MetricStatus::Ok
        };

        let contrast = if qc.contrast < thresholds.contrast.min {
            MetricStatus::Failing
        } else if qc.contrast < thresholds.contrast.optimal_min {
            MetricStatus::Warning
        } else {
            MetricStatus::Ok
        };

        let blur = if qc.blur > thresholds.blur.max {
            MetricStatus::Failing
        } else if qc.blur < thresholds.blur.optimal_min {
            MetricStatus::Warning
        } else {
            MetricStatus::Ok
        };

        Self {
            brightness,
            contrast,
            blur,
        }
    }
}
