//! Case-level fusion of per-image predictions.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::classes::SkinLesionClass;
use crate::model::{Case, CaseImage, ClassPrediction, Prediction, QualityControlResult};
use crate::quality::quality_score;

/// Maximum number of entries in a fused result.
pub const FUSED_PREDICTION_LIMIT: usize = 5;

pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.7;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FusionMethod {
    Average,
    Weighted,
    Majority,
    MaxConfidence,
}

impl Default for FusionMethod {
    fn default() -> Self {
        FusionMethod::Weighted
    }
}

impl FusionMethod {
    pub fn description(self) -> &'static str {
        match self {
            FusionMethod::Average => "Simple average of all predictions",
            FusionMethod::Weighted => "Weighted average based on image quality",
            FusionMethod::Majority => "Most frequent top prediction wins",
            FusionMethod::MaxConfidence => "Highest confidence prediction wins",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("quality threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
}

/// Inputs that select how a case is fused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    pub method: FusionMethod,
    /// Minimum quality score an image needs to take part in fusion.
    pub quality_threshold: f64,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            method: FusionMethod::default(),
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
        }
    }
}

impl FusionSettings {
    pub fn new(method: FusionMethod, quality_threshold: f64) -> Result<Self, SettingsError> {
        let settings = Self {
            method,
            quality_threshold,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(SettingsError::ThresholdOutOfRange(self.quality_threshold));
        }
        Ok(())
    }
}

/// Confidences and quality scores gathered for one class, index-aligned by
/// the image they came from.
struct ClassSamples {
    class: SkinLesionClass,
    confidences: Vec<f64>,
    weights: Vec<f64>,
}

impl ClassSamples {
    fn fused(&self, method: FusionMethod, top_votes: usize, image_count: usize) -> f64 {
        match method {
            FusionMethod::Average => {
                self.confidences.iter().sum::<f64>() / self.confidences.len() as f64
            }
            FusionMethod::Weighted => {
                let weighted_sum: f64 = self
                    .confidences
                    .iter()
                    .zip(&self.weights)
                    .map(|(c, w)| c * w)
                    .sum();
                let total_weight: f64 = self.weights.iter().sum();
                if total_weight > 0.0 {
                    weighted_sum / total_weight
                } else {
                    0.0
                }
            }
            FusionMethod::Majority => top_votes as f64 / image_count as f64,
            FusionMethod::MaxConfidence => self
                .confidences
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, |max, c| if c > max || c.is_nan() { c } else { max }),
        }
    }
}

/// Fuses per-image predictions into one ranked list of at most
/// [`FUSED_PREDICTION_LIMIT`] entries.
///
/// Callers pass only images that passed QC and carry a prediction. A class
/// missing from an image's list contributes nothing for that image; it is
/// not counted as a zero confidence.
pub fn fuse<'a, I>(images: I, method: FusionMethod) -> Vec<ClassPrediction>
where
    I: IntoIterator<Item = (&'a Prediction, &'a QualityControlResult)>,
{
    let mut samples: Vec<ClassSamples> = Vec::new();
    let mut top_classes: Vec<Option<SkinLesionClass>> = Vec::new();

    for (prediction, qc) in images {
        let weight = quality_score(qc);
        top_classes.push(prediction.top().map(|p| p.class_name));

        for entry in &prediction.predictions {
            let index = match samples.iter().position(|s| s.class == entry.class_name) {
                Some(index) => index,
                None => {
                    samples.push(ClassSamples {
                        class: entry.class_name,
                        confidences: Vec::new(),
                        weights: Vec::new(),
                    });
                    samples.len() - 1
                }
            };
            samples[index].confidences.push(entry.confidence);
            samples[index].weights.push(weight);
        }
    }

    let image_count = top_classes.len();
    if image_count == 0 {
        return Vec::new();
    }

    let mut fused: Vec<ClassPrediction> = samples
        .iter()
        .map(|s| {
            let votes = top_classes.iter().filter(|top| **top == Some(s.class)).count();
            ClassPrediction::new(s.class, s.fused(method, votes, image_count))
        })
        .collect();

    // NaN confidences rank last; ties keep discovery order.
    fused.sort_by(|a, b| {
        a.confidence
            .is_nan()
            .cmp(&b.confidence.is_nan())
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });
    fused.truncate(FUSED_PREDICTION_LIMIT);

    log::debug!(
        "fused {} images with {} into {} classes",
        image_count,
        method,
        fused.len()
    );
    fused
}

/// How one image entered the fused result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContribution {
    pub image_id: String,
    pub filename: String,
    pub top_class: Option<SkinLesionClass>,
    pub top_confidence: Option<f64>,
    pub quality_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFusion {
    pub case_id: String,
    pub method: FusionMethod,
    pub quality_threshold: f64,
    pub image_count: usize,
    pub predictions: Vec<ClassPrediction>,
    pub contributions: Vec<ImageContribution>,
}

impl CaseFusion {
    /// The leading fused class, if any image was eligible.
    pub fn primary(&self) -> Option<&ClassPrediction> {
        self.predictions.first()
    }
}

fn passing_images(
    case: &Case,
    quality_threshold: f64,
) -> impl Iterator<Item = (&CaseImage, &Prediction)> {
    case.images.iter().filter_map(move |image| {
        let prediction = image.fusable_prediction()?;
        let score = quality_score(&image.qc_results);
        if score >= quality_threshold {
            Some((image, prediction))
        } else {
            log::trace!(
                "image {} below quality threshold ({score:.2} < {quality_threshold:.2})",
                image.id
            );
            None
        }
    })
}

/// Images of `case` that passed QC, carry a prediction, and reach
/// `quality_threshold`, in case order.
pub fn eligible_images(
    case: &Case,
    quality_threshold: f64,
) -> Vec<(&Prediction, &QualityControlResult)> {
    passing_images(case, quality_threshold)
        .map(|(image, prediction)| (prediction, &image.qc_results))
        .collect()
}

pub fn fuse_case(case: &Case, settings: &FusionSettings) -> CaseFusion {
    let passing: Vec<(&CaseImage, &Prediction)> =
        passing_images(case, settings.quality_threshold).collect();

    let contributions = passing
        .iter()
        .map(|&(image, prediction)| {
            let top = prediction.top();
            ImageContribution {
                image_id: image.id.clone(),
                filename: image.filename.clone(),
                top_class: top.map(|p| p.class_name),
                top_confidence: top.map(|p| p.confidence),
                quality_score: quality_score(&image.qc_results),
            }
        })
        .collect();

    let predictions = fuse(
        passing
            .iter()
            .map(|&(image, prediction)| (prediction, &image.qc_results)),
        settings.method,
    );

    CaseFusion {
        case_id: case.id.clone(),
        method: settings.method,
        quality_threshold: settings.quality_threshold,
        image_count: passing.len(),
        predictions,
        contributions,
    }
}
