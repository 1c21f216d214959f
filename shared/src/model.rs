use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classes::SkinLesionClass;

/// QC metrics computed by the remote service for one uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityControlResult {
    pub brightness: f64,
    pub contrast: f64,
    pub blur: f64,
    pub is_acceptable: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPrediction {
    pub class_name: SkinLesionClass,
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
}

impl ClassPrediction {
    /// Builds an entry carrying the registry description for `class_name`.
    pub fn new(class_name: SkinLesionClass, confidence: f64) -> Self {
        Self {
            class_name,
            confidence,
            description: class_name.description().to_string(),
        }
    }
}

/// Inference output for a single image. `predictions` arrive ranked by the
/// producer, most confident first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub image_id: String,
    pub predictions: Vec<ClassPrediction>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    pub fn top(&self) -> Option<&ClassPrediction> {
        self.predictions.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Draft,
    Processing,
    Completed,
    Reviewed,
}

impl Default for CaseStatus {
    fn default() -> Self {
        CaseStatus::Draft
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseImage {
    pub id: String,
    pub case_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    pub filename: String,
    pub qc_results: QualityControlResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    pub uploaded_at: DateTime<Utc>,
}

impl CaseImage {
    /// Prediction of an image that passed QC, if it has one.
    pub fn fusable_prediction(&self) -> Option<&Prediction> {
        if self.qc_results.is_acceptable {
            self.prediction.as_ref()
        } else {
            None
        }
    }
}

/// A patient case grouping several images of the same lesion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_gender: Option<Gender>,
    #[serde(default)]
    pub images: Vec<CaseImage>,
    // Computed server-side; never produced by the local fusion engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fused_prediction: Option<Prediction>,
    #[serde(default)]
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
