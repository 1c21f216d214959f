pub mod classes;
pub mod format;
pub mod fusion;
pub mod model;
pub mod quality;
pub mod upload;

pub use classes::{ClassInfo, Severity, SkinLesionClass};
pub use fusion::{
    CaseFusion, FusionMethod, FusionSettings, ImageContribution, SettingsError, eligible_images,
    fuse, fuse_case,
};
pub use model::{Case, CaseImage, ClassPrediction, Prediction, QualityControlResult};
pub use quality::{QcStatus, QcThresholds, evaluate_image_quality, quality_score};
pub use upload::{UploadCandidate, UploadError, UploadLimits};
