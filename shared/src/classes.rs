use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Lesion categories the classifier can emit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum SkinLesionClass {
    Mel,
    Nv,
    Bcc,
    Ak,
    Bkl,
    Df,
    Vasc,
    Scc,
    Unk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub code: SkinLesionClass,
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub severity: Severity,
}

impl SkinLesionClass {
    pub fn all() -> impl Iterator<Item = SkinLesionClass> {
        Self::iter()
    }

    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn info(self) -> ClassInfo {
        let (name, description, color, severity) = match self {
            SkinLesionClass::Mel => (
                "Melanoma",
                "A type of skin cancer that develops from melanocytes",
                "#ef4444",
                Severity::High,
            ),
            SkinLesionClass::Nv => ("Nevus", "A benign mole or birthmark", "#10b981", Severity::Low),
            SkinLesionClass::Bcc => (
                "Basal Cell Carcinoma",
                "The most common type of skin cancer",
                "#f59e0b",
                Severity::Medium,
            ),
            SkinLesionClass::Ak => (
                "Actinic Keratosis",
                "A rough, scaly patch on sun-exposed skin",
                "#f97316",
                Severity::Medium,
            ),
            SkinLesionClass::Bkl => (
                "Benign Keratosis",
                "A non-cancerous skin growth",
                "#84cc16",
                Severity::Low,
            ),
            SkinLesionClass::Df => ("Dermatofibroma", "A benign fibrous nodule", "#06b6d4", Severity::Low),
            SkinLesionClass::Vasc => (
                "Vascular Lesion",
                "A lesion involving blood vessels",
                "#8b5cf6",
                Severity::Low,
            ),
            SkinLesionClass::Scc => (
                "Squamous Cell Carcinoma",
                "A type of skin cancer from squamous cells",
                "#dc2626",
                Severity::High,
            ),
            SkinLesionClass::Unk => ("Unknown", "Classification uncertain", "#6b7280", Severity::Unknown),
        };

        ClassInfo {
            code: self,
            name,
            description,
            color,
            severity,
        }
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn description(self) -> &'static str {
        self.info().description
    }
}
