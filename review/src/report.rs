use std::fmt;

use shared::format::{ConfidenceLevel, format_confidence};
use shared::quality::{MetricReport, MetricStatus, QualityBreakdown};
use shared::{CaseFusion, ClassInfo, QcStatus, QualityControlResult};

pub struct FusionReport<'a>(pub &'a CaseFusion);

impl fmt::Display for FusionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fusion = self.0;
        writeln!(f, "Case {}", fusion.case_id)?;
        writeln!(
            f,
            "Method: {} ({}), quality threshold {:.2}",
            fusion.method,
            fusion.method.description(),
            fusion.quality_threshold
        )?;

        let Some(primary) = fusion.primary() else {
            return writeln!(
                f,
                "No images with acceptable quality and predictions found for fusion analysis."
            );
        };

        writeln!(f, "Based on {} images", fusion.image_count)?;
        let level = ConfidenceLevel::from_confidence(primary.confidence);
        writeln!(
            f,
            "Primary diagnosis: {} {} ({} confidence)",
            primary.class_name.name(),
            format_confidence(primary.confidence),
            level.label()
        )?;

        writeln!(f, "\nFused predictions:")?;
        for (rank, prediction) in fusion.predictions.iter().enumerate() {
            let info = prediction.class_name.info();
            writeln!(
                f,
                "  {}. {:<4} {:<24} {:>6}  {} severity",
                rank + 1,
                info.code,
                info.name,
                format_confidence(prediction.confidence),
                info.severity
            )?;
        }

        writeln!(f, "\nImage contributions:")?;
        for (index, contribution) in fusion.contributions.iter().enumerate() {
            let top = match (contribution.top_class, contribution.top_confidence) {
                (Some(class), Some(confidence)) => {
                    format!("{} {}", class.name(), format_confidence(confidence))
                }
                _ => "no ranked classes".to_string(),
            };
            writeln!(
                f,
                "  Image {} ({}): {} (Q: {:.2})",
                index + 1,
                contribution.filename,
                top,
                contribution.quality_score
            )?;
        }
        Ok(())
    }
}

fn metric_marker(status: MetricStatus) -> &'static str {
    match status {
        MetricStatus::Ok => "ok",
        MetricStatus::Warning => "warn",
        MetricStatus::Failing => "fail",
    }
}

pub struct QcReport<'a> {
    pub qc: &'a QualityControlResult,
    pub metrics: &'a MetricReport,
    pub breakdown: Option<&'a QualityBreakdown>,
}

impl fmt::Display for QcReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qc = self.qc;
        writeln!(f, "{} Quality", QcStatus::of(qc).label())?;
        writeln!(
            f,
            "  brightness {:>8.1}  [{}]",
            qc.brightness,
            metric_marker(self.metrics.brightness)
        )?;
        writeln!(
            f,
            "  contrast   {:>8.2}  [{}]",
            qc.contrast,
            metric_marker(self.metrics.contrast)
        )?;
        writeln!(
            f,
            "  blur       {:>8.1}  [{}]",
            qc.blur,
            metric_marker(self.metrics.blur)
        )?;

        for warning in &qc.warnings {
            writeln!(f, "  - {warning}")?;
        }

        match self.breakdown {
            Some(b) => writeln!(f, "Quality score: {:.2}", b.score),
            None => writeln!(f, "Quality score: 0.00 (rejected)"),
        }
    }
}

pub struct ClassTable<'a>(pub &'a [ClassInfo]);

impl fmt::Display for ClassTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for info in self.0 {
            writeln!(
                f,
                "{:<4} {:<24} {:<8} {}  {}",
                info.code, info.name, info.severity, info.color, info.description
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::fusion::{FusionMethod, ImageContribution};
    use shared::quality::{QcThresholds, evaluate_image_quality, quality_breakdown};
    use shared::{ClassPrediction, SkinLesionClass};

    fn fusion(predictions: Vec<ClassPrediction>) -> CaseFusion {
        CaseFusion {
            case_id: "case-7".to_string(),
            method: FusionMethod::Weighted,
            quality_threshold: 0.7,
            image_count: 1,
            contributions: vec![ImageContribution {
                image_id: "img-1".to_string(),
                filename: "arm.jpg".to_string(),
                top_class: predictions.first().map(|p| p.class_name),
                top_confidence: predictions.first().map(|p| p.confidence),
                quality_score: 0.91,
            }],
            predictions,
        }
    }

    #[test]
    fn fusion_report_lists_ranked_classes() {
        let report = FusionReport(&fusion(vec![
            ClassPrediction::new(SkinLesionClass::Mel, 0.82),
            ClassPrediction::new(SkinLesionClass::Nv, 0.11),
        ]))
        .to_string();

        assert!(report.contains("Primary diagnosis: Melanoma 82.0% (High confidence)"));
        assert!(report.contains("1. MEL"));
        assert!(report.contains("2. NV"));
        assert!(report.contains("Image 1 (arm.jpg): Melanoma 82.0% (Q: 0.91)"));
    }

    #[test]
    fn empty_fusion_report_explains_why() {
        let mut empty = fusion(Vec::new());
        empty.image_count = 0;
        empty.contributions.clear();
        let report = FusionReport(&empty).to_string();
        assert!(report.contains("No images with acceptable quality"));
        assert!(!report.contains("Primary diagnosis"));
    }

    #[test]
    fn qc_report_marks_failing_metrics() {
        let thresholds = QcThresholds::default();
        let qc = evaluate_image_quality(5.0, 0.5, 80.0, &thresholds);
        let metrics = MetricReport::new(&qc, &thresholds);
        let breakdown = quality_breakdown(&qc);
        let report = QcReport {
            qc: &qc,
            metrics: &metrics,
            breakdown: breakdown.as_ref(),
        }
        .to_string();

        assert!(report.starts_with("Poor Quality"));
        assert!(report.contains("[fail]"));
        assert!(report.contains("- Image is too dark"));
        assert!(report.contains("(rejected)"));
    }

    #[test]
    fn class_table_has_one_row_per_class() {
        let classes: Vec<ClassInfo> = SkinLesionClass::all().map(SkinLesionClass::info).collect();
        let table = ClassTable(&classes).to_string();
        assert_eq!(table.lines().count(), 9);
        assert!(table.lines().any(|l| l.starts_with("SCC")));
    }
}
