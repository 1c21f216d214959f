use shared::fusion::{FusionMethod, FusionSettings, eligible_images, fuse, fuse_case};
use shared::{Case, SkinLesionClass};

const CASE_JSON: &str = include_str!("fixtures/case.json");

fn load_case() -> Case {
    serde_json::from_str(CASE_JSON).expect("fixture parses")
}

fn confidence_of(case_fusion: &shared::CaseFusion, class: SkinLesionClass) -> Option<f64> {
    case_fusion
        .predictions
        .iter()
        .find(|p| p.class_name == class)
        .map(|p| p.confidence)
}

#[test]
fn fixture_exposes_rejected_and_pending_images() {
    let case = load_case();
    assert_eq!(case.images.len(), 4);
    assert!(!case.images[2].qc_results.is_acceptable);
    assert!(case.images[3].prediction.is_none());
    assert!(case.fused_prediction.is_none());
}

#[test]
fn weighted_fusion_over_acceptable_images() {
    let case = load_case();
    let settings = FusionSettings::new(FusionMethod::Weighted, 0.0).unwrap();
    let fusion = fuse_case(&case, &settings);

    assert_eq!(fusion.image_count, 2);
    let ids: Vec<&str> = fusion.contributions.iter().map(|c| c.image_id.as_str()).collect();
    assert_eq!(ids, vec!["img-a", "img-b"]);

    let mel = confidence_of(&fusion, SkinLesionClass::Mel).unwrap();
    assert!((mel - 1.15 / 1.5).abs() < 1e-9);
    let nv = confidence_of(&fusion, SkinLesionClass::Nv).unwrap();
    assert!((nv - 0.3).abs() < 1e-9);
    assert_eq!(confidence_of(&fusion, SkinLesionClass::Bkl), None);
    assert_eq!(fusion.primary().unwrap().class_name, SkinLesionClass::Mel);
}

#[test]
fn default_threshold_drops_low_quality_image() {
    let case = load_case();
    let fusion = fuse_case(&case, &FusionSettings::default());
    assert_eq!(fusion.image_count, 1);
    assert_eq!(fusion.predictions.len(), 1);
    assert!((fusion.predictions[0].confidence - 0.9).abs() < 1e-9);
}

#[test]
fn majority_over_fixture() {
    let case = load_case();
    let eligible = eligible_images(&case, 0.0);
    let fused = fuse(eligible, FusionMethod::Majority);
    assert_eq!(fused[0].class_name, SkinLesionClass::Mel);
    assert_eq!(fused[0].confidence, 1.0);
    assert_eq!(fused[1].class_name, SkinLesionClass::Nv);
    assert_eq!(fused[1].confidence, 0.0);
}

#[test]
fn fusion_report_serializes_for_clients() {
    let case = load_case();
    let fusion = fuse_case(&case, &FusionSettings::default());
    let value = serde_json::to_value(&fusion).unwrap();
    assert_eq!(value["method"], "weighted");
    assert_eq!(value["imageCount"], 1);
    assert_eq!(value["predictions"][0]["className"], "MEL");
}
