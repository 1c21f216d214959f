use std::path::Path;

use serde::Serialize;
use shared::quality::{MetricReport, QualityBreakdown, quality_breakdown};
use shared::{
    Case, ClassInfo, QualityControlResult, SkinLesionClass, UploadCandidate,
    evaluate_image_quality, fuse_case,
};

use crate::cli::{Command, FuseArgs, QcArgs, ValidateArgs};
use crate::config::ReviewConfig;
use crate::error::{Result, ReviewError};
use crate::report;

pub fn run(command: Command, config: &ReviewConfig) -> Result<String> {
    match command {
        Command::Fuse(args) => fuse(args, config),
        Command::Qc(args) => qc(args, config),
        Command::Classes(output) => classes(output.json),
        Command::Validate(args) => validate(args, config),
    }
}

pub fn load_case(path: &Path) -> Result<Case> {
    let payload = std::fs::read_to_string(path).map_err(|source| ReviewError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&payload).map_err(|source| ReviewError::CasePayload {
        path: path.to_path_buf(),
        source,
    })
}

fn fuse(args: FuseArgs, config: &ReviewConfig) -> Result<String> {
    let settings = config.fusion_settings(args.method, args.quality_threshold)?;
    let case = load_case(&args.case)?;
    log::info!(
        "Fusing case {} ({} images) with {}",
        case.id,
        case.images.len(),
        settings.method
    );

    let fusion = fuse_case(&case, &settings);
    if fusion.image_count == 0 {
        log::warn!("Case {} has no images eligible for fusion", case.id);
    }

    if args.output.json {
        Ok(serde_json::to_string_pretty(&fusion)?)
    } else {
        Ok(report::FusionReport(&fusion).to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QcOutput<'a> {
    #[serde(flatten)]
    qc: &'a QualityControlResult,
    status: &'static str,
    metrics: MetricReport,
    quality_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<QualityBreakdown>,
}

fn qc(args: QcArgs, config: &ReviewConfig) -> Result<String> {
    let result = evaluate_image_quality(args.brightness, args.contrast, args.blur, &config.qc);
    let metrics = MetricReport::new(&result, &config.qc);
    let breakdown = quality_breakdown(&result);

    if args.output.json {
        let output = QcOutput {
            qc: &result,
            status: shared::QcStatus::of(&result).label(),
            metrics,
            quality_score: breakdown.map_or(0.0, |b| b.score),
            breakdown,
        };
        Ok(serde_json::to_string_pretty(&output)?)
    } else {
        Ok(report::QcReport {
            qc: &result,
            metrics: &metrics,
            breakdown: breakdown.as_ref(),
        }
        .to_string())
    }
}

fn classes(json: bool) -> Result<String> {
    let classes: Vec<ClassInfo> = SkinLesionClass::all().map(SkinLesionClass::info).collect();
    if json {
        Ok(serde_json::to_string_pretty(&classes)?)
    } else {
        Ok(report::ClassTable(&classes).to_string())
    }
}

fn validate(args: ValidateArgs, config: &ReviewConfig) -> Result<String> {
    let mut candidates = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let metadata = std::fs::metadata(path).map_err(|source| ReviewError::Read {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        candidates.push(UploadCandidate::from_name(name, metadata.len()));
    }

    let failures = config.upload.validate_batch(&candidates)?;
    let mut lines = Vec::with_capacity(candidates.len());
    // Rejections are logged; the first one becomes the command's error.
    for (index, candidate) in candidates.iter().enumerate() {
        match failures.iter().find(|(i, _)| *i == index) {
            Some((_, err)) => log::warn!("Rejected {err}"),
            None => lines.push(format!(
                "OK {} ({}, {})",
                candidate.name,
                candidate.mime,
                shared::format::format_file_size(candidate.size)
            )),
        }
    }

    if let Some((_, first)) = failures.into_iter().next() {
        return Err(first.into());
    }
    Ok(lines.join("\n"))
}
