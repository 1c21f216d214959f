use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::FusionMethod;

#[derive(Debug, Parser)]
#[command(name = "review", version, about = "Review skin lesion cases: QC, fusion and upload checks")]
pub struct Cli {
    /// YAML config file
    #[arg(long, global = true, env = "SKIN_DX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fuse the per-image predictions of a case exported from the API
    Fuse(FuseArgs),
    /// Run the QC gate on raw image metrics
    Qc(QcArgs),
    /// List the lesion classes known to the classifier
    Classes(OutputArgs),
    /// Check files against the upload limits
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct FuseArgs {
    /// Case JSON file
    pub case: PathBuf,

    /// average, weighted, majority or max_confidence
    #[arg(long, env = "SKIN_DX_FUSION_METHOD")]
    pub method: Option<FusionMethod>,

    /// Minimum image quality score in [0, 1]
    #[arg(long, env = "SKIN_DX_QUALITY_THRESHOLD")]
    pub quality_threshold: Option<f64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct QcArgs {
    /// Mean brightness on a 0-255 scale
    #[arg(long)]
    pub brightness: f64,

    #[arg(long)]
    pub contrast: f64,

    #[arg(long)]
    pub blur: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
