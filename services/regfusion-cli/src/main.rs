//! Registration-fusion projection CLI.
//!
//! Projects a volumetric NIfTI image in MNI152 or Colin27 space onto the
//! fsaverage surface and prints the absolute paths of the two hemisphere
//! outputs (left first).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use regfusion::{RegFusion, RegFusionConfig};
use regfusion_common::ProjectionRequest;

#[derive(Parser, Debug)]
#[command(name = "regfusion")]
#[command(about = "Project volumetric data to fsaverage using registration fusion")]
struct Args {
    /// Input volume (.nii or .nii.gz)
    #[arg(short = 's', long = "input")]
    input: PathBuf,

    /// Output directory (created if missing)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Template space of the input: MNI152_orig, Colin27_orig, MNI152_norm or Colin27_norm
    #[arg(short = 'p', long = "template", default_value = "MNI152_orig")]
    template_type: String,

    /// Registration-fusion family: RF_ANTs or RF_M3Z
    #[arg(short = 'r', long = "rf-type", default_value = "RF_ANTs")]
    rf_type: String,

    /// Interpolation: linear or nearest
    #[arg(short = 'i', long = "interp", default_value = "linear")]
    interp: String,

    /// Output type: nii.gz, func.gii or label.gii
    #[arg(short = 't', long = "out-type", default_value = "nii.gz")]
    out_type: String,

    /// Directory containing the mapping tables
    #[arg(short = 'd', long = "mapping-dir")]
    mapping_dir: Option<PathBuf>,

    /// YAML configuration file (overrides REGFUSION_* environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Print the result as a JSON object instead of two paths
    #[arg(long)]
    json: bool,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Logs go to stderr so stdout carries only the output paths.
fn init_tracing(args: &Args) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Environment (or YAML file), then command-line overrides.
fn load_config(args: &Args) -> Result<RegFusionConfig> {
    let mut config = match &args.config {
        Some(path) => RegFusionConfig::from_yaml(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RegFusionConfig::from_env(),
    };
    if let Some(dir) = &args.mapping_dir {
        config.mapping_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args)?;

    let request =
        ProjectionRequest::parse(&args.template_type, &args.rf_type, &args.interp, &args.out_type)?;
    let config = load_config(&args)?;
    info!(input = %args.input.display(), output = %args.output.display(), "Starting projection");

    let engine = RegFusion::new(config)?;
    let outcome = engine
        .project_file(&args.input, &args.output, &request)
        .with_context(|| format!("projecting {}", args.input.display()))?;

    if args.json {
        let summary = serde_json::json!({
            "lh": outcome.lh_path,
            "rh": outcome.rh_path,
            "family": outcome.projection.family.to_string(),
            "interp": outcome.projection.interp,
            "out_type": outcome.projection.out_type,
            "diagnostics": outcome.diagnostics(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", outcome.lh_path.display());
        println!("{}", outcome.rh_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["regfusion", "-s", "in.nii.gz", "-o", "out"]).unwrap();
        assert_eq!(args.template_type, "MNI152_orig");
        assert_eq!(args.rf_type, "RF_ANTs");
        assert_eq!(args.interp, "linear");
        assert_eq!(args.out_type, "nii.gz");
        assert!(args.mapping_dir.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "regfusion", "-s", "in.nii", "-o", "out", "-p", "Colin27_norm", "-r", "RF_M3Z", "-i",
            "nearest", "-t", "label.gii", "-d", "/maps",
        ])
        .unwrap();
        assert_eq!(args.template_type, "Colin27_norm");
        assert_eq!(args.rf_type, "RF_M3Z");
        assert_eq!(args.out_type, "label.gii");
        assert_eq!(args.mapping_dir, Some(PathBuf::from("/maps")));
    }

    #[test]
    fn test_input_and_output_required() {
        assert!(Args::try_parse_from(["regfusion", "-s", "in.nii.gz"]).is_err());
    }

    #[test]
    fn test_mapping_dir_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("regfusion.yaml");
        std::fs::write(&yaml, "mapping_dir: /from/yaml\nvertex_count: 10\n").unwrap();

        let config_arg = yaml.to_string_lossy().into_owned();
        let args = Args::try_parse_from([
            "regfusion", "-s", "in.nii.gz", "-o", "out", "--config", &config_arg, "-d", "/from/flag",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.mapping_dir, PathBuf::from("/from/flag"));
        assert_eq!(config.vertex_count, 10);
    }

    #[test]
    fn test_parse_level_fallback() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }
}
