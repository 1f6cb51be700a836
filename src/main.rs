//! Calibration inspector.
//!
//! Loads a camera calibration file with the matching parser and prints the
//! resulting canonical model.
//!
//! Usage:
//! ```bash
//! cargo run -- --format euroc --path samples/euroc_cam0.yaml
//! cargo run -- --format kitti --path samples/kitti_calib.txt --cam-id 00
//! ```

use clap::Parser;
use nalgebra::{Matrix3, Vector3};
use std::path::PathBuf;
use vio_calib::{parse_euroc_yaml, parse_kitti_calib};

/// Camera calibration inspection tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Calibration source format (euroc, kitti)
    #[arg(short, long)]
    format: String,

    /// Path to the calibration file
    #[arg(short, long)]
    path: PathBuf,

    /// Camera identifier for the KITTI line format
    #[arg(short, long, default_value = "0")]
    cam_id: String,

    /// Body-from-camera transform for the KITTI format: 12 comma-separated
    /// values (row-major r00..r22, then t0 t1 t2). Identity when omitted.
    #[arg(long)]
    pose: Option<String>,
}

/// Splits the `--pose` argument into a rotation matrix and translation vector.
fn parse_pose_arg(spec: &str) -> Result<(Matrix3<f64>, Vector3<f64>), Box<dyn std::error::Error>> {
    let values = spec
        .split(',')
        .map(|token| token.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()?;
    if values.len() != 12 {
        return Err(format!(
            "--pose needs 12 comma-separated values, got {}",
            values.len()
        )
        .into());
    }
    let rotation = Matrix3::from_fn(|r, c| values[r * 3 + c]);
    let translation = Vector3::new(values[9], values[10], values[11]);
    Ok((rotation, translation))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let params = match cli.format.to_lowercase().as_str() {
        "euroc" => parse_euroc_yaml(&cli.path)?,
        "kitti" => {
            let (rotation, translation) = match &cli.pose {
                Some(spec) => parse_pose_arg(spec)?,
                None => (Matrix3::identity(), Vector3::zeros()),
            };
            parse_kitti_calib(&cli.path, &rotation, &translation, &cli.cam_id)?
        }
        other => {
            return Err(
                format!("Unsupported format: {other}. Supported formats: euroc, kitti").into(),
            );
        }
    };

    params.print();
    Ok(())
}
