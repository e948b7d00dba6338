//! Output configuration shared by the transform engine and persisted as JSON.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::log_debug;
use crate::pose::EulerAngles;

/// Which top-level variants the output payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeFormats {
    pub absolute_input: bool,
    pub delta_input: bool,
    pub absolute_transformed: bool,
    pub delta_transformed: bool,
}

impl Default for IncludeFormats {
    fn default() -> Self {
        Self {
            absolute_input: true,
            delta_input: false,
            absolute_transformed: true,
            delta_transformed: false,
        }
    }
}

/// Which orientation encodings are attached to each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeOrientation {
    pub quaternion: bool,
    pub euler_radian: bool,
    pub euler_degree: bool,
}

impl Default for IncludeOrientation {
    fn default() -> Self {
        Self {
            quaternion: true,
            euler_radian: false,
            euler_degree: false,
        }
    }
}

/// Per-axis multipliers; negative values mirror an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputAxes {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for OutputAxes {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

/// Auxiliary target coordinate frame, rotation in radians. Display-only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetFrame {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rotation: EulerAngles,
}

/// The single active output configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputConfig {
    pub include_formats: IncludeFormats,
    pub include_orientation: IncludeOrientation,
    pub scale: f64,
    pub output_axes: OutputAxes,
    pub target_frame: Option<TargetFrame>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_formats: IncludeFormats::default(),
            include_orientation: IncludeOrientation::default(),
            scale: 1.0,
            output_axes: OutputAxes::default(),
            target_frame: None,
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputConfigFile {
    #[serde(default)]
    include_formats: IncludeFormats,
    #[serde(default)]
    include_orientation: IncludeOrientation,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default)]
    output_axes: OutputAxes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_frame: Option<FrameFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_frame_degrees: Option<FrameFields>,
}

/// On-disk target frame. Older files stored a quaternion instead of Euler angles.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FrameFields {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x_rot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y_rot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    z_rot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qw: Option<f64>,
}

impl FrameFields {
    fn has_euler(&self) -> bool {
        self.x_rot.is_some() || self.y_rot.is_some() || self.z_rot.is_some()
    }

    fn has_quaternion(&self) -> bool {
        self.qx.is_some() || self.qy.is_some() || self.qz.is_some() || self.qw.is_some()
    }

    fn euler(&self) -> EulerAngles {
        EulerAngles::new(
            self.x_rot.unwrap_or(0.0),
            self.y_rot.unwrap_or(0.0),
            self.z_rot.unwrap_or(0.0),
        )
    }

    fn from_frame(frame: &TargetFrame, rotation: EulerAngles) -> Self {
        Self {
            x: frame.x,
            y: frame.y,
            z: frame.z,
            x_rot: Some(rotation.x),
            y_rot: Some(rotation.y),
            z_rot: Some(rotation.z),
            ..Default::default()
        }
    }
}

/// Degrees first, then radians, then zeroed for legacy quaternion-only frames.
fn resolve_target_frame(
    radians: Option<FrameFields>,
    degrees: Option<FrameFields>,
) -> Option<TargetFrame> {
    if let Some(deg) = degrees {
        return Some(TargetFrame {
            x: deg.x,
            y: deg.y,
            z: deg.z,
            rotation: deg.euler().to_radians(),
        });
    }
    let rad = radians?;
    if !rad.has_euler() && rad.has_quaternion() {
        log_debug("legacy quaternion target frame found; resetting target frame to zero");
        return Some(TargetFrame::default());
    }
    Some(TargetFrame {
        x: rad.x,
        y: rad.y,
        z: rad.z,
        rotation: rad.euler(),
    })
}

/// Parse an output configuration document. Missing keys take their defaults.
pub fn parse_output_config(text: &str) -> Result<OutputConfig> {
    let file: OutputConfigFile =
        serde_json::from_str(text).context("failed to parse output config JSON")?;
    if !file.scale.is_finite() || file.scale < 0.0 {
        bail!("scale must be a non-negative number, got {}", file.scale);
    }
    let axes = file.output_axes;
    if !(axes.x.is_finite() && axes.y.is_finite() && axes.z.is_finite()) {
        bail!("outputAxes must be finite numbers");
    }
    Ok(OutputConfig {
        include_formats: file.include_formats,
        include_orientation: file.include_orientation,
        scale: file.scale,
        output_axes: file.output_axes,
        target_frame: resolve_target_frame(file.target_frame, file.target_frame_degrees),
    })
}

pub fn load_output_config(path: &Path) -> Result<OutputConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read output config '{}'", path.display()))?;
    parse_output_config(&text)
        .with_context(|| format!("invalid output config '{}'", path.display()))
}

/// Append `.json` unless the path already ends with it (case-insensitive).
pub fn ensure_json_extension(path: &Path) -> PathBuf {
    let has_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if has_json {
        return path.to_path_buf();
    }
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".json");
    PathBuf::from(raw)
}

pub(crate) fn output_config_to_json(config: &OutputConfig) -> Result<String> {
    let file = OutputConfigFile {
        include_formats: config.include_formats,
        include_orientation: config.include_orientation,
        scale: config.scale,
        output_axes: config.output_axes,
        target_frame: config
            .target_frame
            .as_ref()
            .map(|frame| FrameFields::from_frame(frame, frame.rotation)),
        target_frame_degrees: config
            .target_frame
            .as_ref()
            .map(|frame| FrameFields::from_frame(frame, frame.rotation.to_degrees())),
    };
    serde_json::to_string_pretty(&file).context("failed to serialize output config")
}

/// Write the configuration and return the path actually written.
pub fn save_output_config(config: &OutputConfig, path: &Path) -> Result<PathBuf> {
    let path = ensure_json_extension(path);
    let json = output_config_to_json(config)?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write output config '{}'", path.display()))?;
    Ok(path)
}
