/// Command-line interface configuration
use clap::{Parser, ValueEnum};
use xscene_core::{DegenerateRotation, ScaleMode, SceneConfig};

use crate::demo::Demo;

/// How per-axis scale is read from transformation matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScaleArg {
    /// Include the bottom matrix row in the scale magnitudes
    Projective,
    /// Use the upper three rows only
    Affine,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "xscene-terminal")]
#[command(about = "Build a scene tree and view it in the terminal", long_about = None)]
pub struct Cli {
    /// Built-in scene document to load
    #[arg(long, value_enum, default_value = "solar")]
    pub demo: Demo,

    /// Scale decomposition mode
    #[arg(long, value_enum, default_value = "projective")]
    pub scale_mode: ScaleArg,

    /// Fail instead of falling back to identity for zero-length forward axes
    #[arg(long)]
    pub strict_rotation: bool,

    /// Always include the root origin in the bounding box
    #[arg(long)]
    pub enclose_root_origin: bool,

    /// Target frames per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub fps: u32,

    /// Sphere tessellation (segments around the equator)
    #[arg(long, default_value_t = 24)]
    pub sphere_segments: usize,

    /// Print the scene tree and bounding box instead of opening the viewer
    #[arg(long)]
    pub print: bool,
}

impl Cli {
    pub fn scene_config(&self) -> SceneConfig {
        let scale_mode = match self.scale_mode {
            ScaleArg::Projective => ScaleMode::Projective,
            ScaleArg::Affine => ScaleMode::Affine,
        };
        let degenerate_rotation = if self.strict_rotation {
            DegenerateRotation::Reject
        } else {
            DegenerateRotation::Identity
        };

        SceneConfig::new()
            .with_scale_mode(scale_mode)
            .with_degenerate_rotation(degenerate_rotation)
            .with_enclose_root_origin(self.enclose_root_origin)
    }
}
