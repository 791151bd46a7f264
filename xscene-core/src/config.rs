/// What to do when a matrix's forward column has zero length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegenerateRotation {
    /// Fall back to the identity orientation
    #[default]
    Identity,
    /// Abort the build with `SceneError::DegenerateRotation`
    Reject,
}

/// Which rows contribute to the per-axis scale magnitudes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Magnitude over all four rows of each basis column, including the
    /// projective row. Matches the data produced by existing exporters.
    #[default]
    Projective,
    /// Magnitude over the upper three rows only
    Affine,
}

/// Configuration shared by the builder and the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneConfig {
    pub degenerate_rotation: DegenerateRotation,
    pub scale_mode: ScaleMode,
    /// Seed the bounds union with the root's world position, so the box
    /// always contains the root origin even when geometry lies elsewhere.
    pub enclose_root_origin: bool,
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_degenerate_rotation(mut self, policy: DegenerateRotation) -> Self {
        self.degenerate_rotation = policy;
        self
    }

    pub fn with_scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    pub fn with_enclose_root_origin(mut self, enclose: bool) -> Self {
        self.enclose_root_origin = enclose;
        self
    }
}
