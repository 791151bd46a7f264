/// Translation / rotation / scale decomposition of 4x4 matrices
use log::debug;
use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use thiserror::Error;

use crate::config::{DegenerateRotation, SceneConfig, ScaleMode};

/// At or below this length a basis vector is treated as zero
const MIN_AXIS_LENGTH: f32 = f32::MIN_POSITIVE;

/// Unit vectors whose cross product is shorter than this are parallel
const PARALLEL_TOLERANCE: f32 = 1e-6;

/// The forward column of a matrix had no usable direction
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("forward axis has zero length")]
pub struct DegenerateForward;

/// Placement of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new(
        translation: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
        scale: Vector3<f32>,
    ) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Split a row-major matrix into translation, rotation and scale.
    ///
    /// Translation is the last column, rotation looks along the third column
    /// using the second column as the up reference, and scale is the length of
    /// each of the first three columns.
    pub fn decompose(
        matrix: &Matrix4<f32>,
        config: &SceneConfig,
    ) -> Result<Self, DegenerateForward> {
        let translation = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);

        let forward = Vector3::new(matrix[(0, 2)], matrix[(1, 2)], matrix[(2, 2)]);
        let up = Vector3::new(matrix[(0, 1)], matrix[(1, 1)], matrix[(2, 1)]);
        let rotation = match (look_rotation(&forward, &up), config.degenerate_rotation) {
            (Some(rotation), _) => rotation,
            (None, DegenerateRotation::Identity) => UnitQuaternion::identity(),
            (None, DegenerateRotation::Reject) => return Err(DegenerateForward),
        };

        let scale = Vector3::new(
            column_length(matrix, 0, config.scale_mode),
            column_length(matrix, 1, config.scale_mode),
            column_length(matrix, 2, config.scale_mode),
        );

        Ok(Self {
            translation,
            rotation,
            scale,
        })
    }

    /// Recompose as `translation * rotation * scale`
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Orientation whose +Z axis points along `forward` and whose +Y axis is as
/// close to `up` as possible while staying orthogonal to `forward`.
///
/// Neither vector needs to be unit length. Returns `None` when `forward` is
/// zero. When `up` is zero or parallel to `forward`, the shortest rotation
/// from +Z onto `forward` is used instead.
pub fn look_rotation(forward: &Vector3<f32>, up: &Vector3<f32>) -> Option<UnitQuaternion<f32>> {
    let forward = forward.try_normalize(MIN_AXIS_LENGTH)?;

    if let Some(up) = up.try_normalize(MIN_AXIS_LENGTH) {
        if up.cross(&forward).norm() > PARALLEL_TOLERANCE {
            return Some(UnitQuaternion::face_towards(&forward, &up));
        }
    }

    debug!("up reference {:?} is parallel to forward {:?}", up, forward);
    let rotation = UnitQuaternion::rotation_between(&Vector3::z(), &forward)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::PI));
    Some(rotation)
}

fn column_length(matrix: &Matrix4<f32>, column: usize, mode: ScaleMode) -> f32 {
    match mode {
        ScaleMode::Projective => matrix.column(column).norm(),
        ScaleMode::Affine => matrix.fixed_view::<3, 1>(0, column).norm(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_near(actual: Vector3<f32>, expected: Vector3<f32>) {
        assert!(
            (actual - expected).norm() < 1e-5,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_identity_decomposition() {
        let transform = Transform::decompose(&Matrix4::identity(), &SceneConfig::default()).unwrap();
        assert_vec_near(transform.translation, Vector3::zeros());
        assert!(transform.rotation.angle() < 1e-6);
        assert_vec_near(transform.scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_pure_translation() {
        let matrix = Matrix4::new_translation(&Vector3::new(3.0, -2.0, 7.5));
        let transform = Transform::decompose(&matrix, &SceneConfig::default()).unwrap();
        assert_vec_near(transform.translation, Vector3::new(3.0, -2.0, 7.5));
        assert!(transform.rotation.angle() < 1e-6);
        assert_vec_near(transform.scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_rotation_about_y() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let matrix = rotation.to_homogeneous();
        let transform = Transform::decompose(&matrix, &SceneConfig::default()).unwrap();
        assert!(transform.rotation.angle_to(&rotation) < 1e-5);
        assert_vec_near(transform.scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_trs_round_trip() {
        let expected = Transform::new(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.3, -0.7, 1.1),
            Vector3::new(2.0, 0.5, 3.0),
        );
        let decomposed = Transform::decompose(&expected.to_matrix(), &SceneConfig::default()).unwrap();
        assert_vec_near(decomposed.translation, expected.translation);
        assert_vec_near(decomposed.scale, expected.scale);
        assert!(decomposed.rotation.angle_to(&expected.rotation) < 1e-4);
    }

    #[test]
    fn test_projective_row_counts_towards_scale() {
        let mut matrix = Matrix4::identity();
        matrix[(3, 0)] = 1.0;

        let projective = Transform::decompose(&matrix, &SceneConfig::default()).unwrap();
        assert!((projective.scale.x - 2.0f32.sqrt()).abs() < 1e-6);

        let affine_config = SceneConfig::default().with_scale_mode(ScaleMode::Affine);
        let affine = Transform::decompose(&matrix, &affine_config).unwrap();
        assert!((affine.scale.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_forward_falls_back_to_identity() {
        let matrix = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0));
        let transform = Transform::decompose(&matrix, &SceneConfig::default()).unwrap();
        assert_eq!(transform.rotation, UnitQuaternion::identity());
        assert_eq!(transform.scale.z, 0.0);
    }

    #[test]
    fn test_zero_forward_rejected_when_strict() {
        let matrix = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0));
        let config = SceneConfig::default().with_degenerate_rotation(DegenerateRotation::Reject);
        assert_eq!(Transform::decompose(&matrix, &config), Err(DegenerateForward));
    }

    #[test]
    fn test_tiny_forward_is_not_degenerate() {
        let matrix = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 1e-7));
        let config = SceneConfig::default().with_degenerate_rotation(DegenerateRotation::Reject);
        let transform = Transform::decompose(&matrix, &config).unwrap();
        assert!(transform.rotation.angle() < 1e-6);
        assert!((transform.scale.z - 1e-7).abs() < 1e-12);
    }

    #[test]
    fn test_short_up_keeps_roll() {
        let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let matrix = roll.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 5e-7, 1.0));
        let transform = Transform::decompose(&matrix, &SceneConfig::default()).unwrap();
        assert!((transform.rotation.angle() - FRAC_PI_2).abs() < 1e-5);
        assert!(transform.rotation.angle_to(&roll) < 1e-5);
        assert!((transform.scale.y - 5e-7).abs() < 1e-12);
    }

    #[test]
    fn test_up_parallel_to_forward() {
        let forward = Vector3::new(1.0, 0.0, 0.0);
        let rotation = look_rotation(&forward, &forward).unwrap();
        assert_vec_near(rotation * Vector3::z(), forward);
    }

    #[test]
    fn test_look_backwards_without_up() {
        let forward = Vector3::new(0.0, 0.0, -1.0);
        let rotation = look_rotation(&forward, &Vector3::zeros()).unwrap();
        assert_vec_near(rotation * Vector3::z(), forward);
    }

    #[test]
    fn test_look_rotation_orthonormalizes_up() {
        let forward = Vector3::new(0.0, 0.0, 2.0);
        let up = Vector3::new(0.0, 3.0, 1.0);
        let rotation = look_rotation(&forward, &up).unwrap();
        assert_vec_near(rotation * Vector3::z(), Vector3::z());
        assert_vec_near(rotation * Vector3::y(), Vector3::y());
    }

    #[test]
    fn test_to_matrix_identity() {
        assert!((Transform::identity().to_matrix() - Matrix4::identity()).norm() < 1e-6);
    }
}
