//! Math utilities and types
//!
//! Provides the small set of math types the text pipeline needs.

pub use nalgebra::{Vector2, Vector3, Matrix4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Local transform of a mesh: position offset and non-uniform scale
///
/// Text meshes are never rotated by the controller; rotation belongs to the
/// owning scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in the owning node's local space
    pub position: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform from position and scale
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// Treat non-finite and non-positive values as absent
///
/// Checked after narrowing, so values outside `f32` range are absent too.
pub fn positive_finite(value: Option<f64>) -> Option<f32> {
    finite(value).filter(|v| *v > 0.0)
}

/// Treat non-finite values as absent
pub fn finite(value: Option<f64>) -> Option<f32> {
    value.map(|v| v as f32).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_flips_y() {
        let transform = Transform::new(Vec3::new(1.0, 2.0, 0.001), Vec3::new(0.5, -0.5, 0.5));
        let p = transform.transform_point(Point3::new(2.0, 2.0, 0.0));

        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.y, 1.0);
        assert_relative_eq!(p.z, 0.001);
    }

    #[test]
    fn test_numeric_filters() {
        assert_eq!(positive_finite(Some(f64::NAN)), None);
        assert_eq!(positive_finite(Some(0.0)), None);
        assert_eq!(positive_finite(Some(-3.0)), None);
        assert_eq!(positive_finite(Some(2.5)), Some(2.5));
        assert_eq!(finite(Some(f64::INFINITY)), None);
        assert_eq!(finite(Some(-1.0)), Some(-1.0));
        assert_eq!(finite(None), None);

        // Finite as f64, out of range as f32
        assert_eq!(positive_finite(Some(1e300)), None);
        assert_eq!(finite(Some(-1e300)), None);
        assert_eq!(positive_finite(Some(1e-300)), None);
    }
}
