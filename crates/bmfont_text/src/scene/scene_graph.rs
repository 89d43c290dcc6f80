//! Bounding volumes
//!
//! What a text mesh reports to the scene graph for culling.

use crate::foundation::math::{Point3, Transform, Vec3};

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Smallest box containing this one and `point`
    pub fn expanded_to(&self, point: Vec3) -> Self {
        Self {
            min: self.min.inf(&point),
            max: self.max.sup(&point),
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Box around this one after `transform`
    ///
    /// Handles negative scale (the flipped y axis of text meshes).
    pub fn transformed(&self, transform: &Transform) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut moved = corners
            .iter()
            .map(|c| transform.transform_point(Point3::from(*c)).coords);
        let first = moved.next().unwrap_or_else(Vec3::zeros);
        moved.fold(Self::new(first, first), |aabb, p| aabb.expanded_to(p))
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Sphere center
    pub center: Vec3,
    /// Sphere radius
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere centered on `aabb` reaching the farthest of `points`
    pub fn enclosing(aabb: &Aabb, points: impl IntoIterator<Item = Vec3>) -> Self {
        let center = aabb.center();
        let radius = points
            .into_iter()
            .map(|p| (p - center).norm())
            .fold(0.0f32, f32::max);
        Self { center, radius }
    }

    /// Check if the sphere contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).norm() <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_expand_and_queries() {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::zeros())
            .expanded_to(Vec3::new(2.0, -4.0, 0.0))
            .expanded_to(Vec3::new(-2.0, 4.0, 0.0));

        assert_eq!(aabb.min, Vec3::new(-2.0, -4.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 4.0, 0.0));
        assert_eq!(aabb.center(), Vec3::zeros());
        assert_eq!(aabb.extents(), Vec3::new(2.0, 4.0, 0.0));
        assert!(aabb.contains_point(Vec3::new(1.0, 1.0, 0.0)));
        assert!(!aabb.contains_point(Vec3::new(3.0, 1.0, 0.0)));
        assert!(aabb.intersects(&Aabb::new(Vec3::new(1.0, 1.0, 0.0), Vec3::new(5.0, 5.0, 0.0))));
    }

    #[test]
    fn test_transformed_with_flipped_y() {
        let aabb = Aabb::new(Vec3::new(0.0, -10.0, 0.0), Vec3::new(20.0, 0.0, 0.0));
        let transform = Transform::new(Vec3::new(-1.0, 0.0, 0.001), Vec3::new(0.1, -0.1, 0.1));
        let moved = aabb.transformed(&transform);

        assert_relative_eq!(moved.min.x, -1.0);
        assert_relative_eq!(moved.max.x, 1.0);
        assert_relative_eq!(moved.min.y, 0.0);
        assert_relative_eq!(moved.max.y, 1.0);
        assert_relative_eq!(moved.min.z, 0.001);
    }

    #[test]
    fn test_sphere_encloses_points() {
        let points = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(6.0, 8.0, 0.0)];
        let aabb = Aabb::new(points[0], points[1]);
        let sphere = BoundingSphere::enclosing(&aabb, points);

        assert_eq!(sphere.center, Vec3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(sphere.radius, 5.0);
        assert!(sphere.contains_point(Vec3::new(6.0, 8.0, 0.0)));
    }
}
