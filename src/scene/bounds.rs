//! Bounding spheres.
//!
//! The culler reduces the visible set to a single enclosing sphere that the
//! light planner fits its shadow frusta around. An empty scene is represented
//! by the NaN sentinel sphere rather than an `Option`, matching how every
//! downstream consumer treats it: a value that poisons any frustum math
//! accidentally performed with it.

use glam::{Mat4, Vec3};

/// A sphere in world or local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    #[inline]
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// The "nothing to render" sentinel: NaN center and radius.
    ///
    /// Consumers must check [`is_sentinel`](Self::is_sentinel) before fitting
    /// any frustum to a scene sphere.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            center: Vec3::splat(f32::NAN),
            radius: f32::NAN,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.radius.is_nan()
    }

    /// Encloses a point cloud: box-center seed, radius to the farthest point.
    ///
    /// Returns the sentinel for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::sentinel();
        };

        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }

        let center = (min + max) * 0.5;
        let radius_sq = points
            .iter()
            .map(|p| p.distance_squared(center))
            .fold(0.0f32, f32::max);

        Self {
            center,
            radius: radius_sq.sqrt(),
        }
    }

    /// Smallest sphere containing both inputs.
    ///
    /// When one sphere already contains the other, that sphere is returned
    /// unchanged; otherwise the result is tangent to the far side of each.
    /// Merging with the sentinel yields the other sphere, so a fold over a
    /// possibly-empty set can start from [`sentinel`](Self::sentinel).
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if self.is_sentinel() {
            return other;
        }
        if other.is_sentinel() {
            return self;
        }

        let offset = other.center - self.center;
        let distance = offset.length();

        // Containment in either direction, also covers coincident centers.
        if distance + other.radius <= self.radius {
            return self;
        }
        if distance + self.radius <= other.radius {
            return other;
        }

        let radius = (distance + self.radius + other.radius) * 0.5;
        let center = self.center + offset * ((radius - self.radius) / distance);
        Self { center, radius }
    }

    /// Applies a world matrix: the center is transformed as a point, the
    /// radius scaled by the matrix's largest axis scale.
    #[must_use]
    pub fn transformed(&self, world: &Mat4) -> Self {
        let scale = world
            .x_axis
            .truncate()
            .length()
            .max(world.y_axis.truncate().length())
            .max(world.z_axis.truncate().length());

        Self {
            center: world.transform_point3(self.center),
            radius: self.radius * scale,
        }
    }

    /// True when `point` lies inside or on the sphere.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    /// True when `other` lies entirely inside this sphere (with a small
    /// tolerance at the boundary).
    #[must_use]
    pub fn contains_sphere(&self, other: &Self) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius + 1e-4
    }
}
