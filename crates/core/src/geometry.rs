//! Rays, planes, and screen-space rectangles.

use glam::{Vec2, Vec3};

/// A ray in world space with a normalized direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Normalized ray direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// An infinite plane in normal/distance form (`normal . p = d`).
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Plane normal (normalized).
    pub normal: Vec3,
    /// Signed distance from the origin along the normal.
    pub d: f32,
}

impl Plane {
    /// Build a plane passing through `point` with the given `normal`.
    pub fn from_point_and_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            d: normal.dot(point),
        }
    }

    /// Build a camera-facing plane through `point`.
    ///
    /// The plane normal is the normalized camera target-minus-position vector,
    /// so a point dragged across this plane moves naturally in the screen
    /// plane instead of along the model surface.
    pub fn camera_facing(point: Vec3, camera_position: Vec3, camera_target: Vec3) -> Self {
        Self::from_point_and_normal(point, camera_target - camera_position)
    }

    /// Intersect a ray with this plane.
    ///
    /// Returns `None` when the ray is parallel to the plane or the
    /// intersection lies behind the ray origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        let denom = ray.direction.dot(self.normal);
        if denom.abs() < 1e-6 {
            return None;
        }

        let t = (self.d - ray.origin.dot(self.normal)) / denom;
        if t < 0.0 {
            return None;
        }

        Some(ray.point_at(t))
    }
}

/// Viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl ViewportSize {
    /// Create a new viewport size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The size as a vector, handy for component-wise scaling.
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// An axis-aligned rectangle in screen space, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl ScreenRect {
    /// Create a rect from its top-left corner and size.
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Create a rect centered on `center` with the given half extent on each
    /// axis (a square when used with a scalar half size).
    pub fn from_center_half_size(center: Vec2, half_size: Vec2) -> Self {
        Self {
            min: center - half_size,
            size: half_size * 2.0,
        }
    }

    /// Bottom-right corner.
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }

    /// This rect translated by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            size: self.size,
        }
    }
}

/// Build an orthonormal basis `(normal, tangent0, tangent1)` from a surface
/// normal.
///
/// The helper axis is the world axis along the normal's smallest component,
/// which keeps the cross products well conditioned for any input normal.
/// Hosts use this to orient pin marker geometry on the picked surface.
pub fn surface_basis(normal: Vec3) -> (Vec3, Vec3, Vec3) {
    let normal = normal.normalize();
    let abs = normal.abs();

    let mut axis = Vec3::ZERO;
    if abs.x <= abs.y && abs.x <= abs.z {
        axis.x = 1.0;
    } else if abs.y <= abs.z {
        axis.y = 1.0;
    } else {
        axis.z = 1.0;
    }

    let tangent0 = normal.cross(axis).normalize();
    let tangent1 = normal.cross(tangent0);
    (normal, tangent0, tangent1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_plane_intersection_hits_in_front() {
        let plane = Plane::from_point_and_normal(Vec3::ZERO, Vec3::Z);
        let ray = Ray::new(Vec3::new(1.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let hit = plane.intersect_ray(&ray).unwrap();
        assert!((hit - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn ray_plane_intersection_misses_parallel_and_behind() {
        let plane = Plane::from_point_and_normal(Vec3::ZERO, Vec3::Z);

        let parallel = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(plane.intersect_ray(&parallel).is_none());

        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(plane.intersect_ray(&behind).is_none());
    }

    #[test]
    fn camera_facing_plane_faces_the_view_direction() {
        let plane = Plane::camera_facing(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
        );
        assert!((plane.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
        assert!((plane.d - (-3.0)).abs() < 1e-6);
    }

    #[test]
    fn screen_rect_containment_is_inclusive() {
        let rect = ScreenRect::new(Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0));
        assert!(rect.contains(Vec2::new(10.0, 20.0)));
        assert!(rect.contains(Vec2::new(40.0, 60.0)));
        assert!(rect.contains(Vec2::new(25.0, 30.0)));
        assert!(!rect.contains(Vec2::new(9.9, 30.0)));
        assert!(!rect.contains(Vec2::new(25.0, 60.1)));
    }

    #[test]
    fn surface_basis_is_orthonormal() {
        for normal in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(0.3, -0.8, 0.5)] {
            let (n, t0, t1) = surface_basis(normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((t0.length() - 1.0).abs() < 1e-5);
            assert!((t1.length() - 1.0).abs() < 1e-5);
            assert!(n.dot(t0).abs() < 1e-5);
            assert!(n.dot(t1).abs() < 1e-5);
            assert!(t0.dot(t1).abs() < 1e-5);
        }
    }
}
