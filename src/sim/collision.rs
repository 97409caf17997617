//! Collision detection and response
//!
//! Everything in the world is a circle except cover structures, which are
//! axis-aligned boxes, and boss lasers, which are thick rays.

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Push-out direction, pointing from the obstacle toward the circle
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Boxes overlap when their interiors intersect (touching edges do not count)
#[inline]
pub fn rects_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Whether a circle touches a box
#[inline]
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Aabb) -> bool {
    let nearest = rect.clamp_point(center);
    center.distance_squared(nearest) < radius * radius
}

/// Check collision between a circle and a box.
///
/// When the centre is inside the box the normal points out of the nearest
/// side and the penetration is the distance needed to clear it.
pub fn circle_rect_collision(center: Vec2, radius: f32, rect: &Aabb) -> CollisionResult {
    let nearest = rect.clamp_point(center);
    let delta = center - nearest;

    if delta == Vec2::ZERO {
        let to_left = center.x - rect.min.x;
        let to_right = rect.max.x - center.x;
        let to_top = center.y - rect.min.y;
        let to_bottom = rect.max.y - center.y;
        let min_side = to_left.min(to_right).min(to_top).min(to_bottom);

        let (normal, depth) = if min_side == to_left {
            (Vec2::NEG_X, to_left)
        } else if min_side == to_right {
            (Vec2::X, to_right)
        } else if min_side == to_top {
            (Vec2::NEG_Y, to_top)
        } else {
            (Vec2::Y, to_bottom)
        };
        return CollisionResult {
            hit: true,
            normal,
            penetration: depth + radius,
        };
    }

    let dist = delta.length();
    if dist >= radius {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: delta / dist,
        penetration: radius - dist,
    }
}

/// Push a circle out of a box. Returns whether it was touching.
pub fn resolve_circle_rect(center: &mut Vec2, radius: f32, rect: &Aabb) -> bool {
    let result = circle_rect_collision(*center, radius, rect);
    if result.hit {
        *center += result.normal * result.penetration;
    }
    result.hit
}

/// Distance from `p` to the segment `a..b`
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq < 0.0001 {
        return p.distance(a);
    }
    let t = ((p - a).dot(line) / len_sq).clamp(0.0, 1.0);
    p.distance(a + line * t)
}

/// Whether a circle is struck by a beam of `half_width` cast from `origin`
/// along `angle` for `length` units. Only the half ahead of the origin counts.
pub fn beam_hits(
    origin: Vec2,
    angle: f32,
    length: f32,
    half_width: f32,
    target: Vec2,
    target_radius: f32,
) -> bool {
    let dir = Vec2::from_angle(angle);
    if (target - origin).dot(dir) <= 0.0 {
        return false;
    }
    point_segment_distance(target, origin, origin + dir * length) < half_width + target_radius
}

/// Push overlapping circles apart pairwise.
///
/// Each member of an overlapping pair moves `(rr - d) * strength` away from
/// the other. Coincident centres are left alone.
pub fn separate_circles(bodies: &mut [(Vec2, f32)], strength: f32) {
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (a, ar) = bodies[i];
            let (b, br) = bodies[j];
            let delta = a - b;
            let d_sq = delta.length_squared();
            let rr = ar + br;
            if d_sq > 0.0001 && d_sq < rr * rr {
                let d = d_sq.sqrt();
                let push = delta / d * ((rr - d) * strength);
                bodies[i].0 += push;
                bodies[j].0 -= push;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_box() -> Aabb {
        Aabb::from_center(Vec2::ZERO, Vec2::new(40.0, 40.0))
    }

    #[test]
    fn test_circle_rect_collision_outside_edge() {
        let result = circle_rect_collision(Vec2::new(26.0, 0.0), 10.0, &crate_box());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!((result.penetration - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_rect_collision_miss() {
        let result = circle_rect_collision(Vec2::new(31.0, 0.0), 10.0, &crate_box());
        assert!(!result.hit);
        // Corner: nearest point is (20, 20)
        let result = circle_rect_collision(Vec2::new(28.0, 28.0), 10.0, &crate_box());
        assert!(!result.hit);
    }

    #[test]
    fn test_center_inside_pushes_to_nearest_side() {
        let mut c = Vec2::new(0.0, 15.0);
        assert!(resolve_circle_rect(&mut c, 10.0, &crate_box()));
        assert_eq!(c, Vec2::new(0.0, 30.0));
        assert!(!circle_intersects_rect(c, 10.0, &crate_box()));
    }

    #[test]
    fn test_resolve_leaves_circle_touching_edge() {
        let mut c = Vec2::new(-25.0, 5.0);
        assert!(resolve_circle_rect(&mut c, 8.0, &crate_box()));
        assert!((c.x - (-28.0)).abs() < 1e-5);
        assert_eq!(c.y, 5.0);
    }

    #[test]
    fn test_rects_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center(Vec2::new(9.0, 0.0), Vec2::splat(10.0));
        let c = Aabb::from_center(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(rects_overlap(&a, &b));
        assert!(!rects_overlap(&a, &c));
    }

    #[test]
    fn test_beam_only_hits_ahead() {
        let origin = Vec2::ZERO;
        assert!(beam_hits(origin, 0.0, 2000.0, 20.0, Vec2::new(300.0, 25.0), 14.0));
        assert!(!beam_hits(origin, 0.0, 2000.0, 20.0, Vec2::new(-300.0, 0.0), 14.0));
        assert!(!beam_hits(origin, 0.0, 2000.0, 20.0, Vec2::new(300.0, 40.0), 14.0));
    }

    #[test]
    fn test_point_segment_distance_degenerate() {
        let d = point_segment_distance(Vec2::new(3.0, 4.0), Vec2::ZERO, Vec2::ZERO);
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_separate_circles_pushes_apart() {
        let mut bodies = vec![(Vec2::ZERO, 10.0), (Vec2::new(10.0, 0.0), 10.0)];
        separate_circles(&mut bodies, 0.52);
        assert!((bodies[0].0.x - (-5.2)).abs() < 1e-4);
        assert!((bodies[1].0.x - 15.2).abs() < 1e-4);
    }

    #[test]
    fn test_separate_circles_ignores_coincident() {
        let mut bodies = vec![(Vec2::ONE, 10.0), (Vec2::ONE, 10.0)];
        separate_circles(&mut bodies, 0.52);
        assert_eq!(bodies[0].0, Vec2::ONE);
        assert!(bodies.iter().all(|(p, _)| p.is_finite()));
    }
}
