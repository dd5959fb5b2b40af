//! Gravity vector field
//!
//! Pure functions: net pull on a point from a set of source bodies. The force
//! law is deliberately steeper than inverse-square (magnitude ~ 1/d^2.4),
//! which keeps close passes from flinging bodies off the field.

use glam::DVec2;

use super::body::{Body, BodyId, Category, Reach};
use super::registry::Registry;
use crate::consts::{FORCE_EXPONENT, VERTICAL_EPSILON};

/// Force exerted on a sink with coupling `g` at `target` by one source
///
/// Returns `None` when the source sits exactly on the target.
#[inline]
pub fn pair_force(g: f64, source_mass: f64, source_pos: DVec2, target: DVec2) -> Option<DVec2> {
    let disp = source_pos - target;
    let squared_distance = disp.length_squared();
    if squared_distance == 0.0 {
        return None;
    }
    let magnitude = g * source_mass / squared_distance.powf(FORCE_EXPONENT);

    if disp.x.abs() <= VERTICAL_EPSILON {
        // Directly above/below: skip the angle and pull straight along y
        let fy = if disp.y >= 0.0 { magnitude } else { -magnitude };
        return Some(DVec2::new(0.0, fy));
    }

    let theta = (disp.y / disp.x).atan();
    let fx = magnitude * theta.cos();
    let fy = magnitude * theta.sin().abs();
    Some(DVec2::new(
        if disp.x >= 0.0 { fx } else { -fx },
        if disp.y >= 0.0 { fy } else { -fy },
    ))
}

/// Net force at `target` from `sources`
///
/// Sources farther than `reach` are ignored, as is the body `exclude` (a body
/// never pulls on itself).
pub fn field_force<'a, I>(sources: I, target: DVec2, g: f64, reach: Reach, exclude: Option<BodyId>) -> DVec2
where
    I: IntoIterator<Item = &'a Body>,
{
    let mut total = DVec2::ZERO;
    if reach == Reach::None {
        return total;
    }
    for source in sources {
        if Some(source.id) == exclude {
            continue;
        }
        if !reach.admits(source.pos.distance(target)) {
            continue;
        }
        if let Some(force) = pair_force(g, source.mass, source.pos, target) {
            total += force;
        }
    }
    total
}

/// Acceleration of `sink` if it were at `at`, given every live body in `registry`
///
/// Sums free bodies, projectiles and attractors, each with the reach its
/// category has on the sink, then divides by the sink's mass.
pub fn acceleration(sink: &Body, at: DVec2, registry: &Registry) -> DVec2 {
    const SOURCES: [SourceGroup; 3] = [SourceGroup::FreeBodies, SourceGroup::Projectiles, SourceGroup::Attractors];

    let mut force = DVec2::ZERO;
    for group in SOURCES {
        let reach = group.category().reach_on(sink.category);
        force += field_force(
            registry.live().filter(|b| group.contains(b.category)),
            at,
            sink.g,
            reach,
            Some(sink.id),
        );
    }
    force / sink.mass
}

/// Source categories in summation order
#[derive(Debug, Clone, Copy)]
enum SourceGroup {
    FreeBodies,
    Projectiles,
    Attractors,
}

impl SourceGroup {
    fn contains(&self, category: Category) -> bool {
        match self {
            SourceGroup::FreeBodies => category == Category::FreeBody,
            SourceGroup::Projectiles => category == Category::Projectile,
            SourceGroup::Attractors => matches!(category, Category::Attractor(_)),
        }
    }

    /// Representative category (reach depends only on the tag, not the attractor kind)
    fn category(&self) -> Category {
        match self {
            SourceGroup::FreeBodies => Category::FreeBody,
            SourceGroup::Projectiles => Category::Projectile,
            SourceGroup::Attractors => Category::Attractor(super::body::AttractorKind::Sun),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::AttractorKind;

    fn body(id: BodyId, category: Category, x: f64, y: f64, radius: f64) -> Body {
        Body::new(id, category, DVec2::new(x, y), DVec2::ZERO, radius)
    }

    #[test]
    fn test_pair_force_magnitude() {
        let f = pair_force(100.0, 2.0, DVec2::new(10.0, 0.0), DVec2::ZERO).unwrap();
        let expected = 100.0 * 2.0 / 100f64.powf(1.2);
        assert!((f.x - expected).abs() < 1e-12);
        assert!(f.y.abs() < 1e-12);
    }

    #[test]
    fn test_pair_force_points_at_source_in_every_quadrant() {
        for (sx, sy) in [(5.0, 7.0), (-5.0, 7.0), (-5.0, -7.0), (5.0, -7.0)] {
            let f = pair_force(1.0, 1.0, DVec2::new(sx, sy), DVec2::ZERO).unwrap();
            let dir = DVec2::new(sx, sy).normalize();
            assert!((f.normalize() - dir).length() < 1e-9, "quadrant ({sx}, {sy})");
        }
    }

    #[test]
    fn test_pair_force_vertical_branch() {
        let up = pair_force(1.0, 1.0, DVec2::new(0.005, -10.0), DVec2::ZERO).unwrap();
        assert_eq!(up.x, 0.0);
        assert!(up.y < 0.0);

        let down = pair_force(1.0, 1.0, DVec2::new(0.0, 10.0), DVec2::ZERO).unwrap();
        assert_eq!(down.x, 0.0);
        assert!(down.y > 0.0);
    }

    #[test]
    fn test_pair_force_coincident_is_skipped() {
        assert!(pair_force(1.0, 1.0, DVec2::ONE, DVec2::ONE).is_none());
    }

    #[test]
    fn test_field_force_reach_and_self_exclusion() {
        let near = body(1, Category::FreeBody, 50.0, 0.0, 8.0);
        let far = body(2, Category::FreeBody, 200.0, 0.0, 8.0);
        let sources = [near.clone(), far.clone()];

        let limited = field_force(&sources, DVec2::ZERO, 100.0, Reach::Within(80.0), None);
        let only_near = field_force([&near], DVec2::ZERO, 100.0, Reach::Unlimited, None);
        assert_eq!(limited, only_near);

        let excluded = field_force(&sources, DVec2::ZERO, 100.0, Reach::Unlimited, Some(1));
        let only_far = field_force([&far], DVec2::ZERO, 100.0, Reach::Unlimited, None);
        assert_eq!(excluded, only_far);

        assert_eq!(field_force(&sources, DVec2::ZERO, 100.0, Reach::None, None), DVec2::ZERO);
    }

    #[test]
    fn test_projectile_feels_distant_sun() {
        let mut registry = Registry::new();
        let sun = registry.spawn(Category::Attractor(AttractorKind::Sun), DVec2::new(900.0, 360.0), DVec2::ZERO, 15.0);
        let rock = registry.spawn(Category::FreeBody, DVec2::new(100.0, 360.0), DVec2::ZERO, 8.0);
        let rocket = registry.spawn(Category::Projectile, DVec2::new(100.0, 360.0), DVec2::ZERO, 3.0);
        // Keep the rock and rocket from pulling on each other
        registry.mark(rock);

        let rock_accel = acceleration(registry.get(rock).unwrap(), DVec2::new(100.0, 360.0), &registry);
        let rocket_body = registry.get(rocket).unwrap();
        let rocket_accel = acceleration(rocket_body, rocket_body.pos, &registry);

        assert_eq!(rock_accel, DVec2::ZERO);
        assert!(rocket_accel.x > 0.0);
        assert!(registry.get(sun).is_some());
    }

    #[test]
    fn test_acceleration_scales_with_inverse_mass() {
        let mut registry = Registry::new();
        registry.spawn(Category::Attractor(AttractorKind::Sun), DVec2::new(200.0, 100.0), DVec2::ZERO, 15.0);
        let small = registry.spawn(Category::FreeBody, DVec2::new(100.0, 100.0), DVec2::ZERO, 4.0);
        let big = registry.spawn(Category::FreeBody, DVec2::new(100.0, 500.0), DVec2::ZERO, 16.0);

        let at = DVec2::new(100.0, 100.0);
        let a_small = acceleration(registry.get(small).unwrap(), at, &registry);
        let a_big = acceleration(registry.get(big).unwrap(), at, &registry);
        // mass = sqrt(r): 2 vs 4; the two free bodies are out of each other's reach
        assert!((a_small.x / a_big.x - 2.0).abs() < 1e-9);
    }
}
