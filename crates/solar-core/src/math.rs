//! 2D vector helpers
//!
//! Positions, velocities and targets are `glam::DVec2`. The helpers here
//! cover the few steering operations the movement and AI systems share.

pub use glam::DVec2 as Vec2;

/// Clamp a velocity so its magnitude never exceeds `max_speed`
pub fn clamp_speed(velocity: Vec2, max_speed: f64) -> Vec2 {
    if max_speed <= 0.0 {
        return Vec2::ZERO;
    }
    velocity.clamp_length_max(max_speed)
}

/// Move `from` toward `to` by at most `max_step`, never overshooting
///
/// Returns the new position and whether the target was reached.
pub fn move_towards(from: Vec2, to: Vec2, max_step: f64) -> (Vec2, bool) {
    let delta = to - from;
    let distance = delta.length();
    if distance <= max_step || distance == 0.0 {
        (to, true)
    } else {
        (from + delta / distance * max_step, false)
    }
}

/// Unit vector for a heading in radians
pub fn heading(angle: f64) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Mean of a set of points, or `None` when the set is empty
pub fn centroid(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
    Some(sum / points.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_speed() {
        let v = clamp_speed(Vec2::new(30.0, 40.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-9);
        assert_eq!(clamp_speed(Vec2::new(3.0, 4.0), 10.0), Vec2::new(3.0, 4.0));
        assert_eq!(clamp_speed(Vec2::new(3.0, 4.0), 0.0), Vec2::ZERO);
    }

    #[test]
    fn test_move_towards() {
        let (p, arrived) = move_towards(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0);
        assert_eq!(p, Vec2::new(4.0, 0.0));
        assert!(!arrived);

        let (p, arrived) = move_towards(Vec2::ZERO, Vec2::new(3.0, 0.0), 4.0);
        assert_eq!(p, Vec2::new(3.0, 0.0));
        assert!(arrived);
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&[]), None);
        let c = centroid(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 20.0)]);
        assert_eq!(c, Some(Vec2::new(5.0, 10.0)));
    }
}
