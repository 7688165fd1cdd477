//! Reusable scoring terms
//!
//! Behaviors combine these additively or multiplicatively; the search only
//! cares that higher is better.

use crate::util::vec2::Vec2;

/// Sum of Gaussian penalties for opponents near `point`
pub fn opponent_proximity_penalty(point: Vec2, opponents: &[Vec2], sigma: f64) -> f64 {
    if sigma <= f64::EPSILON {
        return 0.0;
    }
    let denom = 2.0 * sigma * sigma;
    opponents
        .iter()
        .map(|o| (-point.distance_sq_to(*o) / denom).exp())
        .sum()
}

/// Negative distance to a goal, scaled
#[inline]
pub fn goal_distance_term(point: Vec2, goal: Vec2, weight: f64) -> f64 {
    -weight * point.distance_to(goal)
}

/// Number of players within `radius` of `point`
pub fn congestion(point: Vec2, players: &[Vec2], radius: f64) -> usize {
    let r2 = radius * radius;
    players.iter().filter(|p| point.distance_sq_to(**p) < r2).count()
}

/// Saturating bonus for arriving `margin` cycles before a rival
///
/// 0 at an even race, approaching 1 as the margin grows, negative when late.
pub fn race_margin_bonus(self_cycles: u32, rival_cycles: u32, rate: f64) -> f64 {
    let margin = rival_cycles as f64 - self_cycles as f64;
    1.0 - (-rate * margin).exp()
}

/// Smallest distance from `point` to any of `others`, infinity when empty
pub fn nearest_distance(point: Vec2, others: &[Vec2]) -> f64 {
    others
        .iter()
        .map(|o| point.distance_to(*o))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proximity_penalty() {
        let p = Vec2::ZERO;
        assert_eq!(opponent_proximity_penalty(p, &[], 2.0), 0.0);
        assert!((opponent_proximity_penalty(p, &[Vec2::ZERO], 2.0) - 1.0).abs() < 1e-12);
        let near = opponent_proximity_penalty(p, &[Vec2::new(1.0, 0.0)], 2.0);
        let far = opponent_proximity_penalty(p, &[Vec2::new(5.0, 0.0)], 2.0);
        assert!(near > far);
    }

    #[test]
    fn test_goal_distance_term() {
        let goal = Vec2::new(52.5, 0.0);
        assert!(goal_distance_term(Vec2::new(40.0, 0.0), goal, 1.0) > goal_distance_term(Vec2::ZERO, goal, 1.0));
    }

    #[test]
    fn test_congestion() {
        let players = [Vec2::new(1.0, 0.0), Vec2::new(0.0, 2.5), Vec2::new(10.0, 0.0)];
        assert_eq!(congestion(Vec2::ZERO, &players, 3.0), 2);
    }

    #[test]
    fn test_race_margin_bonus() {
        assert_eq!(race_margin_bonus(5, 5, 0.5), 0.0);
        assert!(race_margin_bonus(3, 8, 0.5) > race_margin_bonus(3, 5, 0.5));
        assert!(race_margin_bonus(8, 3, 0.5) < 0.0);
    }

    #[test]
    fn test_nearest_distance() {
        assert!(nearest_distance(Vec2::ZERO, &[]).is_infinite());
        assert_eq!(nearest_distance(Vec2::ZERO, &[Vec2::new(3.0, 4.0), Vec2::new(6.0, 8.0)]), 5.0);
    }
}
