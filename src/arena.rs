//! Arena layout - procedural obstacle placement.
//!
//! Obstacles are axis-aligned rectangles scattered once per world. Any
//! rectangle whose center lands near a squad spawn point is discarded so
//! nobody starts the mission inside a wall.

use crate::config::SimConfig;
use crate::math::Rect;
use crate::registry::{ArenaRng, Obstacles, Viewport};
use glam::Vec2;
use rand::Rng;

/// Scatter `config.obstacle_count` rectangles over the viewport, then drop
/// every one whose center is within `config.obstacle_clear_radius` of any
/// point in `clear_points`.
pub fn generate_obstacles(
    rng: &mut ArenaRng,
    viewport: &Viewport,
    config: &SimConfig,
    clear_points: &[Vec2],
) -> Obstacles {
    let span_x = (viewport.width - config.obstacle_edge_margin).max(0.0);
    let span_y = (viewport.height - config.obstacle_edge_margin).max(0.0);

    let mut rects = Vec::with_capacity(config.obstacle_count as usize);
    for _ in 0..config.obstacle_count {
        let x = rng.0.random::<f32>() * span_x;
        let y = rng.0.random::<f32>() * span_y;
        let width = config.obstacle_min_size + rng.0.random::<f32>() * config.obstacle_max_extra;
        let height = config.obstacle_min_size + rng.0.random::<f32>() * config.obstacle_max_extra;
        rects.push(Rect::new(x, y, width, height));
    }

    rects.retain(|rect| {
        clear_points
            .iter()
            .all(|p| rect.center().distance(*p) > config.obstacle_clear_radius)
    });

    Obstacles(rects)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obstacles_stay_clear_of_spawns() {
        let config = SimConfig::default();
        let viewport = Viewport::new(1280.0, 720.0);
        let center = viewport.center();
        let spawns = [center, center + Vec2::new(-50.0, -50.0), center + Vec2::new(50.0, -50.0)];

        for seed in 0..50 {
            let mut rng = ArenaRng::from_seed(seed);
            let obstacles = generate_obstacles(&mut rng, &viewport, &config, &spawns);
            assert!(obstacles.0.len() <= 8);
            for rect in &obstacles.0 {
                for p in &spawns {
                    assert!(rect.center().distance(*p) > 200.0);
                }
                assert!(rect.x >= 0.0 && rect.x <= 1180.0);
                assert!(rect.width >= 60.0 && rect.width < 180.0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = SimConfig::default();
        let viewport = Viewport::new(1280.0, 720.0);
        let a = generate_obstacles(&mut ArenaRng::from_seed(11), &viewport, &config, &[]);
        let b = generate_obstacles(&mut ArenaRng::from_seed(11), &viewport, &config, &[]);
        assert_eq!(a.0, b.0);
        assert_eq!(a.0.len(), 8);
    }

    #[test]
    fn test_tiny_viewport_does_not_panic() {
        let config = SimConfig::default();
        let viewport = Viewport::new(50.0, 50.0);
        let obstacles = generate_obstacles(&mut ArenaRng::from_seed(1), &viewport, &config, &[]);
        assert!(obstacles.0.iter().all(|r| r.x == 0.0 && r.y == 0.0));
    }
}
