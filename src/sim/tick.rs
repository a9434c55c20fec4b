//! Per-tick session advance
//!
//! Clock, then spawning, then movement and bounds, then collisions. The
//! caller turns the outcome into events.

use glam::Vec2;

use super::state::Session;
use super::world::CollisionEvent;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Desired movement direction, at most unit length
    pub movement: Vec2,
}

/// What happened to the world during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Delta actually applied after clamping
    pub dt: f32,
    pub spawned: u32,
    pub dodged: u32,
    pub hits: Vec<CollisionEvent>,
}

/// Advance the session by one frame
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) -> TickOutcome {
    let dt = session.clock.advance(dt);
    let elapsed = session.clock.elapsed;

    let mut orders = Vec::new();
    session.scheduler.update(
        dt,
        elapsed,
        &session.config.difficulty,
        &session.config.spawn,
        &session.config.world,
        session.world.player.pos,
        &mut session.rng,
        &mut orders,
    );
    let spawned = orders.len() as u32;
    for order in orders {
        session.world.spawn(order);
    }

    let dodged = session.world.advance(dt, input.movement);
    let hits = session.world.detect_collisions();

    TickOutcome {
        dt,
        spawned,
        dodged,
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SessionConfig};
    use crate::consts::SIM_DT;
    use crate::sim::Mode;

    fn session(seed: u64) -> Session {
        let cfg = SessionConfig::resolve(&Config::defaults(), Mode::Nightmare).unwrap();
        Session::new(cfg, seed)
    }

    #[test]
    fn test_tick_advances_clock_and_spawns() {
        let mut session = session(5);
        let mut spawned = 0;
        for _ in 0..70 {
            spawned += tick(&mut session, &TickInput::default(), SIM_DT).spawned;
        }
        assert_eq!(session.clock.ticks, 70);
        assert!((session.elapsed() - 70.0 / 60.0).abs() < 1e-4);
        // 0.5s nightmare interval, nothing has reached the player or left yet
        assert_eq!(spawned, 2);
        assert_eq!(
            session.world.projectiles.len() + session.world.telegraphs.len(),
            2
        );
    }

    #[test]
    fn test_determinism() {
        // Two sessions with same seed should produce identical results
        let mut a = session(99999);
        let mut b = session(99999);
        let inputs = [
            TickInput { movement: Vec2::new(1.0, 0.0) },
            TickInput { movement: Vec2::new(0.0, -1.0) },
            TickInput::default(),
        ];

        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            let outcome_a = tick(&mut a, input, SIM_DT);
            let outcome_b = tick(&mut b, input, SIM_DT);
            assert_eq!(outcome_a, outcome_b);
        }
        assert_eq!(a.world.player, b.world.player);
        assert_eq!(a.world.projectiles, b.world.projectiles);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = session(1);
        let mut b = session(2);
        for _ in 0..120 {
            tick(&mut a, &TickInput::default(), SIM_DT);
            tick(&mut b, &TickInput::default(), SIM_DT);
        }
        let positions = |s: &Session| {
            let mut all: Vec<Vec2> = s.world.projectiles.iter().map(|p| p.pos).collect();
            all.extend(s.world.telegraphs.iter().map(|t| t.projectile.pos));
            all
        };
        assert_ne!(positions(&a), positions(&b));
    }
}
