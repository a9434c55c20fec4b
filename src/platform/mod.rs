//! Platform abstraction layer
//!
//! The seams a host fills in around the simulation:
//! - Input: one movement vector and one set of action flags per frame
//! - Rendering: read-only frame views, never mutating the core

use std::collections::VecDeque;

use glam::Vec2;

use crate::sim::FrameView;

/// One-shot actions for a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionFlags {
    /// Start a new run in the same mode (game over screen)
    pub restart: bool,
    /// Leave the current screen for the menu; abandons a running session
    pub pause_to_menu: bool,
}

/// Source of player input, polled once per frame
pub trait InputProvider {
    /// Called with the current frame before polling
    fn observe(&mut self, _view: &FrameView<'_>) {}

    /// Movement direction, at most unit length
    fn movement_vector(&mut self) -> Vec2;

    fn action_flags(&mut self) -> ActionFlags;
}

/// Consumer of frame views
pub trait Renderer {
    fn render(&mut self, view: &FrameView<'_>);
}

/// Replays a fixed list of frames, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<(Vec2, ActionFlags)>,
    current: (Vec2, ActionFlags),
}

impl ScriptedInput {
    pub fn new(frames: Vec<(Vec2, ActionFlags)>) -> Self {
        Self {
            frames: frames.into(),
            current: (Vec2::ZERO, ActionFlags::default()),
        }
    }

    /// Frames not yet replayed
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputProvider for ScriptedInput {
    fn observe(&mut self, _view: &FrameView<'_>) {
        self.current = self.frames.pop_front().unwrap_or_default();
    }

    fn movement_vector(&mut self) -> Vec2 {
        self.current.0
    }

    fn action_flags(&mut self) -> ActionFlags {
        self.current.1
    }
}

/// Computer player: sidesteps nearby projectiles and drifts back to the
/// middle when nothing is close.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Projectiles closer than this (px, centre to centre) are avoided
    pub danger_radius: f32,
    /// Restart automatically after game over
    pub auto_restart: bool,
    movement: Vec2,
    restart: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            danger_radius: 160.0,
            auto_restart: false,
            movement: Vec2::ZERO,
            restart: false,
        }
    }
}

impl InputProvider for Autopilot {
    fn observe(&mut self, view: &FrameView<'_>) {
        self.restart = self.auto_restart && view.session.is_none() && view.last_record.is_some();

        let Some(session) = &view.session else {
            self.movement = Vec2::ZERO;
            return;
        };

        let player = session.player_pos;
        let mut push = Vec2::ZERO;
        let threats = session
            .projectiles
            .iter()
            .map(|p| (p.pos, p.size))
            .chain(session.telegraphs.iter().map(|t| (t.pos, t.size)));
        for (pos, size) in threats {
            let away = player - pos;
            let distance = (away.length() - size / 2.0).max(1.0);
            if distance < self.danger_radius {
                // Closer threats push harder
                push += away.normalize_or_zero() * (1.0 - distance / self.danger_radius);
            }
        }

        if push == Vec2::ZERO {
            let to_centre = session.arena / 2.0 - player;
            if to_centre.length() > 20.0 {
                push = to_centre.normalize() * 0.5;
            }
        }

        self.movement = push.clamp_length_max(1.0);
    }

    fn movement_vector(&mut self) -> Vec2 {
        self.movement
    }

    fn action_flags(&mut self) -> ActionFlags {
        ActionFlags {
            restart: self.restart,
            pause_to_menu: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::highscores::MemoryLeaderboard;
    use crate::sim::{GameStateMachine, Mode, Phase, SizeClass};

    #[test]
    fn test_scripted_input_idles_when_exhausted() {
        let config = Config::defaults();
        let machine = GameStateMachine::new(&config, MemoryLeaderboard::new(), 0);
        let mut input = ScriptedInput::new(vec![(Vec2::X, ActionFlags::default())]);

        input.observe(&machine.view());
        assert_eq!(input.movement_vector(), Vec2::X);
        assert_eq!(input.remaining(), 0);

        input.observe(&machine.view());
        assert_eq!(input.movement_vector(), Vec2::ZERO);
        assert_eq!(input.action_flags(), ActionFlags::default());
    }

    #[test]
    fn test_autopilot_moves_away_from_threat() {
        let config = Config::defaults().with("normal.spawn_interval", 1.0e6);
        let mut machine = GameStateMachine::new(&config, MemoryLeaderboard::new(), 0);
        machine.start(Mode::Normal).unwrap();

        let session = machine.session_mut().unwrap();
        let threat = session.world.player.pos + Vec2::new(60.0, 0.0);
        session
            .world
            .add_projectile(SizeClass::Small, threat, Vec2::new(-100.0, 0.0), 24.0);

        let mut pilot = Autopilot::default();
        pilot.observe(&machine.view());
        let movement = pilot.movement_vector();
        assert!(movement.x < 0.0);
        assert!(movement.length() <= 1.0 + 1e-6);
    }

    #[test]
    fn test_autopilot_restarts_after_game_over() {
        let config = Config::defaults().with("normal.spawn_interval", 1.0e6);
        let mut machine = GameStateMachine::new(&config, MemoryLeaderboard::new(), 0);
        machine.start(Mode::Normal).unwrap();
        let session = machine.session_mut().unwrap();
        let pos = session.world.player.pos;
        for _ in 0..3 {
            session.world.add_projectile(SizeClass::Large, pos, Vec2::ZERO, 48.0);
        }

        let mut pilot = Autopilot {
            auto_restart: true,
            ..Autopilot::default()
        };
        machine.frame(&mut pilot, 0.1).unwrap();
        assert_eq!(machine.phase(), Phase::GameOver);

        machine.frame(&mut pilot, 0.1).unwrap();
        assert_eq!(machine.phase(), Phase::Playing);
    }
}
