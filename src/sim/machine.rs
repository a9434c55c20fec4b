//! Game state machine
//!
//! `Menu -> Playing -> {GameOver | HallOfFame} -> Menu`, restartable forever.
//! Owns the active session and the event bus, and is the only place that
//! talks to the leaderboard store.

use glam::Vec2;
use serde::Serialize;

use super::events::{EventBus, GameEvent, ScoreKeeper, StatsTracker};
use super::state::{Mode, Phase, Session, SizeClass};
use super::tick::{TickInput, tick};
use crate::config::{Config, SessionConfig};
use crate::error::{GameError, StoreError};
use crate::highscores::{LeaderboardStore, ScoreRecord};
use crate::platform::InputProvider;

/// Seed spacing between consecutive sessions started without an explicit seed
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Result of one `tick`
#[derive(Debug, Default)]
pub struct TickSummary {
    /// Delta applied after clamping
    pub dt: f32,
    pub spawned: u32,
    pub dodges: u32,
    pub hits: u32,
    pub damage_taken: u32,
    pub hearts_restored: u32,
    /// Set on the tick the session ended
    pub ended: Option<ScoreRecord>,
    /// The final record could not be saved; the run still ended normally
    pub save_error: Option<StoreError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub class: SizeClass,
    pub pos: Vec2,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelegraphView {
    pub class: SizeClass,
    pub pos: Vec2,
    pub size: f32,
    /// Seconds until the projectile enters
    pub remaining: f32,
}

/// Read-only picture of the running session for renderers and input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub seed: u64,
    pub elapsed: f32,
    /// Play area size
    pub arena: Vec2,
    pub player_pos: Vec2,
    pub player_size: f32,
    pub player_hitbox: f32,
    pub hearts: u32,
    pub max_hearts: u32,
    pub dodges: u32,
    /// Dodge count that restores the next heart (nightmare only)
    pub next_heart_at: Option<u32>,
    pub hearts_restored: u32,
    pub spawn_interval: f32,
    pub projectiles: Vec<ProjectileView>,
    pub telegraphs: Vec<TelegraphView>,
}

impl SessionSnapshot {
    fn capture(session: &Session, score: &ScoreKeeper) -> Self {
        let world = &session.world;
        let arena = world.arena();
        Self {
            mode: session.mode(),
            seed: session.seed,
            elapsed: session.elapsed(),
            arena: Vec2::new(arena.width(), arena.height()),
            player_pos: world.player.pos,
            player_size: world.player.size,
            player_hitbox: world.player.hitbox,
            hearts: world.player.hearts,
            max_hearts: world.player.max_hearts,
            dodges: score.dodges(),
            next_heart_at: score.next_restore_at(),
            hearts_restored: score.hearts_restored(),
            spawn_interval: session.config.difficulty.spawn_interval(session.elapsed()),
            projectiles: world
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    class: p.class,
                    pos: p.pos,
                    size: p.size,
                })
                .collect(),
            telegraphs: world
                .telegraphs
                .iter()
                .map(|t| TelegraphView {
                    class: t.projectile.class,
                    pos: t.projectile.pos,
                    size: t.projectile.size,
                    remaining: t.remaining,
                })
                .collect(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView<'a> {
    pub phase: Phase,
    pub session: Option<SessionSnapshot>,
    /// Most recent finished run
    pub last_record: Option<ScoreRecord>,
    /// Hall of fame or game-over leaderboard, longest survival first
    pub board: &'a [ScoreRecord],
    pub board_mode: Mode,
    pub stats: &'a StatsTracker,
}

pub struct GameStateMachine<'cfg, L> {
    config: &'cfg Config,
    store: L,
    phase: Phase,
    /// Present exactly while `phase == Playing`
    session: Option<Session>,
    bus: EventBus,
    mode: Mode,
    last_record: Option<ScoreRecord>,
    board: Vec<ScoreRecord>,
    board_mode: Mode,
    seed: u64,
    sessions_started: u64,
}

impl<'cfg, L: LeaderboardStore> GameStateMachine<'cfg, L> {
    /// Machine in the menu. `seed` feeds sessions started without an explicit one.
    pub fn new(config: &'cfg Config, store: L, seed: u64) -> Self {
        Self {
            config,
            store,
            phase: Phase::Menu,
            session: None,
            bus: EventBus::new(),
            mode: Mode::Normal,
            last_record: None,
            board: Vec::new(),
            board_mode: Mode::Normal,
            seed,
            sessions_started: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Mode of the current or most recent session
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Direct access to the running session, for tools and tests
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn score(&self) -> &ScoreKeeper {
        self.bus.score()
    }

    pub fn stats(&self) -> &StatsTracker {
        self.bus.stats()
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn last_record(&self) -> Option<&ScoreRecord> {
        self.last_record.as_ref()
    }

    pub fn board(&self) -> &[ScoreRecord] {
        &self.board
    }

    fn invalid(&self, op: &'static str) -> GameError {
        GameError::InvalidTransition {
            op,
            phase: self.phase,
        }
    }

    /// Start a session with the next derived seed
    pub fn start(&mut self, mode: Mode) -> Result<(), GameError> {
        let seed = self
            .seed
            .wrapping_add(self.sessions_started.wrapping_mul(SEED_STRIDE));
        self.start_seeded(mode, seed)
    }

    /// Start a session from Menu or GameOver.
    ///
    /// All configuration is resolved before anything changes, so a missing
    /// option leaves the machine exactly as it was.
    pub fn start_seeded(&mut self, mode: Mode, seed: u64) -> Result<(), GameError> {
        if !matches!(self.phase, Phase::Menu | Phase::GameOver) {
            return Err(self.invalid("start"));
        }

        let config = SessionConfig::resolve(self.config, mode)?;
        let restoration = config.restoration;
        let session = Session::new(config, seed);

        log::info!(
            "Starting {} session (seed {}, {} hearts)",
            mode.as_str(),
            seed,
            session.world.player.hearts
        );

        self.session = Some(session);
        self.bus.notify(GameEvent::SessionStart { mode, restoration });
        self.mode = mode;
        self.sessions_started += 1;
        self.last_record = None;
        self.board.clear();
        self.phase = Phase::Playing;
        Ok(())
    }

    /// Advance the running session by one frame
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Result<TickSummary, GameError> {
        if self.phase != Phase::Playing {
            return Err(self.invalid("tick"));
        }
        let Some(session) = self.session.as_mut() else {
            return Err(GameError::InvalidTransition {
                op: "tick",
                phase: Phase::Playing,
            });
        };

        let outcome = tick(session, input, dt);
        let mut summary = TickSummary {
            dt: outcome.dt,
            spawned: outcome.spawned,
            ..TickSummary::default()
        };

        // Dodges first so a burst that restores hearts lands before this tick's hits
        let dodges = std::iter::repeat_n(GameEvent::Dodge, outcome.dodged as usize);
        let hits = outcome
            .hits
            .iter()
            .map(|hit| GameEvent::Hit { damage: hit.damage });

        for event in dodges.chain(hits) {
            match event {
                GameEvent::Hit { damage } => {
                    session.world.player.apply_damage(damage);
                    summary.hits += 1;
                    summary.damage_taken += damage;
                }
                GameEvent::Dodge => summary.dodges += 1,
                _ => {}
            }
            for follow_up in self.bus.notify(event) {
                if let GameEvent::HeartRestored { dodges } = follow_up {
                    session.world.player.restore_heart();
                    summary.hearts_restored += 1;
                    log::info!(
                        "Heart restored at {} dodges ({} hearts)",
                        dodges,
                        session.world.player.hearts
                    );
                }
            }
        }

        if session.world.player.is_dead() {
            let record = ScoreRecord::new(
                session.mode(),
                session.elapsed(),
                self.bus.score().dodges(),
            );
            let board_size = session.config.game_over_size;
            summary.save_error = self.finish(record, board_size);
            summary.ended = Some(record);
        }

        Ok(summary)
    }

    /// End the session: announce it, save the record, load the game-over board
    fn finish(&mut self, record: ScoreRecord, board_size: usize) -> Option<StoreError> {
        self.bus.notify(GameEvent::SessionEnd { record });
        self.session = None;
        self.phase = Phase::GameOver;
        self.last_record = Some(record);
        self.board_mode = record.mode;

        log::info!(
            "Game over: {} survived {:.2}s with {} dodges",
            record.mode.as_str(),
            record.survival_time,
            record.dodges
        );

        let save_error = match self.store.append(record.mode, record) {
            Ok(()) => None,
            Err(e) => {
                log::warn!("Could not save score, run not recorded: {}", e);
                Some(e)
            }
        };

        self.board = match self.store.load_top(record.mode, board_size) {
            Ok(board) => board,
            Err(e) => {
                log::warn!("Could not load leaderboard: {}", e);
                Vec::new()
            }
        };

        save_error
    }

    /// Drop the running session without recording it and go back to the menu
    pub fn abandon(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(self.invalid("abandon"));
        }
        if let Some(session) = self.session.take() {
            log::info!(
                "Abandoned {} session at {:.2}s",
                session.mode().as_str(),
                session.elapsed()
            );
        }
        self.phase = Phase::Menu;
        Ok(())
    }

    /// Return to the menu from any phase except Playing
    pub fn request_menu(&mut self) -> Result<(), GameError> {
        match self.phase {
            Phase::Playing => Err(self.invalid("request_menu")),
            Phase::Menu => Ok(()),
            Phase::GameOver | Phase::HallOfFame => {
                self.board.clear();
                self.phase = Phase::Menu;
                Ok(())
            }
        }
    }

    /// Load `mode`'s leaderboard and show it. Only valid from the menu.
    pub fn show_hall_of_fame(&mut self, mode: Mode) -> Result<(), GameError> {
        if self.phase != Phase::Menu {
            return Err(self.invalid("show_hall_of_fame"));
        }
        let size = self.config.count("leaderboard.size")? as usize;

        self.board = match self.store.load_top(mode, size) {
            Ok(board) => board,
            Err(e) => {
                log::warn!("Could not load {} leaderboard: {}", mode.as_str(), e);
                Vec::new()
            }
        };
        self.board_mode = mode;
        self.phase = Phase::HallOfFame;
        Ok(())
    }

    /// Snapshot of the running session
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session
            .as_ref()
            .map(|session| SessionSnapshot::capture(session, self.bus.score()))
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            phase: self.phase,
            session: self.snapshot(),
            last_record: self.last_record,
            board: &self.board,
            board_mode: self.board_mode,
            stats: self.bus.stats(),
        }
    }

    /// Poll `input` once and act on it for the current phase.
    ///
    /// Ticks while playing; handles restart and back-to-menu actions
    /// elsewhere. Mode selection from the menu goes through `start` and
    /// `show_hall_of_fame` directly.
    pub fn frame(
        &mut self,
        input: &mut impl InputProvider,
        dt: f32,
    ) -> Result<Option<TickSummary>, GameError> {
        input.observe(&self.view());
        let actions = input.action_flags();

        match self.phase {
            Phase::Playing => {
                if actions.pause_to_menu {
                    self.abandon()?;
                    return Ok(None);
                }
                let movement = input.movement_vector();
                self.tick(&TickInput { movement }, dt).map(Some)
            }
            Phase::GameOver => {
                if actions.restart {
                    self.start(self.mode)?;
                } else if actions.pause_to_menu {
                    self.request_menu()?;
                }
                Ok(None)
            }
            Phase::HallOfFame => {
                if actions.pause_to_menu {
                    self.request_menu()?;
                }
                Ok(None)
            }
            Phase::Menu => Ok(None),
        }
    }
}
