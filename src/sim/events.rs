//! Domain events and their synchronous dispatch
//!
//! The bus is a fixed table from event kind to an ordered list of
//! subscribers, wired once at startup. `notify` delivers an event, plus
//! anything the subscribers emit in response, before it returns.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::state::Mode;
use crate::config::RestorationRule;
use crate::highscores::ScoreRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A session began; carries the mode's heart restoration rule, if any
    SessionStart {
        mode: Mode,
        restoration: Option<RestorationRule>,
    },
    /// A projectile hit the player
    Hit { damage: u32 },
    /// A projectile left the world without hitting the player
    Dodge,
    /// A restoration milestone was crossed; the receiver grants one heart
    HeartRestored { dodges: u32 },
    /// Hearts ran out
    SessionEnd { record: ScoreRecord },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    SessionStart,
    Hit,
    Dodge,
    HeartRestored,
    SessionEnd,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::SessionStart { .. } => EventKind::SessionStart,
            GameEvent::Hit { .. } => EventKind::Hit,
            GameEvent::Dodge => EventKind::Dodge,
            GameEvent::HeartRestored { .. } => EventKind::HeartRestored,
            GameEvent::SessionEnd { .. } => EventKind::SessionEnd,
        }
    }
}

/// Receives events from the bus
pub trait Subscriber {
    /// Handle one event, pushing any follow-up events onto `emit`
    fn handle(&mut self, event: &GameEvent, emit: &mut Vec<GameEvent>);
}

/// Subscriber handles known to the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriberId {
    ScoreKeeper,
    StatsTracker,
}

/// Counts dodges and hands out nightmare heart restorations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreKeeper {
    dodges: u32,
    rule: Option<RestorationRule>,
    /// Dodge count that grants the next heart
    next_restore_at: Option<u32>,
    restored: u32,
}

impl ScoreKeeper {
    pub fn dodges(&self) -> u32 {
        self.dodges
    }

    pub fn next_restore_at(&self) -> Option<u32> {
        self.next_restore_at
    }

    pub fn hearts_restored(&self) -> u32 {
        self.restored
    }
}

impl Subscriber for ScoreKeeper {
    fn handle(&mut self, event: &GameEvent, emit: &mut Vec<GameEvent>) {
        match event {
            GameEvent::SessionStart { restoration, .. } => {
                *self = ScoreKeeper {
                    rule: *restoration,
                    next_restore_at: restoration.map(|rule| rule.first),
                    ..ScoreKeeper::default()
                };
            }
            GameEvent::Dodge => {
                self.dodges += 1;
                let Some(rule) = self.rule else {
                    return;
                };
                while let Some(threshold) = self.next_restore_at {
                    if self.dodges < threshold {
                        break;
                    }
                    self.restored += 1;
                    self.next_restore_at = threshold.checked_add(rule.step);
                    emit.push(GameEvent::HeartRestored {
                        dodges: self.dodges,
                    });
                }
            }
            _ => {}
        }
    }
}

/// Aggregate counters for display; gameplay never reads these
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsTracker {
    pub total_hits: u64,
    pub total_dodges: u64,
    pub total_hearts_restored: u64,
    pub sessions_played: u64,
    pub session_hits: u32,
    pub session_dodges: u32,
    pub session_hearts_restored: u32,
    /// Longest survival time seen, in seconds
    pub best_survival: f32,
}

impl Subscriber for StatsTracker {
    fn handle(&mut self, event: &GameEvent, _emit: &mut Vec<GameEvent>) {
        match event {
            GameEvent::SessionStart { .. } => {
                self.session_hits = 0;
                self.session_dodges = 0;
                self.session_hearts_restored = 0;
            }
            GameEvent::Hit { .. } => {
                self.total_hits += 1;
                self.session_hits += 1;
            }
            GameEvent::Dodge => {
                self.total_dodges += 1;
                self.session_dodges += 1;
            }
            GameEvent::HeartRestored { .. } => {
                self.total_hearts_restored += 1;
                self.session_hearts_restored += 1;
            }
            GameEvent::SessionEnd { record } => {
                self.sessions_played += 1;
                self.best_survival = self.best_survival.max(record.survival_time);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    routes: BTreeMap<EventKind, Vec<SubscriberId>>,
    score: ScoreKeeper,
    stats: StatsTracker,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Bus with the standard wiring: the score keeper tracks dodges and
    /// session starts, the stats tracker sees everything.
    pub fn new() -> Self {
        let mut bus = Self::unwired();
        bus.subscribe(EventKind::SessionStart, SubscriberId::ScoreKeeper);
        bus.subscribe(EventKind::Dodge, SubscriberId::ScoreKeeper);
        for kind in [
            EventKind::SessionStart,
            EventKind::Hit,
            EventKind::Dodge,
            EventKind::HeartRestored,
            EventKind::SessionEnd,
        ] {
            bus.subscribe(kind, SubscriberId::StatsTracker);
        }
        bus
    }

    /// Bus with no routes
    pub fn unwired() -> Self {
        Self {
            routes: BTreeMap::new(),
            score: ScoreKeeper::default(),
            stats: StatsTracker::default(),
        }
    }

    /// Append `subscriber` to the delivery list for `kind`
    pub fn subscribe(&mut self, kind: EventKind, subscriber: SubscriberId) {
        let list = self.routes.entry(kind).or_default();
        if !list.contains(&subscriber) {
            list.push(subscriber);
        }
    }

    pub fn subscribers(&self, kind: EventKind) -> &[SubscriberId] {
        self.routes.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn score(&self) -> &ScoreKeeper {
        &self.score
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Deliver `event` to its subscribers in registration order, then deliver
    /// whatever they emitted the same way. Returns the emitted follow-ups.
    pub fn notify(&mut self, event: GameEvent) -> Vec<GameEvent> {
        let Self {
            routes,
            score,
            stats,
        } = self;

        let mut follow_ups = Vec::new();
        let mut queue = VecDeque::from([event]);
        let mut emitted = Vec::new();

        while let Some(event) = queue.pop_front() {
            let Some(subscribers) = routes.get(&event.kind()) else {
                continue;
            };
            for id in subscribers {
                let subscriber = match id {
                    SubscriberId::ScoreKeeper => &mut *score as &mut dyn Subscriber,
                    SubscriberId::StatsTracker => &mut *stats as &mut dyn Subscriber,
                };
                subscriber.handle(&event, &mut emitted);
            }
            for follow_up in emitted.drain(..) {
                follow_ups.push(follow_up.clone());
                queue.push_back(follow_up);
            }
        }

        follow_ups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NIGHTMARE_RULE: RestorationRule = RestorationRule {
        first: 75,
        step: 150,
    };

    fn start(bus: &mut EventBus, mode: Mode) {
        let restoration = match mode {
            Mode::Normal => None,
            Mode::Nightmare => Some(NIGHTMARE_RULE),
        };
        bus.notify(GameEvent::SessionStart { mode, restoration });
    }

    fn dodge(bus: &mut EventBus, count: u32) -> u32 {
        let mut restored = 0;
        for _ in 0..count {
            restored += bus.notify(GameEvent::Dodge).len() as u32;
        }
        restored
    }

    #[test]
    fn test_restoration_thresholds() {
        let mut bus = EventBus::new();
        start(&mut bus, Mode::Nightmare);

        assert_eq!(dodge(&mut bus, 74), 0);
        assert_eq!(bus.score().next_restore_at(), Some(75));
        assert_eq!(dodge(&mut bus, 1), 1);
        assert_eq!(bus.score().next_restore_at(), Some(225));
        assert_eq!(dodge(&mut bus, 149), 0);
        assert_eq!(dodge(&mut bus, 1), 1);
        assert_eq!(bus.score().next_restore_at(), Some(375));
        assert_eq!(bus.stats().session_hearts_restored, 2);
    }

    #[test]
    fn test_normal_mode_never_restores() {
        let mut bus = EventBus::new();
        start(&mut bus, Mode::Normal);
        assert_eq!(dodge(&mut bus, 1000), 0);
        assert_eq!(bus.score().dodges(), 1000);
        assert_eq!(bus.score().next_restore_at(), None);
    }

    #[test]
    fn test_session_start_resets_score_but_not_totals() {
        let mut bus = EventBus::new();
        start(&mut bus, Mode::Nightmare);
        dodge(&mut bus, 80);
        bus.notify(GameEvent::Hit { damage: 1 });
        bus.notify(GameEvent::SessionEnd {
            record: ScoreRecord::new(Mode::Nightmare, 12.5, 80),
        });

        start(&mut bus, Mode::Nightmare);
        assert_eq!(bus.score().dodges(), 0);
        assert_eq!(bus.score().hearts_restored(), 0);
        assert_eq!(bus.score().next_restore_at(), Some(75));

        let stats = bus.stats();
        assert_eq!(stats.total_dodges, 80);
        assert_eq!(stats.total_hits, 1);
        assert_eq!(stats.total_hearts_restored, 1);
        assert_eq!(stats.sessions_played, 1);
        assert_eq!(stats.session_dodges, 0);
        assert_eq!(stats.best_survival, 12.5);
    }

    #[test]
    fn test_subscribe_keeps_order_without_duplicates() {
        let mut bus = EventBus::unwired();
        bus.subscribe(EventKind::Dodge, SubscriberId::StatsTracker);
        bus.subscribe(EventKind::Dodge, SubscriberId::ScoreKeeper);
        bus.subscribe(EventKind::Dodge, SubscriberId::StatsTracker);
        assert_eq!(
            bus.subscribers(EventKind::Dodge),
            &[SubscriberId::StatsTracker, SubscriberId::ScoreKeeper]
        );
        assert!(bus.subscribers(EventKind::Hit).is_empty());
    }

    #[test]
    fn test_follow_ups_reach_stats() {
        let mut bus = EventBus::new();
        start(&mut bus, Mode::Nightmare);
        dodge(&mut bus, 74);
        let follow_ups = bus.notify(GameEvent::Dodge);
        assert_eq!(follow_ups, vec![GameEvent::HeartRestored { dodges: 75 }]);
        assert_eq!(bus.stats().total_hearts_restored, 1);
    }

    #[test]
    fn test_unrouted_events_are_dropped() {
        let mut bus = EventBus::unwired();
        assert!(bus.notify(GameEvent::Dodge).is_empty());
        assert_eq!(bus.score().dodges(), 0);
    }

    proptest! {
        #[test]
        fn prop_restorations_match_thresholds(bursts in prop::collection::vec(0u32..60, 0..40)) {
            let mut bus = EventBus::new();
            start(&mut bus, Mode::Nightmare);

            let mut total = 0;
            let mut restored = 0;
            for burst in bursts {
                total += burst;
                restored += dodge(&mut bus, burst);
            }

            let expected = if total < 75 {
                0
            } else {
                1 + (total - 75) / 150
            };
            prop_assert_eq!(restored, expected);
            prop_assert_eq!(bus.score().hearts_restored(), expected);
            prop_assert_eq!(bus.stats().session_hearts_restored, expected);
        }
    }
}
