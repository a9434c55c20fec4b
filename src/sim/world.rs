//! Entity world: the player, live projectiles and pending telegraphs

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::spawn::SpawnOrder;
use super::state::{Player, Projectile, SizeClass, Telegraph};
use crate::config::{PlayerConfig, WorldConfig};

/// Player/projectile overlap found this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub projectile_id: u32,
    pub damage: u32,
}

#[derive(Debug, Clone)]
pub struct EntityWorld {
    pub player: Player,
    /// Live projectiles (iteration order carries no meaning)
    pub projectiles: Vec<Projectile>,
    /// Large projectiles waiting out their warning
    pub telegraphs: Vec<Telegraph>,
    /// Area the player is confined to
    arena: Aabb,
    /// Arena plus the entry band; projectiles leaving it are dodged
    bounds: Aabb,
    next_id: u32,
}

impl EntityWorld {
    pub fn new(world: &WorldConfig, player: &PlayerConfig, hitbox_multiplier: f32) -> Self {
        let arena = Aabb::new(Vec2::ZERO, Vec2::new(world.width, world.height));
        Self {
            player: Player {
                pos: Vec2::new(world.width / 2.0, world.height / 2.0),
                size: player.size,
                hitbox: player.size * hitbox_multiplier,
                speed: player.speed,
                hearts: player.hearts,
                max_hearts: player.hearts,
            },
            projectiles: Vec::new(),
            telegraphs: Vec::new(),
            arena,
            bounds: arena.inflate(world.spawn_margin),
            next_id: 1,
        }
    }

    pub fn arena(&self) -> Aabb {
        self.arena
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place a projectile directly into the world, returning its ID
    pub fn add_projectile(&mut self, class: SizeClass, pos: Vec2, vel: Vec2, size: f32) -> u32 {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            class,
            pos,
            vel,
            size,
            damage: class.damage(),
        });
        id
    }

    /// Accept a spawn order, telegraphing it first if it carries a warning
    pub fn spawn(&mut self, order: SpawnOrder) {
        let id = self.next_entity_id();
        let projectile = Projectile {
            id,
            class: order.class,
            pos: order.pos,
            vel: order.vel,
            size: order.size,
            damage: order.damage,
        };
        if order.warning > 0.0 {
            self.telegraphs.push(Telegraph {
                remaining: order.warning,
                projectile,
            });
        } else {
            self.projectiles.push(projectile);
        }
    }

    /// Move everything by one tick and drop projectiles that left the world.
    ///
    /// `movement` is the input direction; anything longer than a unit vector
    /// is normalized. Returns how many projectiles were dodged.
    pub fn advance(&mut self, dt: f32, movement: Vec2) -> u32 {
        let direction = if movement.length_squared() > 1.0 {
            movement.normalize()
        } else if movement.is_finite() {
            movement
        } else {
            Vec2::ZERO
        };
        let player = &mut self.player;
        player.pos = self
            .arena
            .clamp_center(player.pos + direction * player.speed * dt, player.size);

        // Release telegraphs whose warning ran out; they move this same tick
        let mut index = 0;
        while index < self.telegraphs.len() {
            self.telegraphs[index].remaining -= dt;
            if self.telegraphs[index].remaining <= 0.0 {
                let telegraph = self.telegraphs.swap_remove(index);
                self.projectiles.push(telegraph.projectile);
            } else {
                index += 1;
            }
        }

        for projectile in &mut self.projectiles {
            projectile.pos += projectile.vel * dt;
        }

        let before = self.projectiles.len();
        let bounds = self.bounds;
        self.projectiles.retain(|p| p.hitbox().overlaps(&bounds));
        (before - self.projectiles.len()) as u32
    }

    /// Find projectiles overlapping the player's hitbox and consume them
    pub fn detect_collisions(&mut self) -> Vec<CollisionEvent> {
        let hitbox = self.player.hitbox();
        let mut hits = Vec::new();
        self.projectiles.retain(|p| {
            if p.hitbox().overlaps(&hitbox) {
                hits.push(CollisionEvent {
                    projectile_id: p.id,
                    damage: p.damage,
                });
                false
            } else {
                true
            }
        });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SessionConfig};
    use crate::sim::Mode;

    fn world(mode: Mode) -> EntityWorld {
        let cfg = SessionConfig::resolve(&Config::defaults(), mode).unwrap();
        EntityWorld::new(
            &cfg.world,
            &cfg.player,
            cfg.difficulty.player_hitbox_multiplier(),
        )
    }

    #[test]
    fn test_player_starts_centred_with_mode_hitbox() {
        let normal = world(Mode::Normal);
        assert_eq!(normal.player.pos, Vec2::new(480.0, 360.0));
        assert_eq!(normal.player.hitbox, 40.0);
        assert_eq!(world(Mode::Nightmare).player.hitbox, 30.0);
    }

    #[test]
    fn test_player_movement_normalized_and_clamped() {
        let mut world = world(Mode::Normal);
        world.advance(0.1, Vec2::new(1.0, 1.0));
        let step = 320.0 * 0.1 / 2f32.sqrt();
        assert!((world.player.pos.x - (480.0 + step)).abs() < 1e-3);

        for _ in 0..200 {
            world.advance(0.1, Vec2::new(-1.0, 0.0));
        }
        assert_eq!(world.player.pos.x, 20.0);
    }

    #[test]
    fn test_projectile_leaving_bounds_is_dodged_once() {
        let mut world = world(Mode::Normal);
        world.add_projectile(
            SizeClass::Small,
            Vec2::new(-12.0, 100.0),
            Vec2::new(-500.0, 0.0),
            24.0,
        );

        // Still inside the entry band
        assert_eq!(world.advance(0.1, Vec2::ZERO), 0);
        assert_eq!(world.projectiles.len(), 1);

        // x = -112, box right edge -100 is past the -96 margin
        assert_eq!(world.advance(0.1, Vec2::ZERO), 1);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.advance(0.1, Vec2::ZERO), 0);
    }

    #[test]
    fn test_entering_projectile_is_not_dodged() {
        let mut world = world(Mode::Normal);
        world.add_projectile(
            SizeClass::Large,
            Vec2::new(-24.0, 50.0),
            Vec2::new(200.0, 0.0),
            48.0,
        );
        for _ in 0..10 {
            assert_eq!(world.advance(0.05, Vec2::ZERO), 0);
        }
        assert_eq!(world.projectiles.len(), 1);
    }

    #[test]
    fn test_collisions_consume_projectiles_and_sum_damage() {
        let mut world = world(Mode::Normal);
        let centre = world.player.pos;
        world.add_projectile(SizeClass::Small, centre, Vec2::ZERO, 24.0);
        world.add_projectile(
            SizeClass::Large,
            centre + Vec2::new(10.0, 0.0),
            Vec2::ZERO,
            48.0,
        );
        let miss = world.add_projectile(
            SizeClass::Small,
            centre + Vec2::new(200.0, 0.0),
            Vec2::ZERO,
            24.0,
        );

        let hits = world.detect_collisions();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits.iter().map(|h| h.damage).sum::<u32>(), 3);
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles[0].id, miss);
        assert!(world.detect_collisions().is_empty());
    }

    #[test]
    fn test_nightmare_hitbox_is_smaller() {
        let mut world = world(Mode::Nightmare);
        // Overlaps the 40px sprite but not the 30px hitbox
        let pos = world.player.pos + Vec2::new(30.0, 0.0);
        world.add_projectile(SizeClass::Small, pos, Vec2::ZERO, 24.0);
        assert!(world.detect_collisions().is_empty());
    }

    #[test]
    fn test_telegraph_delays_entry() {
        let mut world = world(Mode::Normal);
        world.spawn(SpawnOrder {
            class: SizeClass::Large,
            pos: Vec2::new(-24.0, 10.0),
            vel: Vec2::new(100.0, 0.0),
            size: 48.0,
            damage: 2,
            warning: 0.25,
        });
        assert_eq!(world.telegraphs.len(), 1);
        assert!(world.projectiles.is_empty());

        world.advance(0.1, Vec2::ZERO);
        world.advance(0.1, Vec2::ZERO);
        assert!(world.projectiles.is_empty());

        world.advance(0.1, Vec2::ZERO);
        assert!(world.telegraphs.is_empty());
        assert_eq!(world.projectiles.len(), 1);
        assert!((world.projectiles[0].pos.x - (-14.0)).abs() < 1e-4);
    }

    #[test]
    fn test_telegraph_on_player_never_hits() {
        let mut world = world(Mode::Normal);
        let hearts = world.player.hearts;
        world.spawn(SpawnOrder {
            class: SizeClass::Large,
            pos: world.player.pos,
            vel: Vec2::ZERO,
            size: 48.0,
            damage: 2,
            warning: 1.0,
        });

        for _ in 0..5 {
            world.advance(0.1, Vec2::ZERO);
            assert!(world.detect_collisions().is_empty());
        }
        assert_eq!(world.telegraphs.len(), 1);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.player.hearts, hearts);
    }
}
