//! Game state shared between the sampler, the renderer and the one-shot tasks.

use crate::{
    collision::hits,
    config::{
        BULLET_CAPACITY,
        BULLET_H,
        BULLET_SPEED,
        BULLET_TOP_LIMIT,
        CROSSHAIR_SIZE,
        CURSOR_AREA_H,
        CURSOR_HOME,
        DAMPING_SHIFT,
        ENEMY_CAPACITY,
        ENEMY_SPAWN_Y,
        ENEMY_W,
        FIELD_H,
        FIELD_W,
    },
    entities::{
        Bullet,
        BulletSlots,
        Enemy,
        EnemySlots,
        EnemyState,
        Faction,
        StoreFull,
    },
};

/// One reading from the analog stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawInput {
    pub x: u16,
    pub y: u16,
    pub pressed: bool,
}

/// Crosshair position in playfield pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub x: i16,
    pub y: i16,
}

impl Cursor {
    pub const HOME: Self = Self {
        x: CURSOR_HOME.0,
        y: CURSOR_HOME.1,
    };

    const MAX_X: i32 = FIELD_W as i32 - 1;
    const MAX_Y: i32 = (CURSOR_AREA_H - CROSSHAIR_SIZE) as i32;

    /// Move by the stick deflection from `origin`, then clamp to the cursor area.
    ///
    /// Stick y grows downwards on the hardware, so a lower raw y moves the
    /// cursor down the screen. Deflections smaller than `2^DAMPING_SHIFT`
    /// do not move the cursor at all.
    pub fn integrate(&mut self, raw: RawInput, origin: RawInput) {
        let dx = (i32::from(raw.x) - i32::from(origin.x)).signum()
            * (i32::from(raw.x.abs_diff(origin.x)) >> DAMPING_SHIFT);
        let dy = (i32::from(origin.y) - i32::from(raw.y)).signum()
            * (i32::from(raw.y.abs_diff(origin.y)) >> DAMPING_SHIFT);

        self.x = (i32::from(self.x) + dx).clamp(0, Self::MAX_X) as i16;
        self.y = (i32::from(self.y) + dy).clamp(0, Self::MAX_Y) as i16;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::HOME
    }
}

/// What one entity tick changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub hits: u32,
    pub freed_bullets: u32,
    pub freed_enemies: u32,
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub bullets: [Bullet; BULLET_CAPACITY],
    pub enemies: [Enemy; ENEMY_CAPACITY],
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct World {
    pub cursor: Cursor,
    pub bullets: BulletSlots,
    pub enemies: EnemySlots,
    pub score: u32,
}

impl World {
    pub const fn new() -> Self {
        Self {
            cursor: Cursor::HOME,
            bullets: BulletSlots::new(),
            enemies: EnemySlots::new(),
            score: 0,
        }
    }

    /// Advance every entity by one sampler tick.
    ///
    /// Slots marked dead on the previous tick are freed first, so the
    /// renderer has had one frame to erase them.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for index in 0..self.enemies.capacity() {
            if self.enemies.get(index).is_some_and(|e| e.state == EnemyState::Destroyed) {
                self.enemies.delete_enemy(index);
                report.freed_enemies += 1;
            }
        }

        for index in 0..self.bullets.capacity() {
            let Some(bullet) = self.bullets.get_mut(index) else {
                continue;
            };
            let faction = bullet.faction;
            match faction {
                Faction::Expired => {
                    self.bullets.delete_bullet(index);
                    report.freed_bullets += 1;
                }
                Faction::Player => {
                    bullet.y -= BULLET_SPEED;
                    if bullet.y <= BULLET_TOP_LIMIT {
                        bullet.faction = Faction::Expired;
                        continue;
                    }
                    let shot = *bullet;
                    if self.strike(&shot) {
                        if let Some(bullet) = self.bullets.get_mut(index) {
                            bullet.faction = Faction::Expired;
                        }
                        report.hits += 1;
                    }
                }
                Faction::Enemy => {
                    bullet.y += BULLET_SPEED;
                    if bullet.y + BULLET_H >= FIELD_H {
                        bullet.faction = Faction::Expired;
                    }
                }
                Faction::None => {}
            }
        }

        report
    }

    /// Destroy the first live enemy `bullet` hits. One bullet takes out one enemy.
    fn strike(&mut self, bullet: &Bullet) -> bool {
        for index in 0..self.enemies.capacity() {
            let Some(enemy) = self.enemies.get_mut(index) else {
                continue;
            };
            if enemy.is_live() && hits(enemy, bullet) {
                enemy.state = EnemyState::Destroyed;
                self.score += 1;
                return true;
            }
        }
        false
    }

    /// Launch a player bullet from the crosshair.
    pub fn fire(&mut self) -> Result<usize, StoreFull> {
        self.bullets
            .add_bullet(self.cursor.x, self.cursor.y, Faction::Player)
    }

    /// Drop in a fresh enemy when the field is empty.
    ///
    /// `seed` picks the column; the badge passes the current time.
    pub fn spawn_enemy_if_empty(&mut self, seed: u64) -> Option<Result<usize, StoreFull>> {
        if !self.enemies.is_empty() {
            return None;
        }
        let x = (seed % (FIELD_W - ENEMY_W) as u64) as i16;
        Some(self.enemies.add_enemy(x, ENEMY_SPAWN_Y))
    }

    pub fn snapshot(&self) -> Frame {
        Frame {
            bullets: *self.bullets.as_slice(),
            enemies: *self.enemies.as_slice(),
            score: self.score,
        }
    }

    /// Back to the power-up state: cursor home, no entities, no score.
    pub fn reset(&mut self) {
        self.cursor = Cursor::HOME;
        self.bullets.clear();
        self.enemies.clear();
        self.score = 0;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: RawInput = RawInput {
        x: 2048,
        y: 2048,
        pressed: false,
    };

    fn raw(x: u16, y: u16) -> RawInput {
        RawInput { x, y, pressed: false }
    }

    #[test]
    fn centred_stick_keeps_cursor_still() {
        let origin = raw(63, 63);
        let mut cursor = Cursor::HOME;
        cursor.integrate(raw(63, 63), origin);
        assert_eq!(cursor, Cursor { x: 63, y: 63 });
    }

    #[test]
    fn deflection_is_damped_by_shift() {
        let mut cursor = Cursor::HOME;
        cursor.integrate(raw(ORIGIN.x + 1024, ORIGIN.y), ORIGIN);
        assert_eq!(cursor.x, 65);

        // Less than 2^9 of deflection rounds to no movement.
        cursor.integrate(raw(ORIGIN.x + 511, ORIGIN.y - 511), ORIGIN);
        assert_eq!(cursor, Cursor { x: 65, y: 63 });
    }

    #[test]
    fn lower_raw_y_moves_cursor_down() {
        let mut cursor = Cursor::HOME;
        cursor.integrate(raw(ORIGIN.x, ORIGIN.y - 1536), ORIGIN);
        assert_eq!(cursor.y, 66);
        cursor.integrate(raw(ORIGIN.x, ORIGIN.y + 1536), ORIGIN);
        assert_eq!(cursor.y, 63);
    }

    #[test]
    fn cursor_stays_inside_area_for_extreme_input() {
        let mut cursor = Cursor::HOME;
        let extremes = [0, 1, 2047, 2048, 4095, u16::MAX];
        for _ in 0..50 {
            for &x in &extremes {
                for &y in &extremes {
                    cursor.integrate(raw(x, y), ORIGIN);
                    assert!((0..=127).contains(&cursor.x), "{cursor:?}");
                    assert!((0..=CURSOR_AREA_H - CROSSHAIR_SIZE).contains(&cursor.y), "{cursor:?}");
                }
            }
        }
    }

    #[test]
    fn player_bullet_climbs_then_retires_one_tick_later() {
        let mut world = World::new();
        let index = world.bullets.add_bullet(40, 40, Faction::Player).unwrap();

        let mut y = 40;
        loop {
            world.tick();
            let bullet = *world.bullets.get(index).unwrap();
            y -= BULLET_SPEED;
            assert_eq!(bullet.y, y);
            if y <= BULLET_TOP_LIMIT {
                assert_eq!(bullet.faction, Faction::Expired);
                break;
            }
            assert_eq!(bullet.faction, Faction::Player);
        }

        let report = world.tick();
        assert_eq!(report.freed_bullets, 1);
        assert!(world.bullets.get(index).is_none());
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn enemy_bullet_falls_and_expires_at_bottom() {
        let mut world = World::new();
        let index = world.bullets.add_bullet(10, 100, Faction::Enemy).unwrap();
        world.tick();
        assert_eq!(world.bullets.get(index).map(|b| b.y), Some(106));
        world.tick();
        world.tick();
        assert_eq!(world.bullets.get(index).map(|b| b.faction), Some(Faction::Enemy));
        world.tick();
        assert_eq!(world.bullets.get(index).map(|b| b.faction), Some(Faction::Expired));
        world.tick();
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn hit_marks_both_and_frees_enemy_next_tick() {
        let mut world = World::new();
        let enemy = world.enemies.add_enemy(10, 7).unwrap();
        let bullet = world.bullets.add_bullet(15, 16, Faction::Player).unwrap();

        let report = world.tick();
        assert_eq!(report.hits, 1);
        assert_eq!(world.score, 1);
        assert_eq!(world.enemies.get(enemy).map(|e| e.state), Some(EnemyState::Destroyed));
        assert_eq!(world.bullets.get(bullet).map(|b| b.faction), Some(Faction::Expired));

        let report = world.tick();
        assert_eq!(report.freed_enemies, 1);
        assert_eq!(report.freed_bullets, 1);
        assert!(world.enemies.is_empty());
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn destroyed_enemy_cannot_be_hit_twice() {
        let mut world = World::new();
        world.enemies.add_enemy(10, 7).unwrap();
        world.bullets.add_bullet(15, 16, Faction::Player).unwrap();
        world.bullets.add_bullet(16, 16, Faction::Player).unwrap();

        let report = world.tick();
        assert_eq!(report.hits, 1);
        assert_eq!(world.score, 1);
    }

    #[test]
    fn fire_allocates_at_cursor() {
        let mut world = World::new();
        for _ in 0..3 {
            world.bullets.add_bullet(0, 100, Faction::Enemy).unwrap();
        }
        assert_eq!(world.fire(), Ok(3));
        assert_eq!(world.bullets.len(), 4);
        assert_eq!(
            world.bullets.get(3),
            Some(&Bullet::new(63, 63, Faction::Player))
        );
    }

    #[test]
    fn spawn_only_when_field_is_empty() {
        let mut world = World::new();
        assert_eq!(world.spawn_enemy_if_empty(1_000_123), Some(Ok(0)));
        let enemy = *world.enemies.get(0).unwrap();
        assert_eq!(enemy.x, (1_000_123 % 111) as i16);
        assert_eq!(enemy.y, ENEMY_SPAWN_Y);
        assert_eq!(world.spawn_enemy_if_empty(5), None);
        assert_eq!(world.enemies.len(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut world = World::new();
        world.cursor = Cursor { x: 1, y: 2 };
        world.fire().unwrap();
        world.enemies.add_enemy(3, 7).unwrap();
        world.score = 9;
        world.reset();
        assert_eq!(world.cursor, Cursor::HOME);
        assert!(world.bullets.is_empty());
        assert!(world.enemies.is_empty());
        assert_eq!(world.score, 0);
    }
}
