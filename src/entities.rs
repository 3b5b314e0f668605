//! Fixed-capacity entity slots for bullets and enemies.
//!
//! Slots never move: an index stays valid for the whole life of the entity,
//! including the tick where it is already dead but still on screen. That is
//! what lets the renderer erase the last footprint before the slot is reused.

use core::fmt;

use crate::config::{
    BULLET_CAPACITY,
    ENEMY_CAPACITY,
};

/// Who fired a bullet, or whether its slot is in use at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Faction {
    /// Free slot.
    None,
    /// Fired by the player, travels up.
    Player,
    /// Fired by an enemy, travels down.
    Enemy,
    /// Dead; freed on the next tick.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bullet {
    pub x: i16,
    pub y: i16,
    pub faction: Faction,
}

impl Bullet {
    pub const FREE: Self = Self {
        x: 0,
        y: 0,
        faction: Faction::None,
    };

    pub const fn new(x: i16, y: i16, faction: Faction) -> Self {
        Self { x, y, faction }
    }

    /// Occupied and still flying.
    pub fn is_live(&self) -> bool {
        matches!(self.faction, Faction::Player | Faction::Enemy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnemyState {
    /// Free slot.
    Empty,
    Active,
    /// Hit this tick; freed on the next one.
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Enemy {
    pub x: i16,
    pub y: i16,
    pub state: EnemyState,
}

impl Enemy {
    pub const FREE: Self = Self {
        x: 0,
        y: 0,
        state: EnemyState::Empty,
    };

    pub const fn new(x: i16, y: i16) -> Self {
        Self {
            x,
            y,
            state: EnemyState::Active,
        }
    }

    pub fn is_live(&self) -> bool {
        self.state == EnemyState::Active
    }
}

/// Something that can live in a [`Slots`] table.
pub trait Slot: Copy {
    /// Value of an unoccupied slot.
    const FREE: Self;

    fn is_free(&self) -> bool;
}

impl Slot for Bullet {
    const FREE: Self = Bullet::FREE;

    fn is_free(&self) -> bool {
        self.faction == Faction::None
    }
}

impl Slot for Enemy {
    const FREE: Self = Enemy::FREE;

    fn is_free(&self) -> bool {
        self.state == EnemyState::Empty
    }
}

/// Every slot of the table is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreFull;

impl fmt::Display for StoreFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("entity store is full")
    }
}

/// Fixed array of slots with a live count kept alongside.
///
/// Allocation is a linear scan for the first free slot, which is cheap at
/// the capacities used here.
#[derive(Debug, Clone)]
pub struct Slots<T: Slot, const N: usize> {
    slots: [T; N],
    live: usize,
}

pub type BulletSlots = Slots<Bullet, BULLET_CAPACITY>;
pub type EnemySlots = Slots<Enemy, ENEMY_CAPACITY>;

impl<T: Slot, const N: usize> Slots<T, N> {
    pub const fn new() -> Self {
        Self {
            slots: [T::FREE; N],
            live: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Put `value` into the first free slot and return its index.
    pub fn insert(&mut self, value: T) -> Result<usize, StoreFull> {
        debug_assert!(!value.is_free(), "inserting a free slot value");
        let index = self
            .slots
            .iter()
            .position(T::is_free)
            .ok_or(StoreFull)?;
        self.slots[index] = value;
        self.live += 1;
        Ok(index)
    }

    /// Free slot `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of range or the slot is already free.
    pub fn remove(&mut self, index: usize) {
        assert!(index < N, "slot index {index} out of range");
        assert!(!self.slots[index].is_free(), "slot {index} is already free");
        self.slots[index] = T::FREE;
        self.live -= 1;
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        self.slots = [T::FREE; N];
        self.live = 0;
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).filter(|slot| !slot.is_free())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).filter(|slot| !slot.is_free())
    }

    /// Raw view of the table, free slots included.
    pub fn as_slice(&self) -> &[T; N] {
        &self.slots
    }

    /// Occupied slots with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_free())
    }
}

impl<T: Slot, const N: usize> Default for Slots<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl BulletSlots {
    pub fn add_bullet(&mut self, x: i16, y: i16, faction: Faction) -> Result<usize, StoreFull> {
        self.insert(Bullet::new(x, y, faction))
    }

    pub fn delete_bullet(&mut self, index: usize) {
        self.remove(index);
    }
}

impl EnemySlots {
    pub fn add_enemy(&mut self, x: i16, y: i16) -> Result<usize, StoreFull> {
        self.insert(Enemy::new(x, y))
    }

    pub fn delete_enemy(&mut self, index: usize) {
        self.remove(index);
    }
}
