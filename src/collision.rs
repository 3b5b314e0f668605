//! Bullet versus enemy hit test.

use crate::{
    config::{
        BULLET_H,
        ENEMY_H,
        ENEMY_W,
    },
    entities::{
        Bullet,
        Enemy,
    },
};

/// Does `bullet` hit `enemy`?
///
/// The bullet is treated as a point, so the enemy box is padded by half a
/// bullet height above and below. All four edges are inclusive.
pub fn hits(enemy: &Enemy, bullet: &Bullet) -> bool {
    let pad = BULLET_H / 2;
    let (bx, by) = (i32::from(bullet.x), i32::from(bullet.y));
    let (ex, ey) = (i32::from(enemy.x), i32::from(enemy.y));

    (ex..=ex + i32::from(ENEMY_W)).contains(&bx)
        && (ey - i32::from(pad)..=ey + i32::from(ENEMY_H + pad)).contains(&by)
}
