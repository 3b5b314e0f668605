//! Background task that keeps at least one enemy on the field.

use embassy_futures::yield_now;
use embassy_time::Instant;

use crate::arcade::Arcade;

/// Check for an empty field, spawn if so, yield, repeat. Never waits on anything.
pub async fn run(arcade: &Arcade) {
    loop {
        arcade.spawn_enemy(Instant::now());
        yield_now().await;
    }
}
