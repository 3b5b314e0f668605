//! Playfield geometry and timing.

use embassy_time::Duration;

// ── Playfield geometry ──────────────────────────────────────────────────────
/// Width of the playfield in pixels. The cursor may sit on any column.
pub const FIELD_W: i16 = 128;
/// Height of the playfield in pixels.
pub const FIELD_H: i16 = 128;
/// The cursor area ends here; the HUD lives below it.
pub const CURSOR_AREA_H: i16 = 112;
/// Edge length of the crosshair.
pub const CROSSHAIR_SIZE: i16 = 5;
/// Where the cursor sits after power-up and after a restart.
pub const CURSOR_HOME: (i16, i16) = (63, 63);

// ── Entities ────────────────────────────────────────────────────────────────
pub const BULLET_CAPACITY: usize = 100;
pub const ENEMY_CAPACITY: usize = 10;
pub const BULLET_W: i16 = 1;
pub const BULLET_H: i16 = 5;
/// Pixels a bullet travels per sampler tick.
pub const BULLET_SPEED: i16 = 6;
/// A player bullet expires once its y is at or above this row.
pub const BULLET_TOP_LIMIT: i16 = (BULLET_H + 1) / 2;
pub const ENEMY_W: i16 = 17;
pub const ENEMY_H: i16 = 7;
/// Row new enemies appear on.
pub const ENEMY_SPAWN_Y: i16 = 7;

// ── Sampling ────────────────────────────────────────────────────────────────
/// Stick deflection is divided by `2^DAMPING_SHIFT` before it moves the cursor.
pub const DAMPING_SHIFT: u32 = 9;
/// Capacity of the sampler → renderer hand-off queue.
pub const HANDOFF_CAPACITY: usize = 8;
/// Number of jitter histogram buckets; the last one collects everything larger.
pub const JITTER_BUCKETS: usize = 64;

/// Timing knobs that differ between the badge and the host tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Expected interval between sampler invocations (20 Hz).
    pub sample_period: Duration,
    /// Size of one jitter histogram bucket.
    pub jitter_unit: Duration,
    /// Trigger edges closer together than this are ignored.
    pub debounce: Duration,
    /// Pause before the restart sequence grabs the display.
    pub restart_pause: Duration,
    /// How long the "Restarting" banner stays up.
    pub restart_banner: Duration,
}

impl Config {
    pub const DEFAULT: Self = Self {
        sample_period: Duration::from_millis(50),
        jitter_unit: Duration::from_micros(1),
        debounce: Duration::from_millis(20),
        restart_pause: Duration::from_millis(50),
        restart_banner: Duration::from_millis(500),
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
