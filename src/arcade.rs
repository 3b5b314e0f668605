//! The shared simulation context every task works against.

use core::{
    cell::RefCell,
    sync::atomic::{
        AtomicBool,
        Ordering,
    },
};

use embassy_sync::{
    blocking_mutex::{
        Mutex,
        raw::CriticalSectionRawMutex,
    },
    channel::Channel,
    signal::Signal,
};
use embassy_time::Instant;

use crate::{
    config::{
        Config,
        HANDOFF_CAPACITY,
    },
    diagnostics::Diagnostics,
    world::{
        Cursor,
        Frame,
        World,
    },
};

/// What the sampler hands to the renderer: where the crosshair was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandoffSample {
    pub cursor: Cursor,
    /// Sample number since the last restart.
    pub seq: u32,
}

/// Game state, hand-off queue and counters, sized to live in a `static`.
///
/// The world sits behind a critical-section lock. The sampler holds it for
/// the whole entity tick and the renderer only ever draws from a copy taken
/// under the same lock, so a frame never shows a half-updated table.
pub struct Arcade {
    config: Config,
    world: Mutex<CriticalSectionRawMutex, RefCell<World>>,
    handoff: Channel<CriticalSectionRawMutex, HandoffSample, HANDOFF_CAPACITY>,
    stop_render: Signal<CriticalSectionRawMutex, ()>,
    render_stopped: Signal<CriticalSectionRawMutex, ()>,
    renderer_live: AtomicBool,
    pub diagnostics: Diagnostics,
}

impl Arcade {
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            world: Mutex::new(RefCell::new(World::new())),
            handoff: Channel::new(),
            stop_render: Signal::new(),
            render_stopped: Signal::new(),
            renderer_live: AtomicBool::new(false),
            diagnostics: Diagnostics::new(config.sample_period, config.jitter_unit),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `f` with exclusive access to the world.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        self.world.lock(|world| f(&mut *world.borrow_mut()))
    }

    pub fn cursor(&self) -> Cursor {
        self.with_world(|world| world.cursor)
    }

    pub fn score(&self) -> u32 {
        self.with_world(|world| world.score)
    }

    /// Copy of the entity tables for drawing.
    pub fn snapshot(&self) -> Frame {
        self.with_world(|world| world.snapshot())
    }

    /// Queue a sample for the renderer without ever waiting.
    ///
    /// A full queue drops the sample and counts it as lost.
    pub fn offer(&self, sample: HandoffSample) -> bool {
        match self.handoff.try_send(sample) {
            Ok(()) => true,
            Err(_) => {
                self.diagnostics.count_data_lost();
                trace!("hand-off queue full, dropped sample {}", sample.seq);
                false
            }
        }
    }

    /// Wait for the next sample. The renderer's only suspension point.
    pub async fn next_sample(&self) -> HandoffSample {
        self.handoff.receive().await
    }

    pub fn try_next_sample(&self) -> Option<HandoffSample> {
        self.handoff.try_receive().ok()
    }

    /// Fire a player bullet from the crosshair. A full store drops the shot.
    pub fn fire(&self) -> bool {
        match self.with_world(World::fire) {
            Ok(index) => {
                debug!("bullet {} fired", index);
                true
            }
            Err(full) => {
                self.diagnostics.count_dropped_spawn();
                debug!("fire dropped: {}", full);
                false
            }
        }
    }

    /// Put an enemy on the field if there is none, picking its column from `now`.
    pub fn spawn_enemy(&self, now: Instant) -> bool {
        match self.with_world(|world| world.spawn_enemy_if_empty(now.as_ticks())) {
            None => false,
            Some(Ok(index)) => {
                debug!("enemy {} spawned", index);
                true
            }
            Some(Err(full)) => {
                self.diagnostics.count_dropped_spawn();
                debug!("spawn dropped: {}", full);
                false
            }
        }
    }

    /// Back to power-up state: world, counters and queued samples.
    pub fn reset(&self) {
        self.with_world(World::reset);
        self.handoff.clear();
        self.diagnostics.reset();
    }

    /// Stop the running render task and wait until it has returned.
    ///
    /// Returns at once when no renderer is running. Once this resolves the
    /// old renderer holds no sample and will not touch the display again, so
    /// its task slot is free for a new one.
    pub async fn stop_renderer(&self) {
        if !self.renderer_live.load(Ordering::Acquire) {
            return;
        }
        self.render_stopped.reset();
        self.stop_render.signal(());
        self.render_stopped.wait().await;
    }

    /// Is a render task currently inside [`render::run`](crate::render::run)?
    pub fn renderer_running(&self) -> bool {
        self.renderer_live.load(Ordering::Acquire)
    }

    pub(crate) fn render_started(&self) {
        self.stop_render.reset();
        self.renderer_live.store(true, Ordering::Release);
    }

    pub(crate) async fn render_stop_requested(&self) {
        self.stop_render.wait().await;
    }

    pub(crate) fn render_finished(&self) {
        self.renderer_live.store(false, Ordering::Release);
        self.render_stopped.signal(());
    }
}

impl Default for Arcade {
    fn default() -> Self {
        Self::new(Config::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Faction;

    fn sample(seq: u32) -> HandoffSample {
        HandoffSample {
            cursor: Cursor::HOME,
            seq,
        }
    }

    #[test]
    fn ninth_sample_is_lost() {
        let arcade = Arcade::default();
        for seq in 0..8 {
            assert!(arcade.offer(sample(seq)));
        }
        assert!(!arcade.offer(sample(8)));
        assert_eq!(arcade.diagnostics.data_lost(), 1);

        let drained: [u32; 8] = core::array::from_fn(|_| arcade.try_next_sample().unwrap().seq);
        assert_eq!(drained, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(arcade.try_next_sample(), None);
    }

    #[test]
    fn full_bullet_store_counts_dropped_shot() {
        let arcade = Arcade::default();
        arcade.with_world(|world| {
            while world.bullets.add_bullet(1, 50, Faction::Enemy).is_ok() {}
        });
        assert!(!arcade.fire());
        assert_eq!(arcade.diagnostics.dropped_spawns(), 1);
    }

    #[test]
    fn spawner_only_fills_an_empty_field() {
        let arcade = Arcade::default();
        assert!(arcade.spawn_enemy(Instant::from_ticks(42)));
        assert!(!arcade.spawn_enemy(Instant::from_ticks(43)));
        assert_eq!(arcade.with_world(|world| world.enemies.len()), 1);
    }

    #[test]
    fn reset_clears_world_queue_and_counters() {
        let arcade = Arcade::default();
        arcade.fire();
        arcade.offer(sample(0));
        arcade.with_world(|world| world.score = 3);
        arcade.reset();
        assert_eq!(arcade.score(), 0);
        assert_eq!(arcade.try_next_sample(), None);
        assert!(arcade.with_world(|world| world.bullets.is_empty()));
    }
}
