//! The periodic producer: stick → cursor → hand-off queue → entity tick.

use embassy_time::{
    Instant,
    Ticker,
};

use crate::{
    arcade::{
        Arcade,
        HandoffSample,
    },
    world::{
        RawInput,
        TickReport,
    },
};

/// Anything that can be read like an analog stick.
pub trait InputSource {
    fn sample(&mut self) -> RawInput;
}

/// What one sampler pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleReport {
    pub sample: HandoffSample,
    /// `false` when the hand-off queue was full.
    pub delivered: bool,
    /// `None` on the first pass after calibration or restart.
    pub jitter: Option<u32>,
    pub tick: TickReport,
}

/// Turns raw stick readings into cursor movement, relative to a rest position
/// captured once at start-up.
pub struct PositionSampler {
    origin: RawInput,
}

impl PositionSampler {
    /// Use the current stick reading as the rest position.
    pub fn calibrate(input: &mut impl InputSource) -> Self {
        let origin = input.sample();
        info!("stick origin at ({}, {})", origin.x, origin.y);
        Self { origin }
    }

    pub const fn with_origin(origin: RawInput) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> RawInput {
        self.origin
    }

    /// One producer pass. Never waits.
    pub fn sample(&mut self, arcade: &Arcade, raw: RawInput, now: Instant) -> SampleReport {
        let cursor = arcade.with_world(|world| {
            world.cursor.integrate(raw, self.origin);
            world.cursor
        });
        arcade.diagnostics.count_sample();

        let sample = HandoffSample {
            cursor,
            seq: arcade.diagnostics.samples(),
        };
        let delivered = arcade.offer(sample);
        let jitter = arcade.diagnostics.record_jitter(now);
        let tick = arcade.with_world(|world| world.tick());

        SampleReport {
            sample,
            delivered,
            jitter,
            tick,
        }
    }

    /// Sample `input` every configured period, forever.
    pub async fn run(mut self, arcade: &Arcade, input: &mut impl InputSource) {
        let mut ticker = Ticker::every(arcade.config().sample_period);
        loop {
            ticker.next().await;
            let raw = input.sample();
            let report = self.sample(arcade, raw, Instant::now());
            if report.tick.hits > 0 {
                debug!("score {}", arcade.score());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::Faction,
        world::Cursor,
    };

    const ORIGIN: RawInput = RawInput {
        x: 2048,
        y: 2048,
        pressed: false,
    };

    struct Scripted<'a>(&'a [RawInput]);

    impl InputSource for Scripted<'_> {
        fn sample(&mut self) -> RawInput {
            let (first, rest) = self.0.split_first().unwrap();
            self.0 = rest;
            *first
        }
    }

    fn at_ms(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn calibration_reads_the_resting_stick() {
        let mut input = Scripted(&[RawInput {
            x: 1900,
            y: 2100,
            pressed: false,
        }]);
        let sampler = PositionSampler::calibrate(&mut input);
        assert_eq!(sampler.origin().x, 1900);
        assert_eq!(sampler.origin().y, 2100);
    }

    #[test]
    fn pass_moves_cursor_and_queues_it() {
        let arcade = Arcade::default();
        let mut sampler = PositionSampler::with_origin(ORIGIN);
        let raw = RawInput {
            x: ORIGIN.x + 1024,
            ..ORIGIN
        };
        let report = sampler.sample(&arcade, raw, at_ms(0));

        assert!(report.delivered);
        assert_eq!(report.jitter, None);
        assert_eq!(report.sample.cursor, Cursor { x: 65, y: 63 });
        assert_eq!(arcade.try_next_sample(), Some(report.sample));
    }

    #[test]
    fn overflowing_queue_is_counted_not_blocking() {
        let arcade = Arcade::default();
        let mut sampler = PositionSampler::with_origin(ORIGIN);
        for i in 0..9 {
            sampler.sample(&arcade, ORIGIN, at_ms(i * 50));
        }
        assert_eq!(arcade.diagnostics.samples(), 9);
        assert_eq!(arcade.diagnostics.data_lost(), 1);
    }

    #[test]
    fn second_pass_records_jitter() {
        let arcade = Arcade::default();
        let mut sampler = PositionSampler::with_origin(ORIGIN);
        sampler.sample(&arcade, ORIGIN, at_ms(0));
        let report = sampler.sample(&arcade, ORIGIN, at_ms(52));
        assert_eq!(report.jitter, Some(2_000));
        assert_eq!(arcade.diagnostics.max_jitter(), 2_000);
    }

    #[test]
    fn pass_advances_bullets() {
        let arcade = Arcade::default();
        let mut sampler = PositionSampler::with_origin(ORIGIN);
        arcade.fire();
        sampler.sample(&arcade, ORIGIN, at_ms(0));
        let bullet = arcade.with_world(|world| *world.bullets.get(0).unwrap());
        assert_eq!(bullet.y, 63 - crate::config::BULLET_SPEED);
        assert_eq!(bullet.faction, Faction::Player);
    }
}
