//! Counters the debug console used to print, kept for logging.

use core::{
    cell::RefCell,
    sync::atomic::{
        AtomicU32,
        Ordering,
    },
};

use embassy_sync::blocking_mutex::{
    Mutex,
    raw::CriticalSectionRawMutex,
};
use embassy_time::{
    Duration,
    Instant,
};

use crate::jitter::JitterMonitor;

/// Plain copy of every counter, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiagnosticsSnapshot {
    pub samples: u32,
    pub update_work: u32,
    pub data_lost: u32,
    pub dropped_spawns: u32,
    pub threads_created: u32,
    pub frames_rendered: u32,
    pub max_jitter: u32,
}

pub struct Diagnostics {
    samples: AtomicU32,
    update_work: AtomicU32,
    data_lost: AtomicU32,
    dropped_spawns: AtomicU32,
    threads_created: AtomicU32,
    frames_rendered: AtomicU32,
    jitter: Mutex<CriticalSectionRawMutex, RefCell<JitterMonitor>>,
}

impl Diagnostics {
    pub const fn new(sample_period: Duration, jitter_unit: Duration) -> Self {
        Self {
            samples: AtomicU32::new(0),
            update_work: AtomicU32::new(0),
            data_lost: AtomicU32::new(0),
            dropped_spawns: AtomicU32::new(0),
            threads_created: AtomicU32::new(0),
            frames_rendered: AtomicU32::new(0),
            jitter: Mutex::new(RefCell::new(JitterMonitor::new(sample_period, jitter_unit))),
        }
    }

    pub(crate) fn count_sample(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.update_work.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_data_lost(&self) {
        self.data_lost.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_dropped_spawn(&self) {
        self.dropped_spawns.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_frame(&self) {
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
    }

    /// A task was spawned successfully.
    pub fn count_thread_created(&self) {
        self.threads_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_jitter(&self, now: Instant) -> Option<u32> {
        self.jitter.lock(|jitter| jitter.borrow_mut().record(now))
    }

    pub fn samples(&self) -> u32 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn data_lost(&self) -> u32 {
        self.data_lost.load(Ordering::Relaxed)
    }

    pub fn dropped_spawns(&self) -> u32 {
        self.dropped_spawns.load(Ordering::Relaxed)
    }

    pub fn max_jitter(&self) -> u32 {
        self.jitter.lock(|jitter| jitter.borrow().max())
    }

    /// Run `f` against the jitter histogram.
    pub fn with_jitter<R>(&self, f: impl FnOnce(&JitterMonitor) -> R) -> R {
        self.jitter.lock(|jitter| f(&*jitter.borrow()))
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        critical_section::with(|_| DiagnosticsSnapshot {
            samples: self.samples.load(Ordering::Relaxed),
            update_work: self.update_work.load(Ordering::Relaxed),
            data_lost: self.data_lost.load(Ordering::Relaxed),
            dropped_spawns: self.dropped_spawns.load(Ordering::Relaxed),
            threads_created: self.threads_created.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            max_jitter: self.max_jitter(),
        })
    }

    /// Zero every counter in one critical section.
    ///
    /// `threads_created` survives: it counts tasks over the process lifetime.
    pub fn reset(&self) {
        critical_section::with(|_| {
            self.samples.store(0, Ordering::Relaxed);
            self.update_work.store(0, Ordering::Relaxed);
            self.data_lost.store(0, Ordering::Relaxed);
            self.dropped_spawns.store(0, Ordering::Relaxed);
            self.frames_rendered.store(0, Ordering::Relaxed);
            self.jitter.lock(|jitter| jitter.borrow_mut().reset());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_counters_but_keeps_created_tasks() {
        let diagnostics = Diagnostics::new(Duration::from_millis(50), Duration::from_micros(1));
        diagnostics.count_sample();
        diagnostics.count_data_lost();
        diagnostics.count_dropped_spawn();
        diagnostics.count_frame();
        diagnostics.count_thread_created();
        diagnostics.record_jitter(Instant::from_micros(0));
        diagnostics.record_jitter(Instant::from_micros(50_040));
        assert_eq!(diagnostics.max_jitter(), 40);

        diagnostics.reset();
        assert_eq!(
            diagnostics.snapshot(),
            DiagnosticsSnapshot {
                threads_created: 1,
                ..DiagnosticsSnapshot::default()
            }
        );
    }
}
