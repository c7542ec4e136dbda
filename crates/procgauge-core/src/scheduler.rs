//! Fixed-cadence sampling loop.
//!
//! Runs on its own thread: tick, then sleep for whatever is left of the
//! interval. A tick that overruns the interval is followed immediately by the
//! next one; missed ticks are never queued.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::collector::traits::FileSystem;
use crate::registry::Registry;
use crate::sampler::Sampler;

/// Time between the starts of two consecutive ticks.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Granularity at which a sleeping scheduler notices a stop request.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// How long to sleep after a tick that took `elapsed`.
pub fn next_delay(elapsed: Duration, interval: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// Cooperative stop flag shared with a running scheduler.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives a [`Sampler`] at a fixed cadence, publishing into a shared registry.
pub struct Scheduler<F: FileSystem> {
    sampler: Sampler<F>,
    registry: Arc<Registry>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl<F: FileSystem + 'static> Scheduler<F> {
    pub fn new(sampler: Sampler<F>, registry: Arc<Registry>) -> Self {
        Self {
            sampler,
            registry,
            interval: SAMPLE_INTERVAL,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    #[cfg(test)]
    fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.running))
    }

    /// Runs until stopped. Returns the number of ticks performed.
    pub fn run(mut self) -> u64 {
        let mut ticks: u64 = 0;
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "sampling loop started"
        );

        while self.running.load(Ordering::SeqCst) {
            let started = Instant::now();
            let report = self.sampler.tick(&self.registry);
            let elapsed = started.elapsed();
            ticks += 1;

            debug!(
                tick = ticks,
                updated = report.updated.len(),
                failed = report.failed.len(),
                duration_ms = elapsed.as_millis() as u64,
                "tick completed"
            );

            let delay = next_delay(elapsed, self.interval);
            if delay.is_zero() {
                warn!(
                    duration_ms = elapsed.as_millis() as u64,
                    interval_ms = self.interval.as_millis() as u64,
                    "tick overran interval, starting next tick immediately"
                );
                continue;
            }
            self.sleep(delay);
        }

        info!(ticks, "sampling loop stopped");
        ticks
    }

    /// Starts the loop on a dedicated thread.
    pub fn spawn(self) -> io::Result<JoinHandle<u64>> {
        thread::Builder::new()
            .name("procgauge-sampler".into())
            .spawn(move || self.run())
    }

    fn sleep(&self, duration: Duration) {
        let mut remaining = duration;
        while remaining > Duration::ZERO && self.running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(SLEEP_SLICE);
            thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::registry::MetricFamily;

    #[test]
    fn delay_fills_rest_of_interval() {
        let interval = Duration::from_secs(1);
        assert_eq!(next_delay(Duration::ZERO, interval), interval);
        assert_eq!(
            next_delay(Duration::from_millis(250), interval),
            Duration::from_millis(750)
        );
    }

    #[test]
    fn overrun_means_no_delay() {
        let interval = Duration::from_secs(1);
        assert_eq!(next_delay(interval, interval), Duration::ZERO);
        assert_eq!(next_delay(Duration::from_secs(3), interval), Duration::ZERO);
    }

    #[test]
    fn stopped_before_start_runs_no_ticks() {
        let registry = Arc::new(Registry::new().unwrap());
        let scheduler = Scheduler::new(Sampler::new(MockFs::typical_system(), "/proc"), registry);
        scheduler.stop_handle().stop();
        assert_eq!(scheduler.run(), 0);
    }

    #[test]
    fn spawned_loop_publishes_and_stops() {
        let registry = Arc::new(Registry::new().unwrap());
        let scheduler = Scheduler::new(
            Sampler::new(MockFs::typical_system(), "/proc"),
            Arc::clone(&registry),
        )
        .with_interval(Duration::from_millis(10));
        let stop = scheduler.stop_handle();

        let handle = scheduler.spawn().unwrap();
        thread::sleep(Duration::from_millis(200));
        stop.stop();
        let ticks = handle.join().unwrap();

        assert!(ticks >= 2, "only {ticks} ticks");
        assert_eq!(registry.get(MetricFamily::ContextSwitches), 500000.0);
        assert_eq!(registry.get(MetricFamily::RunningProcesses), 2.0);
    }

    #[test]
    fn stop_interrupts_long_sleep() {
        let registry = Arc::new(Registry::new().unwrap());
        let scheduler = Scheduler::new(Sampler::new(MockFs::idle_system(), "/proc"), registry)
            .with_interval(Duration::from_secs(60));
        let stop = scheduler.stop_handle();

        let started = Instant::now();
        let handle = scheduler.spawn().unwrap();
        thread::sleep(Duration::from_millis(50));
        stop.stop();
        assert!(handle.join().unwrap() <= 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
