//! Periodic timers
//!
//! The engine asks a [`Scheduler`] for recurring callbacks and holds the
//! returned [`TimerHandle`] for as long as the timer should live. Dropping
//! or cancelling the handle stops the timer, so a timer cannot outlive the
//! state that wanted it.
//!
//! [`TokioScheduler`] runs timers on a tokio runtime. [`ManualScheduler`]
//! runs them on a virtual clock that only moves when told to, which makes
//! whole focus cycles testable in microseconds.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;

/// Countdown granularity
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Metronome period, roughly 70 beats per minute
pub const BEAT_INTERVAL: Duration = Duration::from_millis(857);

/// Shortest period a scheduler will honor
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Work run on every timer period
pub type Callback = Box<dyn FnMut() + Send + 'static>;

/// Source of recurring timers
pub trait Scheduler: Send + Sync {
    /// Call `callback` every `every`, first after one full period
    fn schedule(&self, every: Duration, callback: Callback) -> TimerHandle;
}

/// Owns a live timer; cancels it on drop
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the timer now
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// Timers as tokio tasks
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, every: Duration, mut callback: Callback) -> TimerHandle {
        let every = every.max(MIN_INTERVAL);
        let task = self.handle.spawn(async move {
            let start = tokio::time::Instant::now() + every;
            let mut interval = tokio::time::interval_at(start, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                callback();
            }
        });

        let abort = task.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}

struct ManualTimer {
    id: u64,
    every: Duration,
    due: Duration,
    callback: Arc<Mutex<Callback>>,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

/// Virtual-clock scheduler driven by [`ManualScheduler::advance`]
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of timers not yet cancelled
    pub fn active_timers(&self) -> usize {
        self.lock()
            .timers
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move the clock forward, firing every timer that comes due on the way.
    ///
    /// Timers fire in time order, ties in the order they were scheduled.
    /// No lock is held while a callback runs, so callbacks may schedule or
    /// cancel timers.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;

        loop {
            let (callback, cancelled) = {
                let mut state = self.lock();
                state.timers.retain(|t| !t.cancelled.load(Ordering::SeqCst));

                let next = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);

                let Some(idx) = next else {
                    state.now = target;
                    return;
                };

                let timer = &mut state.timers[idx];
                let due = timer.due;
                timer.due += timer.every;
                let fire = (Arc::clone(&timer.callback), Arc::clone(&timer.cancelled));
                state.now = due;
                fire
            };

            if cancelled.load(Ordering::SeqCst) {
                continue;
            }
            let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
            (*callback)();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, every: Duration, callback: Callback) -> TimerHandle {
        let every = every.max(MIN_INTERVAL);
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + every;
        state.timers.push(ManualTimer {
            id,
            every,
            due,
            callback: Arc::new(Mutex::new(callback)),
            cancelled: Arc::clone(&cancelled),
        });

        TimerHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Callback) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let callback: Callback = Box::new(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (count, callback)
    }

    #[test]
    fn test_manual_fires_once_per_period() {
        let scheduler = ManualScheduler::new();
        let (count, callback) = counter();
        let _handle = scheduler.schedule(TICK_INTERVAL, callback);

        scheduler.advance(Duration::from_millis(999));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        scheduler.advance(Duration::from_millis(2500));
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.now(), Duration::from_millis(3500));
    }

    #[test]
    fn test_manual_cancel_and_drop_stop_timer() {
        let scheduler = ManualScheduler::new();
        let (count, callback) = counter();
        let handle = scheduler.schedule(TICK_INTERVAL, callback);
        let (other, other_cb) = counter();
        let other_handle = scheduler.schedule(TICK_INTERVAL, other_cb);
        assert_eq!(scheduler.active_timers(), 2);

        scheduler.advance(Duration::from_secs(2));
        handle.cancel();
        drop(other_handle);
        assert_eq!(scheduler.active_timers(), 0);

        scheduler.advance(Duration::from_secs(5));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(other.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_manual_fires_in_time_order() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let tick_log = Arc::clone(&log);
        let _tick = scheduler.schedule(
            TICK_INTERVAL,
            Box::new(move || tick_log.lock().unwrap().push("tick")),
        );
        let beat_log = Arc::clone(&log);
        let _beat = scheduler.schedule(
            BEAT_INTERVAL,
            Box::new(move || beat_log.lock().unwrap().push("beat")),
        );

        scheduler.advance(Duration::from_secs(2));
        assert_eq!(*log.lock().unwrap(), vec!["beat", "tick", "beat", "tick"]);
    }

    #[test]
    fn test_manual_callback_can_schedule() {
        let scheduler = Arc::new(ManualScheduler::new());
        let spawned = Arc::new(Mutex::new(Vec::new()));
        let (count, inner_cb) = counter();
        let inner_cb = Arc::new(Mutex::new(Some(inner_cb)));

        let sched = Arc::clone(&scheduler);
        let slot = Arc::clone(&spawned);
        let _outer = scheduler.schedule(
            TICK_INTERVAL,
            Box::new(move || {
                if let Some(cb) = inner_cb.lock().unwrap().take() {
                    let handle = sched.schedule(Duration::from_millis(500), cb);
                    slot.lock().unwrap().push(handle);
                }
            }),
        );

        // Inner timer starts at t=1s and fires at 1.5s, 2.0s, 2.5s, 3.0s
        scheduler.advance(Duration::from_secs(3));
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(scheduler.active_timers(), 2);
    }

    #[test]
    fn test_handle_debug() {
        let scheduler = ManualScheduler::new();
        let (_, callback) = counter();
        let handle = scheduler.schedule(TICK_INTERVAL, callback);
        assert_eq!(format!("{:?}", handle), "TimerHandle { live: true }");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_ticks_and_aborts() {
        let scheduler = TokioScheduler::new(Handle::current());
        let (count, callback) = counter();
        let handle = scheduler.schedule(TICK_INTERVAL, callback);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
