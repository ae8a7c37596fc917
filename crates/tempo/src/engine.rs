//! Session engine
//!
//! [`Engine`] is the single owner of a [`Session`] and the timers that drive
//! it. Commands from the front end and timer callbacks all go through one
//! mutex, so operations never interleave.
//!
//! After every operation the engine reconciles its timers with the state:
//!
//! - the tick timer is live exactly while the session is running
//! - the beat timer is live exactly while running in a focus phase
//!
//! A phase completion therefore happens in this order: the session is
//! counted, the break and its duration are entered, the notification
//! plays, the goal is checked (possibly stopping the timer), and only then
//! are timers started or stopped to match.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tempo_core::{Config, ConfigUpdate};
use tracing::{debug, info, trace};

use crate::scheduler::{Scheduler, TimerHandle, BEAT_INTERVAL, TICK_INTERVAL};
use crate::session::{Phase, Session, Snapshot, Transition};
use crate::sound::Sounds;

/// Handle to a running timer engine. Clones share the same session.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    session: Session,
    scheduler: Arc<dyn Scheduler>,
    sounds: Arc<dyn Sounds>,
    tick_timer: Option<TimerHandle>,
    beat_timer: Option<TimerHandle>,
    this: Weak<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Engine {
    /// Create a stopped engine at the start of a focus phase
    pub fn new(config: Config, scheduler: Arc<dyn Scheduler>, sounds: Arc<dyn Sounds>) -> Self {
        let inner = Arc::new_cyclic(|this| {
            Mutex::new(Inner {
                session: Session::new(config),
                scheduler,
                sounds,
                tick_timer: None,
                beat_timer: None,
                this: this.clone(),
            })
        });
        Self { inner }
    }

    fn with<R>(&self, op: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = lock(&self.inner);
        let result = op(&mut inner);
        inner.sync_timers();
        result
    }

    /// Start counting down. No effect if running or after the goal is reached.
    pub fn start(&self) -> bool {
        self.with(|inner| {
            let changed = inner.session.start();
            if changed {
                info!("Timer started");
            }
            changed
        })
    }

    /// Pause the countdown. No effect if already paused.
    pub fn pause(&self) -> bool {
        self.with(|inner| {
            let changed = inner.session.pause();
            if changed {
                info!("Timer paused");
            }
            changed
        })
    }

    /// Start if paused, pause if running
    pub fn toggle_running(&self) -> bool {
        self.with(|inner| {
            let changed = inner.session.toggle_running();
            if changed {
                info!(running = inner.session.is_running(), "Timer toggled");
            }
            changed
        })
    }

    /// One second elapsed. Normally called by the tick timer.
    pub fn tick(&self) -> Option<Transition> {
        self.with(Inner::on_tick)
    }

    /// One metronome beat. Normally called by the beat timer.
    pub fn beat(&self) {
        lock(&self.inner).on_beat();
    }

    /// Finish the current phase immediately
    pub fn skip(&self) -> Option<Transition> {
        self.with(|inner| {
            let sounds = Arc::clone(&inner.sounds);
            let transition = inner.session.skip(sounds.as_ref());
            if let Some(t) = &transition {
                inner.log_transition(t, "skipped");
            }
            transition
        })
    }

    /// Stop and return to a fresh focus phase with zero sessions
    pub fn reset(&self) {
        self.with(|inner| {
            inner.session.reset();
            info!(
                seconds = inner.session.snapshot().seconds_remaining,
                "Session reset"
            );
        })
    }

    /// Change settings; the current countdown keeps its length
    pub fn update_config(&self, update: ConfigUpdate) {
        if update.is_empty() {
            return;
        }
        self.with(|inner| {
            inner.session.update_config(&update);
            info!(?update, "Configuration updated");
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        lock(&self.inner).session.snapshot()
    }

    pub fn config(&self) -> Config {
        lock(&self.inner).session.config().clone()
    }
}

impl Inner {
    fn on_tick(&mut self) -> Option<Transition> {
        let sounds = Arc::clone(&self.sounds);
        let transition = self.session.tick(sounds.as_ref());
        trace!(seconds = self.session.snapshot().seconds_remaining, "Tick");
        if let Some(t) = &transition {
            self.log_transition(t, "elapsed");
        }
        transition
    }

    fn on_beat(&self) {
        // A beat already queued when the timer was cancelled must stay silent
        if self.session.is_running() && self.session.phase() == Phase::Focus {
            self.sounds.click();
        }
    }

    fn log_transition(&self, t: &Transition, how: &str) {
        info!(
            from = t.from.as_str(),
            to = t.to.as_str(),
            sessions = t.sessions_completed,
            how,
            "Phase changed"
        );
        if t.goal_reached {
            info!(
                goal = self.session.config().goal_sessions,
                "Goal reached, timer stopped"
            );
        }
    }

    fn sync_timers(&mut self) {
        let want_tick = self.session.is_running();
        let want_beat = want_tick && self.session.phase() == Phase::Focus;

        if want_tick && self.tick_timer.is_none() {
            let this = self.this.clone();
            self.tick_timer = Some(self.scheduler.schedule(
                TICK_INTERVAL,
                Box::new(move || {
                    if let Some(inner) = this.upgrade() {
                        let mut inner = lock(&inner);
                        inner.on_tick();
                        inner.sync_timers();
                    }
                }),
            ));
            debug!("Tick timer started");
        } else if !want_tick && self.tick_timer.take().is_some() {
            debug!("Tick timer stopped");
        }

        if want_beat && self.beat_timer.is_none() {
            let this = self.this.clone();
            self.beat_timer = Some(self.scheduler.schedule(
                BEAT_INTERVAL,
                Box::new(move || {
                    if let Some(inner) = this.upgrade() {
                        lock(&inner).on_beat();
                    }
                }),
            ));
            debug!("Beat timer started");
        } else if !want_beat && self.beat_timer.take().is_some() {
            debug!("Beat timer stopped");
        }
    }
}
