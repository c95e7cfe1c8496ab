// hunt_tracker_core/server/src/tracker/runtime.rs
//
// Periodic task driver for one tracker: the 1-second tracking/charge tick and
// the 0.5-second restriction tick. stop() halts both tasks before the tracker
// tears its caches down, so no tick ever observes half-cleared state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::core::constants::{RESTRICTION_TICK_INTERVAL, SLOW_TICK_LOG_MS, TRACK_TICK_INTERVAL};
use crate::core::error::TrackerResult;

use super::ModeTracker;

pub struct TrackerRuntime {
    tracker: Arc<dyn ModeTracker>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
}

impl TrackerRuntime {
    pub fn new(tracker: Arc<dyn ModeTracker>) -> Self {
        TrackerRuntime {
            tracker,
            tasks: Mutex::new(Vec::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn tracker(&self) -> Arc<dyn ModeTracker> {
        Arc::clone(&self.tracker)
    }

    /// Starts the tracker and its periodic tasks. Must be called from within
    /// a tokio runtime. Ok(false) when the mode's flag is unset.
    pub fn start(&self) -> TrackerResult<bool> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(true);
        }
        if !self.tracker.start(Instant::now())? {
            self.running.store(false, Ordering::SeqCst);
            return Ok(false);
        }

        let track_task = {
            let tracker = Arc::clone(&self.tracker);
            let running = Arc::clone(&self.running);
            tokio::spawn(async move {
                let mut ticker = interval(TRACK_TICK_INTERVAL);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    let began = Instant::now();
                    tracker.tick(Instant::now());
                    let elapsed = began.elapsed();
                    if elapsed.as_millis() as u64 > SLOW_TICK_LOG_MS {
                        warn!("tracking tick took {:?}", elapsed);
                    }
                }
            })
        };

        let restriction_task = {
            let tracker = Arc::clone(&self.tracker);
            let running = Arc::clone(&self.running);
            tokio::spawn(async move {
                let mut ticker = interval(RESTRICTION_TICK_INTERVAL);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    tracker.restriction_tick(Instant::now());
                }
            })
        };

        let mut tasks = self.tasks.lock();
        tasks.push(track_task);
        tasks.push(restriction_task);
        info!("tracker runtime started");
        Ok(true)
    }

    /// Idempotent. Awaits both periodic tasks before the tracker clears its
    /// shared caches.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            task.abort();
            let _ = task.await;
        }
        self.tracker.stop();
        info!("tracker runtime stopped");
    }
}
