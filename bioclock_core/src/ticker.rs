//! Background re-render tick.
//!
//! Spawns one thread that publishes the clock's current time every interval
//! over a bounded channel. The first tick is sent immediately. Dropping the
//! `Ticker` disconnects the shutdown channel and joins the thread, so the
//! thread never outlives its owner.
use crate::util::clamp_interval;
use bioclock_traits::Clock;
use chrono::{DateTime, Utc};
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub struct Ticker {
    rx: xch::Receiver<DateTime<Utc>>,
    ticks: Arc<AtomicU64>,
    /// Dropped to signal shutdown
    shutdown: Option<xch::Sender<()>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<C: Clock + Send + 'static>(interval: Duration, clock: C) -> Self {
        let interval = clamp_interval(interval);
        let (tx, rx) = xch::bounded(1);
        let (shutdown_tx, shutdown_rx) = xch::bounded::<()>(0);
        let ticks = Arc::new(AtomicU64::new(0));
        let ticks_clone = ticks.clone();

        let join_handle = std::thread::spawn(move || {
            loop {
                match tx.try_send(clock.now()) {
                    Ok(()) => {
                        ticks_clone.fetch_add(1, Ordering::Relaxed);
                    }
                    // Consumer has not drained the previous tick yet; skip this one
                    Err(xch::TrySendError::Full(_)) => {}
                    Err(xch::TrySendError::Disconnected(_)) => {
                        tracing::debug!("ticker consumer disconnected, exiting thread");
                        break;
                    }
                }
                match shutdown_rx.recv_timeout(interval) {
                    Err(xch::RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(xch::RecvTimeoutError::Disconnected) => {
                        tracing::debug!("ticker thread received shutdown signal");
                        break;
                    }
                }
            }
            tracing::trace!("ticker thread exiting cleanly");
        });

        Self {
            rx,
            ticks,
            shutdown: Some(shutdown_tx),
            join_handle: Some(join_handle),
        }
    }

    /// Newest pending tick, draining older ones.
    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.rx.try_iter().last()
    }

    /// Block up to `timeout` for the next tick.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DateTime<Utc>> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Ticks delivered into the channel so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        drop(self.shutdown.take());
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("ticker thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "ticker thread panicked during shutdown");
                }
            }
        }
    }
}
