//! Recurring poll task for a device adapter
//!
//! The fixed cadence is also the retry mechanism: an unreachable app is
//! simply asked again on the next tick. Ticks that fall due while a poll is
//! still running are skipped, never queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::AdapterConfig;
use crate::device::{DeviceAdapter, PollOutcome};

#[derive(Debug, Default)]
struct PollStats {
    polls: AtomicU64,
    skipped: AtomicU64,
    unavailable: AtomicU64,
}

/// Background task calling [`DeviceAdapter::poll_device`] on an interval
#[derive(Debug)]
pub struct PollingTask {
    device_id: String,
    interval: Duration,
    task_handle: JoinHandle<()>,
    shutdown_signal: Arc<AtomicBool>,
    started_at: SystemTime,
    stats: Arc<PollStats>,
}

impl PollingTask {
    /// Start polling with the interval from `config`
    pub fn for_adapter(adapter: Arc<DeviceAdapter>, config: &AdapterConfig) -> Self {
        if !config.is_consistent() {
            tracing::warn!(
                "[{}] Request timeout {:?} exceeds poll interval {:?}; slow ticks will be skipped",
                adapter.log_id(),
                config.request_timeout,
                config.poll_interval
            );
        }
        Self::start(adapter, config.poll_interval)
    }

    /// Spawn the polling loop. Must be called inside a tokio runtime.
    pub fn start(adapter: Arc<DeviceAdapter>, interval: Duration) -> Self {
        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(PollStats::default());
        let device_id = adapter.identifier().to_string();

        let task_handle = tokio::spawn(Self::polling_loop(
            adapter,
            interval,
            Arc::clone(&shutdown_signal),
            Arc::clone(&stats),
        ));

        Self {
            device_id,
            interval,
            task_handle,
            shutdown_signal,
            started_at: SystemTime::now(),
            stats,
        }
    }

    async fn polling_loop(
        adapter: Arc<DeviceAdapter>,
        interval: Duration,
        shutdown_signal: Arc<AtomicBool>,
        stats: Arc<PollStats>,
    ) {
        tracing::debug!("[{}] Polling every {:?}", adapter.log_id(), interval);

        // tokio::time::interval panics on a zero period
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the connection was just established
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if shutdown_signal.load(Ordering::Relaxed) {
                break;
            }

            match adapter.poll_device().await {
                PollOutcome::Skipped => {
                    stats.skipped.fetch_add(1, Ordering::Relaxed);
                }
                PollOutcome::Unavailable => {
                    stats.polls.fetch_add(1, Ordering::Relaxed);
                    stats.unavailable.fetch_add(1, Ordering::Relaxed);
                }
                PollOutcome::Updated(_) => {
                    stats.polls.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        tracing::debug!("[{}] Polling stopped", adapter.log_id());
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Polls that actually ran
    pub fn poll_count(&self) -> u64 {
        self.stats.polls.load(Ordering::Relaxed)
    }

    /// Polls that ended with the device unavailable
    pub fn unavailable_count(&self) -> u64 {
        self.stats.unavailable.load(Ordering::Relaxed)
    }

    /// Polls skipped because another one was in flight
    pub fn skipped_count(&self) -> u64 {
        self.stats.skipped.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.task_handle.is_finished()
    }

    /// Stop polling. An in-flight request is abandoned.
    pub fn stop(&self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        self.task_handle.abort();
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.stop();
    }
}
