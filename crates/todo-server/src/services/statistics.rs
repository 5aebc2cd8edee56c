//! Request statistics accumulated over a rolling window
//!
//! Counts live behind a single mutex shared by request handlers and the flush
//! timer. A flush swaps the whole window under that lock, so every `record`
//! lands in exactly one window. Closed windows travel to the sink over a
//! bounded channel and never hold up the counting path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use todo_core::{EventCategory, StatSnapshot, StatsSink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Closed windows waiting for the sink before new ones are dropped
const SNAPSHOT_BUFFER: usize = 16;

/// How long shutdown waits on the sink before giving up on it
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

struct StatWindow {
    start: DateTime<Utc>,
    counts: BTreeMap<EventCategory, u64>,
}

impl StatWindow {
    fn open(start: DateTime<Utc>) -> Self {
        Self {
            start,
            counts: EventCategory::ALL.iter().map(|c| (*c, 0)).collect(),
        }
    }

    fn snapshot(&self, duration: Duration) -> StatSnapshot {
        StatSnapshot {
            start: self.start,
            duration_ms: duration.as_millis() as u64,
            counts: self.counts.clone(),
        }
    }
}

pub struct StatisticsAccumulator {
    duration: Duration,
    window: Mutex<StatWindow>,
}

impl StatisticsAccumulator {
    pub fn new(duration: Duration) -> Self {
        Self {
            // tokio intervals reject a zero period
            duration: duration.max(Duration::from_millis(1)),
            window: Mutex::new(StatWindow::open(Utc::now())),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Count one event in the current window
    pub fn record(&self, category: EventCategory) {
        let mut window = self.lock();
        *window.counts.entry(category).or_insert(0) += 1;
    }

    /// Copy of the current window, without resetting it
    pub fn snapshot(&self) -> StatSnapshot {
        self.lock().snapshot(self.duration)
    }

    /// Close the current window and open a zeroed one.
    ///
    /// The new window starts no earlier than one full duration after the
    /// closed one.
    pub fn flush(&self) -> StatSnapshot {
        let mut window = self.lock();

        // Starts only ratchet forward. After a backwards wall-clock step the
        // reported starts stay ahead of real time by that step for the rest
        // of the process; a late tick does not drift because `now` wins.
        let now = Utc::now();
        let scheduled = chrono::Duration::from_std(self.duration)
            .ok()
            .and_then(|d| window.start.checked_add_signed(d))
            .unwrap_or(now);
        let closed = std::mem::replace(&mut *window, StatWindow::open(now.max(scheduled)));
        drop(window);

        closed.snapshot(self.duration)
    }

    /// Start the flush timer and the delivery task feeding `sink`.
    pub fn spawn(self: &Arc<Self>, sink: Arc<dyn StatsSink>) -> FlushTasks {
        let (tx, mut rx) = mpsc::channel::<StatSnapshot>(SNAPSHOT_BUFFER);

        let accumulator = Arc::clone(self);
        let ticker = tokio::spawn(async move {
            let period = accumulator.duration;
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let snapshot = accumulator.flush();
                debug!("Statistics window closed with {} events", snapshot.total());
                if let Err(e) = tx.try_send(snapshot) {
                    warn!("Dropping statistics snapshot: {}", e);
                }
            }
        });

        let delivery_sink = Arc::clone(&sink);
        let delivery = tokio::spawn(async move {
            while let Some(snapshot) = rx.recv().await {
                if let Err(e) = delivery_sink.emit(snapshot).await {
                    warn!("Statistics sink failed: {}", e);
                }
            }
        });

        FlushTasks {
            accumulator: Arc::clone(self),
            sink,
            ticker,
            delivery,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StatWindow> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background tasks started by [`StatisticsAccumulator::spawn`]
pub struct FlushTasks {
    accumulator: Arc<StatisticsAccumulator>,
    sink: Arc<dyn StatsSink>,
    ticker: JoinHandle<()>,
    delivery: JoinHandle<()>,
}

impl FlushTasks {
    /// Stop the timer, drain pending snapshots, then emit the open window.
    pub async fn shutdown(self) {
        self.shutdown_within(DRAIN_TIMEOUT).await
    }

    /// Like [`FlushTasks::shutdown`], but a sink still busy after `limit`
    /// is abandoned along with whatever it had not delivered.
    pub async fn shutdown_within(mut self, limit: Duration) {
        self.ticker.abort();
        let _ = (&mut self.ticker).await;

        let deadline = Instant::now() + limit;
        if tokio::time::timeout_at(deadline, &mut self.delivery)
            .await
            .is_err()
        {
            warn!(
                "Statistics sink did not drain within {:?}, dropping pending snapshots",
                limit
            );
            self.delivery.abort();
        }

        let last = self.accumulator.flush();
        match tokio::time::timeout_at(deadline, self.sink.emit(last)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Statistics sink failed on shutdown: {}", e),
            Err(_) => warn!("Statistics sink timed out on shutdown, last window dropped"),
        }
    }
}

/// Sink writing one structured log line per window
pub struct LogSink;

#[async_trait]
impl StatsSink for LogSink {
    async fn emit(&self, snapshot: StatSnapshot) -> todo_core::Result<()> {
        info!(
            target: "statistics",
            start = %snapshot.start,
            duration_ms = snapshot.duration_ms,
            create = snapshot.count(EventCategory::Create),
            read = snapshot.count(EventCategory::Read),
            update = snapshot.count(EventCategory::Update),
            delete = snapshot.count(EventCategory::Delete),
            error = snapshot.count(EventCategory::Error),
            total = snapshot.total(),
            "request statistics"
        );
        Ok(())
    }
}
