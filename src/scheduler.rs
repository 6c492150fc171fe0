// Probe cycle scheduling.
//
// One owner task holds the tracker, drives the ticker and applies completed
// cycles. Probes run on the blocking pool and report back over a channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::probe::{OutputParser, ProbeResult, ProbeRunner, Sample};
use crate::tracker::{DisplayState, LatencyTracker};

/// What a finished cycle produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    Sample(Sample),
    NoSample,
    LaunchFailure,
}

#[derive(Debug)]
struct CompletedCycle {
    seq: u64,
    outcome: CycleOutcome,
}

/// State published to the presentation side after every applied cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub display: String,
    pub state: DisplayState,
    pub samples: usize,
    pub last_cycle: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    fn from_tracker(tracker: &LatencyTracker, last_cycle: Option<u64>) -> Self {
        Self {
            display: tracker.display(),
            state: tracker.state(),
            samples: tracker.len(),
            last_cycle,
            updated_at: last_cycle.map(|_| Utc::now()),
        }
    }
}

/// Admits completed cycles only in increasing sequence order.
#[derive(Debug, Default)]
pub struct CycleSequencer {
    last_applied: Option<u64>,
}

impl CycleSequencer {
    pub fn admit(&mut self, seq: u64) -> bool {
        if self.last_applied.is_some_and(|last| seq <= last) {
            return false;
        }
        self.last_applied = Some(seq);
        true
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }
}

/// Route one outcome into the tracker.
pub fn apply_outcome(tracker: &mut LatencyTracker, outcome: CycleOutcome) {
    match outcome {
        CycleOutcome::Sample(sample) => tracker.update(sample),
        CycleOutcome::NoSample | CycleOutcome::LaunchFailure => tracker.record_failure(),
    }
}

pub struct Scheduler<R, P> {
    runner: Arc<R>,
    parser: Arc<P>,
    interval: Duration,
}

impl<R: ProbeRunner, P: OutputParser> Scheduler<R, P> {
    pub fn new(runner: R, parser: P, interval: Duration) -> Self {
        Self {
            runner: Arc::new(runner),
            parser: Arc::new(parser),
            interval,
        }
    }

    /// Start ticking. The first cycle fires immediately.
    pub fn spawn(self, tracker: LatencyTracker) -> MonitorHandle {
        let (status_tx, status_rx) = watch::channel(StatusSnapshot::from_tracker(&tracker, None));
        let task = tokio::spawn(self.run(tracker, status_tx));
        MonitorHandle { status: status_rx, task }
    }

    async fn run(self, mut tracker: LatencyTracker, status: watch::Sender<StatusSnapshot>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<CompletedCycle>();
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sequencer = CycleSequencer::default();
        let mut next_seq: u64 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    next_seq += 1;
                    self.issue(next_seq, done_tx.clone());
                }
                Some(done) = done_rx.recv() => {
                    if !sequencer.admit(done.seq) {
                        debug!("Dropping stale cycle {} (last applied {:?})", done.seq, sequencer.last_applied());
                        continue;
                    }
                    apply_outcome(&mut tracker, done.outcome);
                    debug!("Cycle {}: {:?} -> {}", done.seq, done.outcome, tracker.display());
                    status.send_replace(StatusSnapshot::from_tracker(&tracker, Some(done.seq)));
                }
            }
        }
    }

    fn issue(&self, seq: u64, done: mpsc::UnboundedSender<CompletedCycle>) {
        let runner = Arc::clone(&self.runner);
        let parser = Arc::clone(&self.parser);

        tokio::spawn(async move {
            let outcome = match tokio::task::spawn_blocking(move || runner.run()).await {
                Ok(ProbeResult::Output(text)) => parser
                    .parse(&text)
                    .map_or(CycleOutcome::NoSample, CycleOutcome::Sample),
                Ok(ProbeResult::LaunchFailure) => CycleOutcome::LaunchFailure,
                Err(e) => {
                    warn!("Probe worker for cycle {} failed: {}", seq, e);
                    CycleOutcome::LaunchFailure
                }
            };
            // The owner only goes away at shutdown.
            let _ = done.send(CompletedCycle { seq, outcome });
        });
    }
}

/// Handle to a running monitor.
pub struct MonitorHandle {
    status: watch::Receiver<StatusSnapshot>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.status.clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.status.borrow().clone()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::TimeMarkerParser;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedRunner {
        replies: Vec<ProbeResult>,
        calls: AtomicUsize,
    }

    impl ScriptedRunner {
        fn new(replies: Vec<ProbeResult>) -> Self {
            Self { replies, calls: AtomicUsize::new(0) }
        }
    }

    impl ProbeRunner for ScriptedRunner {
        fn run(&self) -> ProbeResult {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies[n.min(self.replies.len() - 1)].clone()
        }
    }

    fn reply(ms: f64) -> ProbeResult {
        ProbeResult::Output(format!("64 bytes from 1.1.1.1: icmp_seq=1 ttl=59 time={} ms\n", ms))
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<StatusSnapshot>, mut pred: F) -> StatusSnapshot
    where
        F: FnMut(&StatusSnapshot) -> bool,
    {
        time::timeout(Duration::from_secs(5), async {
            loop {
                if pred(&*rx.borrow_and_update()) {
                    return rx.borrow().clone();
                }
                rx.changed().await.expect("monitor stopped");
            }
        })
        .await
        .expect("timed out waiting for status")
    }

    #[test]
    fn test_sequencer_drops_stale_and_duplicate() {
        let mut seq = CycleSequencer::default();
        assert!(seq.admit(1));
        assert!(seq.admit(3));
        assert!(!seq.admit(2));
        assert!(!seq.admit(3));
        assert!(seq.admit(4));
        assert_eq!(seq.last_applied(), Some(4));
    }

    #[test]
    fn test_apply_outcome_routes_failures() {
        let mut tracker = LatencyTracker::new(5);
        apply_outcome(&mut tracker, CycleOutcome::Sample(Sample::from_millis(8.0).unwrap()));
        assert_eq!(tracker.state(), DisplayState::Average(8.0));

        apply_outcome(&mut tracker, CycleOutcome::NoSample);
        assert_eq!(tracker.state(), DisplayState::Failed);

        apply_outcome(&mut tracker, CycleOutcome::Sample(Sample::from_millis(2.0).unwrap()));
        apply_outcome(&mut tracker, CycleOutcome::LaunchFailure);
        assert_eq!(tracker.state(), DisplayState::Failed);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_initial_snapshot_has_no_cycle() {
        let snapshot = StatusSnapshot::from_tracker(&LatencyTracker::new(5), None);
        assert_eq!(snapshot.display, "…");
        assert_eq!(snapshot.last_cycle, None);
        assert!(snapshot.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_samples_reach_the_tracker() {
        let runner = ScriptedRunner::new(vec![reply(10.0), reply(20.0), reply(30.0)]);
        let scheduler = Scheduler::new(runner, TimeMarkerParser, Duration::from_millis(20));
        let handle = scheduler.spawn(LatencyTracker::new(5));
        let mut rx = handle.subscribe();

        let snapshot = wait_for(&mut rx, |s| s.samples >= 3).await;
        assert!(matches!(snapshot.state, DisplayState::Average(_)));
        assert!(snapshot.last_cycle.is_some_and(|seq| seq >= 3));
        handle.abort();
    }

    #[tokio::test]
    async fn test_launch_failure_reports_failed() {
        let runner = ScriptedRunner::new(vec![reply(12.0), ProbeResult::LaunchFailure]);
        let scheduler = Scheduler::new(runner, TimeMarkerParser, Duration::from_millis(20));
        let handle = scheduler.spawn(LatencyTracker::new(5));
        let mut rx = handle.subscribe();

        let snapshot = wait_for(&mut rx, |s| s.state == DisplayState::Failed).await;
        assert_eq!(snapshot.display, "✕");
        assert_eq!(snapshot.samples, 0);
    }

    #[tokio::test]
    async fn test_unparseable_output_reports_failed() {
        let runner = ScriptedRunner::new(vec![ProbeResult::Output(String::new())]);
        let scheduler = Scheduler::new(runner, TimeMarkerParser, Duration::from_millis(20));
        let handle = scheduler.spawn(LatencyTracker::new(5));
        let mut rx = handle.subscribe();

        let snapshot = wait_for(&mut rx, |s| s.last_cycle.is_some()).await;
        assert_eq!(snapshot.state, DisplayState::Failed);
    }
}
