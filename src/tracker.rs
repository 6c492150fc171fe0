use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::probe::Sample;

const UNKNOWN_MARKER: &str = "…";
const FAILED_MARKER: &str = "✕";

/// What the status bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "ms", rename_all = "snake_case")]
pub enum DisplayState {
    /// No sample received yet.
    Unknown,
    /// Mean of the samples currently in the window.
    Average(f64),
    /// The last applied cycle produced no sample.
    Failed,
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayState::Unknown => f.write_str(UNKNOWN_MARKER),
            DisplayState::Average(ms) => write!(f, "{:.1} ms", ms),
            DisplayState::Failed => f.write_str(FAILED_MARKER),
        }
    }
}

/// Rolling average over the most recent samples.
///
/// A failure clears the window so pre-outage samples never dilute the average
/// once connectivity comes back.
#[derive(Debug)]
pub struct LatencyTracker {
    window: VecDeque<Sample>,
    window_size: usize,
    state: DisplayState,
}

impl LatencyTracker {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window: VecDeque::with_capacity(window_size + 1),
            window_size,
            state: DisplayState::Unknown,
        }
    }

    pub fn update(&mut self, sample: Sample) {
        self.window.push_back(sample);
        while self.window.len() > self.window_size {
            self.window.pop_front();
        }
        let sum: f64 = self.window.iter().map(|s| s.millis()).sum();
        self.state = DisplayState::Average(sum / self.window.len() as f64);
    }

    pub fn record_failure(&mut self) {
        self.window.clear();
        self.state = DisplayState::Failed;
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn display(&self) -> String {
        self.state.to_string()
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.window.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}
