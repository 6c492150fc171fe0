// Presentation boundary: what a status-bar front end reads and triggers.

use log::error;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::Result;
use crate::scheduler::StatusSnapshot;
use crate::startup::StartupRegistrar;
use crate::tracker::DisplayState;

/// Text for an informational "show status" alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub title: String,
    pub detail: String,
}

pub struct StatusPanel {
    target: String,
    status: watch::Receiver<StatusSnapshot>,
    registrar: Option<StartupRegistrar>,
}

impl StatusPanel {
    /// `registrar` is `None` when the descriptor location could not be resolved;
    /// the toggle then reads as off and cannot be flipped.
    pub fn new(
        target: &str,
        status: watch::Receiver<StatusSnapshot>,
        registrar: Option<StartupRegistrar>,
    ) -> Self {
        Self {
            target: target.to_string(),
            status,
            registrar,
        }
    }

    pub fn display_text(&self) -> String {
        self.status.borrow().display.clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.status.borrow().clone()
    }

    pub fn startup_enabled(&self) -> bool {
        self.registrar.as_ref().is_some_and(StartupRegistrar::is_enabled)
    }

    pub fn startup_available(&self) -> bool {
        self.registrar.is_some()
    }

    /// Flip run-at-startup. Returns the new state; does nothing without a registrar.
    pub fn toggle_startup(&self) -> Result<bool> {
        let Some(registrar) = &self.registrar else {
            return Ok(false);
        };
        registrar.toggle().map_err(|e| {
            error!("Failed to toggle run at startup: {}", e);
            e
        })
    }

    pub fn show_status(&self) -> StatusReport {
        let snapshot = self.status.borrow();
        let title = format!("Latency to {}", self.target);
        let detail = match snapshot.state {
            DisplayState::Unknown => "Waiting for the first probe".to_string(),
            DisplayState::Average(ms) => {
                let plural = if snapshot.samples == 1 { "" } else { "s" };
                format!("Average {:.1} ms over {} sample{}", ms, snapshot.samples, plural)
            }
            DisplayState::Failed => format!("No response from {}", self.target),
        };
        StatusReport { title, detail }
    }
}
