//! Network latency monitor core: pings a fixed host once per interval, keeps a
//! rolling average of the round-trip time and exposes a display string plus a
//! run-at-startup toggle for a status-bar front end.

pub mod config;
pub mod error;
pub mod probe;
pub mod scheduler;
pub mod startup;
pub mod status;
pub mod tracker;

pub use error::{Error, Result};
