// Probe modules: run the external ping, scrape its output
pub mod parser;
pub mod runner;

pub use parser::{OutputParser, Sample, TimeMarkerParser};
pub use runner::{PingRunner, ProbeResult, ProbeRunner};
