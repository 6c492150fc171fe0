use std::process::Command;

use log::warn;

/// Raw result of one probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// Captured stdout, possibly empty. Exit status is not inspected.
    Output(String),
    /// The command could not be started.
    LaunchFailure,
}

/// Runs one probe and blocks until it finishes.
pub trait ProbeRunner: Send + Sync + 'static {
    fn run(&self) -> ProbeResult;
}

/// Spawns the system `ping` for a single echo request.
pub struct PingRunner {
    program: String,
    args: Vec<String>,
}

impl PingRunner {
    pub fn new(target: &str) -> Self {
        Self::with_command("ping", ["-c", "1", target])
    }

    /// Run an arbitrary command in place of `ping`.
    pub fn with_command<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ProbeRunner for PingRunner {
    fn run(&self) -> ProbeResult {
        match Command::new(&self.program).args(&self.args).output() {
            Ok(output) => ProbeResult::Output(String::from_utf8_lossy(&output.stdout).into_owned()),
            Err(e) => {
                warn!("Failed to launch `{}`: {}", self.command_line(), e);
                ProbeResult::LaunchFailure
            }
        }
    }
}
