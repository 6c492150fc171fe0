use std::time::Duration;

/// Host probed every cycle.
pub const DEFAULT_TARGET: &str = "1.1.1.1";

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Number of samples kept in the rolling average.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Launch agent label, also used as the descriptor file stem.
pub const DEFAULT_APP_ID: &str = "com.pingbar.agent";

/// Fixed monitor settings. Not exposed to users; tests build their own.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub target: String,
    pub interval: Duration,
    pub window_size: usize,
    pub app_id: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            interval: DEFAULT_INTERVAL,
            window_size: DEFAULT_WINDOW_SIZE,
            app_id: DEFAULT_APP_ID.to_string(),
        }
    }
}
