use log::{error, info};
use pingbar::config::MonitorConfig;
use pingbar::probe::{PingRunner, TimeMarkerParser};
use pingbar::scheduler::Scheduler;
use pingbar::startup::StartupRegistrar;
use pingbar::status::StatusPanel;
use pingbar::tracker::LatencyTracker;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = MonitorConfig::default();

    let registrar = match StartupRegistrar::for_current_user(&config.app_id) {
        Ok(registrar) => Some(registrar),
        Err(e) => {
            error!("Run at startup unavailable: {}", e);
            None
        }
    };

    let runner = PingRunner::new(&config.target);
    info!(
        "Probing with `{}` every {:?}, averaging the last {} samples",
        runner.command_line(),
        config.interval,
        config.window_size
    );

    let monitor = Scheduler::new(runner, TimeMarkerParser, config.interval)
        .spawn(LatencyTracker::new(config.window_size));
    let mut updates = monitor.subscribe();
    let panel = StatusPanel::new(&config.target, monitor.subscribe(), registrar);
    info!("Run at startup: {}", if panel.startup_enabled() { "on" } else { "off" });

    let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<()>();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let mut last_display = String::new();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if snapshot.display == last_display {
                    continue;
                }
                last_display = snapshot.display.clone();
                match serde_json::to_string(&snapshot) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Failed to encode status: {}", e),
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    let report = panel.show_status();
    info!("{}: {}", report.title, report.detail);
    monitor.abort();
}
