//! Process resource monitoring
//!
//! Periodically samples the server process's CPU and memory usage with
//! `sysinfo` and reports it through tracing. Scope is the current process
//! only, not the whole machine.

use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::time;
use tracing::info;

pub struct MonitorConfig {
    /// Sampling interval in seconds
    pub interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval_secs: 120 }
    }
}

/// Background task reporting process resource usage at a fixed interval.
/// Spawn it once at startup; it never returns.
pub async fn start_process_monitoring(config: MonitorConfig) {
    info!(
        "Starting process monitoring with interval: {} seconds",
        config.interval_secs
    );

    let mut sys = System::new_all();
    let current_pid = Pid::from_u32(std::process::id());

    let mut interval = time::interval(Duration::from_secs(config.interval_secs));
    // The first tick fires immediately; skip it so samples are spaced
    // evenly.
    interval.tick().await;

    loop {
        interval.tick().await;

        sys.refresh_processes(ProcessesToUpdate::Some(&[current_pid]), true);
        if let Some(process) = sys.process(current_pid) {
            info!(
                cpu_percent = process.cpu_usage(),
                memory_mb = process.memory() as f64 / (1024.0 * 1024.0),
                "process resource usage"
            );
        }
    }
}
