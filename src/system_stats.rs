use sysinfo::System;
use tokio::sync::Mutex;

use crate::procmon::ProcmonReport;

/// Samples this machine for the procmon endpoint.
///
/// CPU usage is a delta between refreshes, so one `System` is kept for the
/// lifetime of the server and every request refreshes the same instance.
pub struct SystemSampler {
    sys: Mutex<System>,
}

impl SystemSampler {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Prime the cpu list so the first request has a baseline
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
        }
    }

    pub async fn sample(&self) -> ProcmonReport {
        let mut sys = self.sys.lock().await;
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let cpu_usage = sys
            .cpus()
            .iter()
            .map(|cpu| f64::from(cpu.cpu_usage()))
            .collect();

        let ram_usage = usage_percent(
            sys.total_memory(),
            sys.total_memory().saturating_sub(sys.available_memory()),
        );
        let swap_usage = usage_percent(
            sys.total_swap(),
            sys.total_swap().saturating_sub(sys.free_swap()),
        );

        ProcmonReport {
            cpu_usage,
            ram_usage,
            swap_usage: Some(swap_usage),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// `used / total` as a percentage; 0 when there is nothing to measure.
pub fn usage_percent(total: u64, used: u64) -> f64 {
    if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}
