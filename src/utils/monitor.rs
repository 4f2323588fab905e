#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
const MIB: u64 = 1024 * 1024;

/// One sample of this process, taken between pipeline phases.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub cpu_percent: f32,
    pub rss_mb: u64,
    pub rss_percent: f32,
    pub peak_rss_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
struct Sampler {
    system: System,
    peak_rss_mb: u64,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    sampler: Option<Mutex<Sampler>>,
    pid: Option<Pid>,
    started: Instant,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    /// A disabled monitor never touches sysinfo.
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid().ok()
        } else {
            None
        };
        let sampler = enabled.then(|| {
            let mut system = System::new();
            system.refresh_memory();
            if let Some(pid) = pid {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            }
            Mutex::new(Sampler {
                system,
                peak_rss_mb: 0,
            })
        });

        Self {
            sampler,
            pid,
            started: Instant::now(),
        }
    }

    pub fn get_stats(&self) -> Option<PhaseStats> {
        let pid = self.pid?;
        let mut sampler = self.sampler.as_ref()?.lock().ok()?;
        sampler.system.refresh_memory();
        sampler
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let process = sampler.system.process(pid)?;
        let cpu_percent = process.cpu_usage();
        let rss_mb = process.memory() / MIB;
        let total_mb = sampler.system.total_memory() / MIB;
        sampler.peak_rss_mb = sampler.peak_rss_mb.max(rss_mb);

        Some(PhaseStats {
            cpu_percent,
            rss_mb,
            rss_percent: if total_mb == 0 {
                0.0
            } else {
                rss_mb as f32 * 100.0 / total_mb as f32
            },
            peak_rss_mb: sampler.peak_rss_mb,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        let Some(stats) = self.get_stats() else {
            return;
        };
        tracing::info!(
            "📊 {}: CPU {:.1}%, RSS {}MB ({:.1}%), peak {}MB, {:?}",
            phase,
            stats.cpu_percent,
            stats.rss_mb,
            stats.rss_percent,
            stats.peak_rss_mb,
            stats.elapsed
        );
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Done in {:?}, peak RSS {}MB",
                stats.elapsed,
                stats.peak_rss_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sampler.is_some()
    }
}

// no-op outside the CLI build
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = SystemMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.get_stats().is_none());
    }

    #[test]
    fn test_peak_never_drops_below_current() {
        let monitor = SystemMonitor::new(true);
        assert!(monitor.is_enabled());
        if let Some(stats) = monitor.get_stats() {
            assert!(stats.peak_rss_mb >= stats.rss_mb);
        }
    }
}
