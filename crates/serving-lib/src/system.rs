//! Process resource usage sampling
//!
//! Reads CPU time and resident memory for the current process straight from
//! procfs:
//! - /proc/self/stat for cumulative utime/stime ticks
//! - /proc/self/status for VmRSS
//!
//! CPU utilization is derived from the tick delta between two consecutive
//! samples, so the first sample always reports 0.0.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use tokio::fs;

/// Kernel USER_HZ; /proc/<pid>/stat reports CPU time in these ticks
const TICKS_PER_SECOND: f64 = 100.0;

/// A single CPU/memory reading
#[derive(Debug, Clone, Copy)]
pub struct ProcessStats {
    /// CPU utilization since the previous sample, in percent
    pub cpu_percent: f64,
    /// Resident set size in bytes
    pub rss_bytes: u64,
}

struct CpuSample {
    total_ticks: u64,
    taken_at: Instant,
}

/// Samples the current process from a procfs directory
pub struct ProcessStatsReader {
    proc_self: PathBuf,
    last_sample: Mutex<Option<CpuSample>>,
}

impl Default for ProcessStatsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessStatsReader {
    pub fn new() -> Self {
        Self::with_proc_self("/proc/self")
    }

    /// Create a reader with a custom proc directory (for testing)
    pub fn with_proc_self(path: impl Into<PathBuf>) -> Self {
        Self {
            proc_self: path.into(),
            last_sample: Mutex::new(None),
        }
    }

    /// Take a fresh sample of CPU utilization and resident memory
    pub async fn sample(&self) -> Result<ProcessStats> {
        let stat_path = self.proc_self.join("stat");
        let stat = fs::read_to_string(&stat_path)
            .await
            .with_context(|| format!("Failed to read {}", stat_path.display()))?;
        let status_path = self.proc_self.join("status");
        let status = fs::read_to_string(&status_path)
            .await
            .with_context(|| format!("Failed to read {}", status_path.display()))?;

        let total_ticks = parse_cpu_ticks(&stat)?;
        let rss_bytes = parse_rss_bytes(&status)?;
        let now = Instant::now();

        let mut last = self
            .last_sample
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;

        let cpu_percent = match last.as_ref() {
            Some(prev) => {
                let wall_secs = now.duration_since(prev.taken_at).as_secs_f64();
                if wall_secs > 0.0 {
                    let cpu_secs =
                        total_ticks.saturating_sub(prev.total_ticks) as f64 / TICKS_PER_SECOND;
                    cpu_secs / wall_secs * 100.0
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        *last = Some(CpuSample {
            total_ticks,
            taken_at: now,
        });

        Ok(ProcessStats {
            cpu_percent,
            rss_bytes,
        })
    }
}

/// Parse cumulative utime + stime ticks from /proc/<pid>/stat.
/// The comm field can contain spaces, so fields are counted from the last
/// closing parenthesis.
pub fn parse_cpu_ticks(content: &str) -> Result<u64> {
    let after_comm = content
        .rfind(')')
        .map(|i| &content[i + 1..])
        .context("Malformed stat line: no comm field")?;
    let fields: Vec<&str> = after_comm.split_whitespace().collect();

    // utime and stime are overall fields 14 and 15; the slice starts at
    // field 3 (state), so they land at indices 11 and 12
    let utime: u64 = fields
        .get(11)
        .context("stat line too short for utime")?
        .parse()
        .context("Failed to parse utime")?;
    let stime: u64 = fields
        .get(12)
        .context("stat line too short for stime")?
        .parse()
        .context("Failed to parse stime")?;

    Ok(utime + stime)
}

/// Parse VmRSS from /proc/<pid>/status, converted to bytes
pub fn parse_rss_bytes(content: &str) -> Result<u64> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kib: u64 = rest
                .trim()
                .trim_end_matches("kB")
                .trim()
                .parse()
                .context("Failed to parse VmRSS value")?;
            return Ok(kib * 1024);
        }
    }
    anyhow::bail!("VmRSS not found in status file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn stat_line(utime: u64, stime: u64) -> String {
        format!(
            "1234 (survival server) S 1 1234 1234 0 -1 4194304 500 0 0 0 {} {} 0 0 20 0 4 0 100 1000000 250 18446744073709551615",
            utime, stime
        )
    }

    #[test]
    fn test_parse_cpu_ticks() {
        assert_eq!(parse_cpu_ticks(&stat_line(120, 30)).unwrap(), 150);
    }

    #[test]
    fn test_parse_cpu_ticks_comm_with_parens() {
        let line = "77 (weird) name)) R 1 77 77 0 -1 0 0 0 0 0 40 2 0 0 20 0 1 0 5 0 0 0";
        assert_eq!(parse_cpu_ticks(line).unwrap(), 42);
    }

    #[test]
    fn test_parse_cpu_ticks_malformed() {
        assert!(parse_cpu_ticks("no comm here").is_err());
        assert!(parse_cpu_ticks("1 (x) S 1 2").is_err());
    }

    #[test]
    fn test_parse_rss_bytes() {
        let content = "Name:\tsurvival-server\nVmPeak:\t  20480 kB\nVmRSS:\t   4096 kB\nThreads:\t4\n";
        assert_eq!(parse_rss_bytes(content).unwrap(), 4096 * 1024);
    }

    #[test]
    fn test_parse_rss_missing() {
        assert!(parse_rss_bytes("Name:\tfoo\n").is_err());
    }

    #[tokio::test]
    async fn test_first_sample_reports_zero_cpu() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stat"), stat_line(100, 50)).unwrap();
        std::fs::write(dir.path().join("status"), "VmRSS:\t 2048 kB\n").unwrap();

        let reader = ProcessStatsReader::with_proc_self(dir.path());
        let stats = reader.sample().await.unwrap();

        assert_eq!(stats.cpu_percent, 0.0);
        assert_eq!(stats.rss_bytes, 2048 * 1024);
    }

    #[tokio::test]
    async fn test_cpu_percent_rises_with_tick_delta() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stat"), stat_line(100, 50)).unwrap();
        std::fs::write(dir.path().join("status"), "VmRSS:\t 2048 kB\n").unwrap();

        let reader = ProcessStatsReader::with_proc_self(dir.path());
        reader.sample().await.unwrap();

        std::fs::write(dir.path().join("stat"), stat_line(150, 75)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let stats = reader.sample().await.unwrap();

        assert!(stats.cpu_percent > 0.0, "expected positive CPU percent");
    }

    #[tokio::test]
    async fn test_missing_proc_files() {
        let dir = tempfile::tempdir().unwrap();
        let reader = ProcessStatsReader::with_proc_self(dir.path());
        assert!(reader.sample().await.is_err());
    }
}
