//! Admission control for order intake.
//!
//! The gate caches a "high load" verdict and re-samples memory pressure only
//! once the cached verdict is older than the sample interval. Overloaded
//! callers are turned away with a retry hint; nothing is queued.

use std::fs;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::app_system::{Config, RuntimeMode};

/// Source of "now" for the sampling window.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Reports memory in use as a fraction of the memory available to the process.
pub trait MemoryProbe: Send + Sync {
    fn used_ratio(&self) -> io::Result<f64>;
}

/// Reads resident set size from `/proc/self/status` and divides by either a
/// configured budget or `MemTotal` from `/proc/meminfo`.
pub struct ProcMemoryProbe {
    budget_bytes: Option<u64>,
}

impl ProcMemoryProbe {
    pub fn new(budget_bytes: Option<u64>) -> Self {
        Self { budget_bytes }
    }

    fn resident_bytes() -> io::Result<u64> {
        read_kib_field("/proc/self/status", "VmRSS:").map(|kib| kib * 1024)
    }

    fn total_bytes(&self) -> io::Result<u64> {
        match self.budget_bytes {
            Some(budget) => Ok(budget),
            None => read_kib_field("/proc/meminfo", "MemTotal:").map(|kib| kib * 1024),
        }
    }
}

impl MemoryProbe for ProcMemoryProbe {
    fn used_ratio(&self) -> io::Result<f64> {
        let total = self.total_bytes()?;
        if total == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "memory total is zero"));
        }
        Ok(Self::resident_bytes()? as f64 / total as f64)
    }
}

fn read_kib_field(path: &str, prefix: &str) -> io::Result<u64> {
    let text = fs::read_to_string(path)?;
    text.lines()
        .find_map(|line| line.strip_prefix(prefix))
        .and_then(parse_status_number)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("{prefix} missing in {path}")))
}

fn parse_status_number(input: &str) -> Option<u64> {
    input
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<u64>().ok())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePolicy {
    pub enabled: bool,
    pub sample_interval: Duration,
    /// Overloaded when the sampled ratio is strictly above this.
    pub threshold: f64,
    pub retry_after: Duration,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_interval: Duration::from_secs(5),
            threshold: 0.85,
            retry_after: Duration::from_secs(60),
        }
    }
}

impl GatePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.mode == RuntimeMode::Production,
            sample_interval: config.load_sample_interval,
            threshold: config.load_threshold,
            retry_after: config.retry_after,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Admitted,
    Overloaded { retry_after: Duration },
}

#[derive(Debug, Default)]
struct GateState {
    high_load: bool,
    last_sample: Option<Instant>,
}

pub struct LoadSheddingGate {
    policy: GatePolicy,
    clock: Arc<dyn Clock>,
    probe: Arc<dyn MemoryProbe>,
    state: Mutex<GateState>,
}

impl LoadSheddingGate {
    pub fn new(policy: GatePolicy, clock: Arc<dyn Clock>, probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            policy,
            clock,
            probe,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Gate reading real process memory, enabled only in production mode.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            GatePolicy::from_config(config),
            Arc::new(SystemClock),
            Arc::new(ProcMemoryProbe::new(config.memory_budget_bytes)),
        )
    }

    /// Gate that admits everything.
    pub fn disabled() -> Self {
        Self::new(
            GatePolicy { enabled: false, ..GatePolicy::default() },
            Arc::new(SystemClock),
            Arc::new(ProcMemoryProbe::new(None)),
        )
    }

    pub fn admit(&self) -> Admission {
        if !self.policy.enabled {
            return Admission::Admitted;
        }

        if self.is_high_load() {
            Admission::Overloaded { retry_after: self.policy.retry_after }
        } else {
            Admission::Admitted
        }
    }

    fn is_high_load(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let stale = state
            .last_sample
            .map_or(true, |last| now.saturating_duration_since(last) > self.policy.sample_interval);
        if !stale {
            return state.high_load;
        }

        state.high_load = match self.probe.used_ratio() {
            Ok(ratio) => {
                let high = ratio > self.policy.threshold;
                if high {
                    warn!(ratio, threshold = self.policy.threshold, "Memory pressure above threshold");
                } else {
                    debug!(ratio, "Memory pressure sampled");
                }
                high
            }
            Err(e) => {
                warn!(error = %e, "Memory probe failed, admitting traffic");
                false
            }
        };
        state.last_sample = Some(now);
        state.high_load
    }
}
