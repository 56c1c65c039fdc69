//! Admission control for the metered weather API.
//!
//! Two budgets apply at once: a sliding 60-second window capped at
//! `max_calls_per_minute`, and a monthly counter capped at `hard_limit` that
//! starts warning at `warn_threshold`. Only admitted calls change persisted
//! state.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::shared::errors::{DenyReason, StorageError};
use crate::shared::time::month_key;
use crate::storage::JsonStore;

pub const WINDOW_SECS: f64 = 60.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageLog {
    #[serde(default)]
    pub minute_window: Vec<f64>,
    #[serde(default)]
    pub monthly_count: u64,
    #[serde(default)]
    pub last_reset: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateLimits {
    pub max_calls_per_minute: usize,
    pub warn_threshold: u64,
    pub hard_limit: u64,
}

impl Default for GateLimits {
    fn default() -> Self {
        Self {
            max_calls_per_minute: 10,
            warn_threshold: 700_000,
            hard_limit: 900_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allowed { warning: Option<String> },
    Denied(DenyReason),
}

pub struct RateGate {
    store: JsonStore<UsageLog>,
    limits: GateLimits,
}

impl RateGate {
    pub fn open(path: impl Into<PathBuf>, limits: GateLimits) -> Self {
        Self {
            store: JsonStore::open(path),
            limits,
        }
    }

    pub fn limits(&self) -> GateLimits {
        self.limits
    }

    pub fn monthly_count(&self) -> u64 {
        self.store.read().monthly_count
    }

    /// Decides whether one metered call may proceed at `now`.
    ///
    /// The month rolls over before any limit is checked. An admitted call is
    /// charged and persisted before this returns; if that write fails the
    /// charge is undone and the error is returned.
    pub fn try_acquire<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Decision, StorageError> {
        let ts = now.timestamp_millis() as f64 / 1000.0;
        let month = month_key(now.date_naive());

        let mut log = self.store.write();

        if log.last_reset != month {
            tracing::info!(
                target: "weather",
                previous = %log.last_reset,
                current = %month,
                "Monthly weather budget reset"
            );
            log.monthly_count = 0;
            log.last_reset = month;
        }

        log.minute_window.retain(|t| ts - t < WINDOW_SECS);

        if log.monthly_count >= self.limits.hard_limit {
            tracing::warn!(target: "weather", count = log.monthly_count, "Monthly hard limit reached");
            return Ok(Decision::Denied(DenyReason::HardLimitReached));
        }

        if log.minute_window.len() >= self.limits.max_calls_per_minute {
            tracing::debug!(target: "weather", "Per-minute limit reached");
            return Ok(Decision::Denied(DenyReason::RateLimited));
        }

        log.minute_window.push(ts);
        log.monthly_count += 1;

        if let Err(e) = self.store.persist(&log) {
            log.minute_window.pop();
            log.monthly_count -= 1;
            return Err(e);
        }

        let warning = (log.monthly_count >= self.limits.warn_threshold).then(|| {
            format!(
                "⚠️ Approaching monthly weather API limit: {} calls.",
                log.monthly_count
            )
        });
        Ok(Decision::Allowed { warning })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn gate(dir: &tempfile::TempDir) -> RateGate {
        RateGate::open(dir.path().join("weather_usage.json"), GateLimits::default())
    }

    fn july() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    fn seed(gate: &RateGate, count: u64, month: &str) {
        let mut log = gate.store.write();
        log.monthly_count = count;
        log.last_reset = month.to_string();
    }

    #[test]
    fn test_eleventh_call_in_a_second_is_rate_limited() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = gate(&tmp);
        let start = july();

        for i in 0..10 {
            let now = start + Duration::milliseconds(i * 50);
            assert!(matches!(gate.try_acquire(&now).unwrap(), Decision::Allowed { .. }));
        }
        let eleventh = start + Duration::milliseconds(900);
        assert_eq!(
            gate.try_acquire(&eleventh).unwrap(),
            Decision::Denied(DenyReason::RateLimited)
        );

        assert_eq!(gate.store.read().minute_window.len(), 10);
        assert_eq!(gate.monthly_count(), 10);
    }

    #[test]
    fn test_window_slides_after_sixty_seconds() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = gate(&tmp);
        let start = july();

        for _ in 0..10 {
            gate.try_acquire(&start).unwrap();
        }
        let later = start + Duration::seconds(61);
        assert!(matches!(gate.try_acquire(&later).unwrap(), Decision::Allowed { .. }));
        assert_eq!(gate.store.read().minute_window.len(), 1);
    }

    #[test]
    fn test_hard_limit_denies_without_charging_or_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = gate(&tmp);
        seed(&gate, 900_000, "2024-07");

        assert_eq!(
            gate.try_acquire(&july()).unwrap(),
            Decision::Denied(DenyReason::HardLimitReached)
        );
        assert_eq!(gate.monthly_count(), 900_000);
        assert!(gate.store.read().minute_window.is_empty());
        assert!(!tmp.path().join("weather_usage.json").exists());
    }

    #[test]
    fn test_warning_starts_exactly_at_threshold() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = gate(&tmp);

        seed(&gate, 699_998, "2024-07");
        assert_eq!(
            gate.try_acquire(&july()).unwrap(),
            Decision::Allowed { warning: None }
        );
        assert_eq!(gate.monthly_count(), 699_999);

        match gate.try_acquire(&july()).unwrap() {
            Decision::Allowed { warning: Some(text) } => assert!(text.contains("700000")),
            other => panic!("expected a warning, got {:?}", other),
        }
    }

    #[test]
    fn test_month_rollover_precedes_hard_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = gate(&tmp);
        seed(&gate, 900_000, "2024-06");

        assert_eq!(
            gate.try_acquire(&july()).unwrap(),
            Decision::Allowed { warning: None }
        );
        assert_eq!(gate.monthly_count(), 1);
        assert_eq!(gate.store.read().last_reset, "2024-07");
    }

    #[test]
    fn test_allowed_call_is_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("weather_usage.json");
        let first = RateGate::open(&path, GateLimits::default());
        first.try_acquire(&july()).unwrap();

        let reopened = RateGate::open(&path, GateLimits::default());
        let log = reopened.store.read();
        assert_eq!(log.monthly_count, 1);
        assert_eq!(log.last_reset, "2024-07");
        assert_eq!(log.minute_window.len(), 1);
    }

    #[test]
    fn test_failed_persist_rolls_back_the_charge() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let gate = RateGate::open(blocker.join("weather_usage.json"), GateLimits::default());

        assert!(gate.try_acquire(&july()).is_err());
        assert_eq!(gate.monthly_count(), 0);
        assert!(gate.store.read().minute_window.is_empty());
    }
}
