// crates/warden-reputation/src/history.rs
//
// Rolling online/offline audit history.
//
// Observations are bucketed into fixed-size windows keyed by the observation
// time truncated to the window size. Windows older than one tracking period
// before the newest window are dropped. The online score is the mean online
// ratio of every window except the newest, which is still being filled and
// would bias the score if included.

use chrono::{DateTime, DurationRound, RoundingError, Utc};
use serde::Serialize;

use warden_core::config::AuditHistoryConfig;
use warden_core::error::WardenError;
use warden_core::record::{AuditHistory, AuditWindow};

/// Result of recording one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryUpdate {
    /// Online score after the observation.
    pub new_score: f64,
    /// Whether enough complete windows exist to judge a full tracking period.
    pub tracking_period_full: bool,
}

/// Truncate a timestamp to the start of its window.
pub fn window_start(observed_at: DateTime<Utc>, config: &AuditHistoryConfig) -> Result<DateTime<Utc>, WardenError> {
    if config.window_size_secs == 0 {
        return Err(WardenError::InvalidConfig(
            "window_size_secs must be positive".to_string(),
        ));
    }
    observed_at
        .duration_trunc(config.window_size())
        .map_err(|e| match e {
            RoundingError::TimestampExceedsLimit => WardenError::InvalidTimestamp(format!(
                "observation time {} is outside the supported range",
                observed_at.to_rfc3339()
            )),
            other => WardenError::InvalidConfig(format!(
                "cannot truncate {} to window size {}s: {}",
                observed_at.to_rfc3339(),
                config.window_size_secs,
                other
            )),
        })
}

/// Mean online ratio over all windows except the last.
///
/// With zero or one window there is no complete window to judge, so the
/// score is optimistically 1.
pub fn window_score(windows: &[AuditWindow]) -> f64 {
    if windows.len() <= 1 {
        return 1.0;
    }
    let complete = &windows[..windows.len() - 1];
    let total: f64 = complete.iter().map(AuditWindow::online_ratio).sum();
    total / complete.len() as f64
}

/// Record one online/offline observation into a node's history.
///
/// Fails with `StaleObservation` when the observation belongs to a window
/// older than the latest one; the history is left untouched in that case.
/// The score is only recomputed when a window was added or dropped, so
/// observations landing in the current window never move it.
pub fn record_observation(
    history: &mut AuditHistory,
    observed_at: DateTime<Utc>,
    online: bool,
    config: &AuditHistoryConfig,
) -> Result<HistoryUpdate, WardenError> {
    let start = window_start(observed_at, config)?;

    if let Some(latest) = history.latest_window() {
        if latest.window_start > start {
            return Err(WardenError::StaleObservation {
                window_start: start,
                latest_window_start: latest.window_start,
            });
        }
    }

    let earliest = start - config.tracking_period();
    let expired = history
        .windows
        .iter()
        .take_while(|w| w.window_start < earliest)
        .count();
    let mut windows_modified = expired > 0;
    history.windows.drain(..expired);

    let needs_window = history
        .latest_window()
        .map_or(true, |latest| latest.window_start < start);
    if needs_window {
        history.windows.push(AuditWindow::new(start));
        windows_modified = true;
    }

    if let Some(latest) = history.windows.last_mut() {
        latest.total_count += 1;
        if online {
            latest.online_count += 1;
        }
    }

    if windows_modified {
        history.score = window_score(&history.windows);
    }

    Ok(HistoryUpdate {
        new_score: history.score,
        tracking_period_full: history.windows.len().saturating_sub(1)
            >= config.windows_per_tracking_period(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn config() -> AuditHistoryConfig {
        AuditHistoryConfig {
            window_size_secs: 3600,
            tracking_period_secs: 4 * 3600,
            ..Default::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn window(start: DateTime<Utc>, total: u32, online: u32) -> AuditWindow {
        AuditWindow {
            window_start: start,
            total_count: total,
            online_count: online,
        }
    }

    #[test]
    fn window_start_truncates_to_window_size() {
        let at = t0() + Duration::minutes(95);
        assert_eq!(window_start(at, &config()).unwrap(), t0() + Duration::hours(1));
    }

    #[test]
    fn far_future_observation_is_an_invalid_timestamp() {
        let at = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();
        match window_start(at, &config()) {
            Err(WardenError::InvalidTimestamp(msg)) => assert!(msg.contains("2300-01-01")),
            other => panic!("expected InvalidTimestamp, got {:?}", other),
        }

        let mut history = AuditHistory::new();
        assert!(record_observation(&mut history, at, true, &config()).is_err());
        assert!(history.windows.is_empty());
    }

    #[test]
    fn score_excludes_in_progress_window() {
        let windows = vec![
            window(t0(), 10, 5),
            window(t0() + Duration::hours(1), 10, 10),
            window(t0() + Duration::hours(2), 4, 1),
        ];
        assert!((window_score(&windows) - 0.75).abs() < 1e-12);

        let mut changed_last = windows.clone();
        changed_last[2] = window(t0() + Duration::hours(2), 100, 0);
        assert!((window_score(&changed_last) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn single_window_scores_one() {
        let mut history = AuditHistory::new();
        let update = record_observation(&mut history, t0(), false, &config()).unwrap();
        assert_eq!(history.windows.len(), 1);
        assert_eq!(update.new_score, 1.0);
        assert!(!update.tracking_period_full);
    }

    #[test]
    fn observations_in_current_window_keep_cached_score() {
        let mut history = AuditHistory::new();
        record_observation(&mut history, t0(), false, &config()).unwrap();
        let update =
            record_observation(&mut history, t0() + Duration::hours(1), true, &config()).unwrap();
        assert_eq!(update.new_score, 0.0);

        let update = record_observation(
            &mut history,
            t0() + Duration::hours(1) + Duration::minutes(10),
            false,
            &config(),
        )
        .unwrap();
        assert_eq!(update.new_score, 0.0);
        assert_eq!(history.windows[1].total_count, 2);
        assert_eq!(history.windows[1].online_count, 1);
    }

    #[test]
    fn expired_windows_are_dropped() {
        let mut history = AuditHistory::new();
        for h in 0..3 {
            record_observation(&mut history, t0() + Duration::hours(h), h != 0, &config()).unwrap();
        }
        assert_eq!(history.windows.len(), 3);

        // Window at t0+6h keeps windows starting at or after t0+2h.
        let update =
            record_observation(&mut history, t0() + Duration::hours(6), true, &config()).unwrap();
        assert_eq!(history.windows.len(), 2);
        assert_eq!(history.windows[0].window_start, t0() + Duration::hours(2));
        assert_eq!(update.new_score, 1.0);
    }

    #[test]
    fn tracking_period_full_after_enough_complete_windows() {
        let mut history = AuditHistory::new();
        let mut last = None;
        for h in 0..5 {
            last = Some(
                record_observation(&mut history, t0() + Duration::hours(h), true, &config())
                    .unwrap(),
            );
            if h < 4 {
                assert!(!last.unwrap().tracking_period_full, "full too early at hour {}", h);
            }
        }
        assert!(last.unwrap().tracking_period_full);
    }

    #[test]
    fn stale_observation_is_rejected_without_mutation() {
        let mut history = AuditHistory::new();
        record_observation(&mut history, t0() + Duration::hours(2), true, &config()).unwrap();
        let before = history.clone();

        let err = record_observation(&mut history, t0() + Duration::minutes(30), true, &config())
            .unwrap_err();
        match err {
            WardenError::StaleObservation {
                window_start,
                latest_window_start,
            } => {
                assert_eq!(window_start, t0());
                assert_eq!(latest_window_start, t0() + Duration::hours(2));
            }
            other => panic!("expected StaleObservation, got {:?}", other),
        }
        assert_eq!(history, before);
    }
}
