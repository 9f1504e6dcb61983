use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::reading::Reading;

/// Mean systolic shift between window halves, in mmHg, below which a
/// sequence is considered stable. A policy constant, not a clinical
/// derivation; overridable through `TriageConfig`.
pub const TREND_DELTA_MMHG: f64 = 5.0;

/// Direction of a member's blood pressure over the analysis window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrendDirection {
    Improving,
    Worsening,
    Stable,
}

/// Risk level summarizing the worst reading in a window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Urgent,
}

impl RiskLevel {
    /// Map a category priority rank onto a risk level
    pub fn from_priority_rank(rank: u8) -> Self {
        match rank {
            0 => RiskLevel::Low,
            1 | 2 => RiskLevel::Medium,
            3 => RiskLevel::High,
            _ => RiskLevel::Urgent,
        }
    }
}

/// Summary of a member's readings over a time window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BpTrendSummary {
    pub trend: TrendDirection,
    pub average_systolic: f64,
    pub average_diastolic: f64,
    pub risk_level: RiskLevel,
    /// Number of readings that fell inside the window
    pub reading_count: usize,
}

/// Analyze the trend of a member's readings inside a trailing window.
///
/// `readings` must be ordered by recorded time ascending. Fewer than two
/// in-window readings yield a stable trend with whatever averages are
/// available; an empty window is not an error and reports zero averages.
/// With four or more readings the window is split chronologically in half
/// and the halves' mean systolic values are compared against the delta
/// threshold.
///
/// The risk level is the worst stored category across the window, so it
/// reflects the thresholds each reading was classified with at creation.
pub fn analyze_trend(
    readings: &[Reading],
    window_days: i64,
    delta_threshold_mmhg: f64,
    now: DateTime<Utc>,
) -> BpTrendSummary {
    let window_start = now - Duration::days(window_days);
    let window: Vec<&Reading> = readings
        .iter()
        .filter(|r| r.recorded_at() >= window_start && r.recorded_at() <= now)
        .collect();

    if window.is_empty() {
        return BpTrendSummary {
            trend: TrendDirection::Stable,
            average_systolic: 0.0,
            average_diastolic: 0.0,
            risk_level: RiskLevel::Low,
            reading_count: 0,
        };
    }

    let mut systolic_sum = 0.0;
    let mut diastolic_sum = 0.0;
    let mut max_rank: u8 = 0;
    for reading in &window {
        systolic_sum += reading.systolic() as f64;
        diastolic_sum += reading.diastolic() as f64;
        max_rank = max_rank.max(reading.category().priority_rank());
    }
    let count = window.len();
    let average_systolic = systolic_sum / count as f64;
    let average_diastolic = diastolic_sum / count as f64;

    let trend = if count >= 4 {
        let mid = count / 2;
        let first_half_mean = mean_systolic(&window[..mid]);
        let second_half_mean = mean_systolic(&window[mid..]);
        let delta = second_half_mean - first_half_mean;

        if delta > delta_threshold_mmhg {
            TrendDirection::Worsening
        } else if delta < -delta_threshold_mmhg {
            TrendDirection::Improving
        } else {
            TrendDirection::Stable
        }
    } else {
        TrendDirection::Stable
    };

    BpTrendSummary {
        trend,
        average_systolic,
        average_diastolic,
        risk_level: RiskLevel::from_priority_rank(max_rank),
        reading_count: count,
    }
}

fn mean_systolic(readings: &[&Reading]) -> f64 {
    let sum: f64 = readings.iter().map(|r| r.systolic() as f64).sum();
    sum / readings.len() as f64
}
