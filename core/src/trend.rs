//! Time-range trend aggregation: turns an entry history into a
//! range-filtered point series plus latest/previous/delta comparisons.
//!
//! All functions here are pure; the caller supplies the history and the
//! current date explicitly.

use anyhow::{Result, bail};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::Entry;
use crate::units::round1;

/// Named time-window selectors for filtering history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeKey {
    ThisWeek,
    ThisMonth,
    ThisYear,
    Last7,
    Last28,
    Last365,
    All,
    Custom,
}

pub const RANGE_KEYS: &[RangeKey] = &[
    RangeKey::ThisWeek,
    RangeKey::ThisMonth,
    RangeKey::ThisYear,
    RangeKey::Last7,
    RangeKey::Last28,
    RangeKey::Last365,
    RangeKey::All,
    RangeKey::Custom,
];

impl RangeKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RangeKey::ThisWeek => "thisWeek",
            RangeKey::ThisMonth => "thisMonth",
            RangeKey::ThisYear => "thisYear",
            RangeKey::Last7 => "last7",
            RangeKey::Last28 => "last28",
            RangeKey::Last365 => "last365",
            RangeKey::All => "all",
            RangeKey::Custom => "custom",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RangeKey::ThisWeek => "This Week",
            RangeKey::ThisMonth => "This Month",
            RangeKey::ThisYear => "This Year",
            RangeKey::Last7 => "Last 7 Days",
            RangeKey::Last28 => "Last 28 Days",
            RangeKey::Last365 => "Last 365 Days",
            RangeKey::All => "All Time",
            RangeKey::Custom => "Custom",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        for key in RANGE_KEYS {
            if key.as_str().to_lowercase() == lower {
                return Ok(*key);
            }
        }
        bail!(
            "Invalid range '{s}'. Must be one of: {}",
            RANGE_KEYS
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    /// Resolve to an inclusive start-date boundary; `None` means the
    /// entire history.
    #[must_use]
    pub fn start_date(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            RangeKey::ThisWeek => {
                // Most recent Sunday (Sunday itself counts).
                let back = i64::from(today.weekday().num_days_from_sunday());
                Some(today - Duration::days(back))
            }
            RangeKey::ThisMonth => {
                Some(NaiveDate::from_ymd_opt(today.year(), today.month(), 1).expect("valid date"))
            }
            RangeKey::ThisYear => {
                Some(NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("valid date"))
            }
            RangeKey::Last7 => Some(today - Duration::days(7)),
            RangeKey::Last28 => Some(today - Duration::days(28)),
            RangeKey::Last365 => Some(today - Duration::days(365)),
            RangeKey::All => None,
            // Placeholder until a real date-range picker exists: custom
            // behaves exactly like all-time.
            RangeKey::Custom => None,
        }
    }
}

/// Metrics the trend view can chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Weight,
    BodyFat,
    WaterPercent,
}

pub const METRICS: &[Metric] = &[Metric::Weight, Metric::BodyFat, Metric::WaterPercent];

impl Metric {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Weight => "weight",
            Metric::BodyFat => "bodyFat",
            Metric::WaterPercent => "waterPercent",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Metric::Weight => "Weight",
            Metric::BodyFat => "Body Fat",
            Metric::WaterPercent => "Water",
        }
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Weight => "lb",
            Metric::BodyFat | Metric::WaterPercent => "%",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "weight" => Ok(Metric::Weight),
            "bodyfat" => Ok(Metric::BodyFat),
            "water" | "waterpercent" => Ok(Metric::WaterPercent),
            _ => bail!("Invalid metric '{s}'. Must be 'weight', 'bodyFat', or 'waterPercent'"),
        }
    }

    /// The metric's value on an entry, if recorded.
    ///
    /// TODO: wire `WaterPercent` to a real column once the entry schema
    /// grows one; until then it is a display-only metric with no data.
    #[must_use]
    pub fn value_of(self, entry: &Entry) -> Option<f64> {
        match self {
            Metric::Weight => entry.weight_lb,
            Metric::BodyFat => entry.body_fat_percent,
            Metric::WaterPercent => None,
        }
    }
}

/// A single chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Range-filtered series for one metric, with the latest/previous
/// comparison. Derived, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub metric: Metric,
    pub range: RangeKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<TrendPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<TrendPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Fewer than 2 points is "not chartable" — the caller's concern,
    /// not an engine error.
    #[must_use]
    pub fn chartable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Fixed sign contract: a negative delta (value went down) is the
    /// favorable direction for weight and body fat.
    #[must_use]
    pub fn favorable(&self) -> Option<bool> {
        self.delta.map(|d| d < 0.0)
    }
}

fn metric_points(entries: &[&Entry], metric: Metric) -> Vec<TrendPoint> {
    entries
        .iter()
        .filter_map(|e| {
            metric.value_of(e).map(|value| TrendPoint {
                date: e.date,
                value,
            })
        })
        .collect()
}

/// Compute the trend series for one metric over a range.
///
/// `latest` is the last in-range entry carrying the metric, falling back
/// to the full history's tail so a latest exists whenever any entry
/// anywhere has the metric. `previous` is the nearest earlier carrier,
/// preferring in-range, likewise falling back.
#[must_use]
pub fn compute_trend(
    history: &[Entry],
    metric: Metric,
    range: RangeKey,
    today: NaiveDate,
) -> TrendSeries {
    let mut sorted: Vec<&Entry> = history.iter().collect();
    sorted.sort_by_key(|e| e.date);

    let start = range.start_date(today);
    let in_range: Vec<&Entry> = match start {
        Some(s) => sorted.iter().filter(|e| e.date >= s).copied().collect(),
        None => sorted.clone(),
    };

    let in_points = metric_points(&in_range, metric);
    let all_points = metric_points(&sorted, metric);

    let latest = in_points.last().or(all_points.last()).copied();
    let previous = latest.and_then(|l| {
        in_points
            .iter()
            .rev()
            .find(|p| p.date < l.date)
            .or_else(|| all_points.iter().rev().find(|p| p.date < l.date))
            .copied()
    });

    let delta = match (latest, previous) {
        (Some(l), Some(p)) => Some(round1(l.value - p.value)),
        _ => None,
    };

    TrendSeries {
        metric,
        range,
        latest,
        previous,
        delta,
        points: in_points,
    }
}
