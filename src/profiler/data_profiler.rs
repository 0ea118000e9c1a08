use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use ordered_float::NotNan;
use regex::Regex;
use serde_json::{Map, Value};

use crate::{
    aggregators::round2,
    profiler::{ColumnKind, ColumnProfile, DataProfile, NumericStats, Trend, TrendDirection},
};

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$")
        .expect("iso date pattern must compile")
});

static REGION_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").expect("region code pattern must compile"));

const GEO_KEYWORDS: &[&str] = &["state", "city", "region", "country", "zip", "postal", "origin", "destination", "lane", "location"];

/// Relative change between the first and last third that counts as a trend.
pub const TREND_THRESHOLD_PERCENT: f64 = 10.0;

/// Outlier distance from the mean, in standard deviations.
pub const OUTLIER_SIGMAS: f64 = 2.0;

/// Best-effort descriptive statistics over result rows. Never fails: with too
/// little data the affected fields stay empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataProfiler;

impl DataProfiler {
    /// Profile `rows`; `columns` limits and orders the profiled columns,
    /// otherwise every key is profiled in first-seen order.
    pub fn profile(rows: &[Map<String, Value>], columns: Option<&[String]>) -> DataProfile {
        let names: Vec<String> = match columns {
            Some(columns) => columns.to_vec(),
            None => {
                let mut seen: Vec<String> = Vec::new();
                for key in rows.iter().flat_map(|r| r.keys()) {
                    if !seen.contains(key) {
                        seen.push(key.clone());
                    }
                }
                seen
            }
        };

        let profiles: Vec<ColumnProfile> = names.iter().map(|name| Self::profile_column(rows, name)).collect();

        let trend = Self::detect_trend(rows, &profiles);
        let geographic_coverage = profiles
            .iter()
            .find(|p| p.kind == ColumnKind::Geographic)
            .map(|p| p.cardinality);
        let has_outliers = profiles
            .iter()
            .filter_map(|p| p.stats.as_ref())
            .any(|s| s.outlier_count > 0);

        DataProfile {
            row_count: rows.len(),
            columns: profiles,
            has_trend: trend.is_some(),
            trend,
            has_outliers,
            geographic_coverage,
        }
    }

    /// Coarse kind from the first non-null value and the column name.
    pub fn infer_kind(name: &str, sample: Option<&Value>) -> ColumnKind {
        let Some(sample) = sample else {
            return ColumnKind::Unknown;
        };
        if as_number(sample).is_some() {
            return ColumnKind::Numeric;
        }
        if let Value::String(s) = sample {
            if ISO_DATE.is_match(s.trim()) {
                return ColumnKind::Temporal;
            }
            if REGION_CODE.is_match(s.trim()) {
                return ColumnKind::Geographic;
            }
        }
        let lower = name.to_lowercase();
        if GEO_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return ColumnKind::Geographic;
        }
        ColumnKind::Categorical
    }

    fn profile_column(rows: &[Map<String, Value>], name: &str) -> ColumnProfile {
        let values: Vec<&Value> = rows
            .iter()
            .filter_map(|r| r.get(name))
            .filter(|v| !v.is_null())
            .collect();

        let kind = Self::infer_kind(name, values.first().copied());
        let cardinality = values.iter().map(|v| canonical(v)).collect::<HashSet<_>>().len();
        let null_percent = if rows.is_empty() {
            0.0
        } else {
            round2((rows.len() - values.len()) as f64 * 100.0 / rows.len() as f64)
        };
        let stats = match kind {
            ColumnKind::Numeric => numeric_stats(&values.iter().filter_map(|v| as_number(v)).collect::<Vec<_>>()),
            _ => None,
        };

        ColumnProfile { name: name.to_string(), kind, cardinality, null_percent, stats }
    }

    fn detect_trend(rows: &[Map<String, Value>], profiles: &[ColumnProfile]) -> Option<Trend> {
        let time = profiles.iter().find(|p| p.kind == ColumnKind::Temporal)?;
        let metric = profiles.iter().find(|p| p.kind == ColumnKind::Numeric)?;

        let mut points: Vec<(NaiveDate, f64)> = rows
            .iter()
            .filter_map(|r| {
                let date = r.get(&time.name).and_then(as_date)?;
                let value = r.get(&metric.name).and_then(as_number)?;
                Some((date, value))
            })
            .collect();
        if points.len() < 3 {
            return None;
        }
        points.sort_by_key(|(date, _)| *date);

        let third = points.len() / 3;
        let first = mean(points[..third].iter().map(|(_, v)| *v));
        let last = mean(points[points.len() - third..].iter().map(|(_, v)| *v));
        if first == 0.0 {
            return None;
        }

        let change_percent = (last - first) / first.abs() * 100.0;
        if change_percent.abs() <= TREND_THRESHOLD_PERCENT {
            return None;
        }
        Some(Trend {
            column: metric.name.clone(),
            against: time.name.clone(),
            direction: if change_percent > 0.0 { TrendDirection::Up } else { TrendDirection::Down },
            change_percent: round2(change_percent),
        })
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()
}

fn canonical(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    let mut sorted: Vec<NotNan<f64>> = values.iter().filter_map(|v| NotNan::new(*v).ok()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort();

    let n = sorted.len();
    let min = sorted[0].into_inner();
    let max = sorted[n - 1].into_inner();
    let mean = mean(sorted.iter().map(|v| v.into_inner()));
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1].into_inner() + sorted[n / 2].into_inner()) / 2.0
    } else {
        sorted[n / 2].into_inner()
    };
    let variance = sorted.iter().map(|v| (v.into_inner() - mean).powi(2)).sum::<f64>() / n as f64;
    let std_dev = variance.sqrt();
    let outlier_count = if std_dev == 0.0 {
        0
    } else {
        sorted.iter().filter(|v| (v.into_inner() - mean).abs() > OUTLIER_SIGMAS * std_dev).count()
    };

    Some(NumericStats { min, max, mean, median, std_dev, outlier_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Map<String, Value>> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(m) => m,
                _ => panic!("fixture rows must be objects"),
            })
            .collect()
    }

    #[test]
    fn kinds_are_inferred_from_first_value_and_name() {
        assert_eq!(DataProfiler::infer_kind("total", Some(&json!(12.5))), ColumnKind::Numeric);
        assert_eq!(DataProfiler::infer_kind("total", Some(&json!("12.5"))), ColumnKind::Numeric);
        assert_eq!(DataProfiler::infer_kind("day", Some(&json!("2025-05-01"))), ColumnKind::Temporal);
        assert_eq!(DataProfiler::infer_kind("day", Some(&json!("2025-05-01T10:00:00Z"))), ColumnKind::Temporal);
        assert_eq!(DataProfiler::infer_kind("label", Some(&json!("TX"))), ColumnKind::Geographic);
        assert_eq!(DataProfiler::infer_kind("destination_city", Some(&json!("Austin"))), ColumnKind::Geographic);
        assert_eq!(DataProfiler::infer_kind("carrier", Some(&json!("UPS Freight"))), ColumnKind::Categorical);
        assert_eq!(DataProfiler::infer_kind("carrier", None), ColumnKind::Unknown);
    }

    #[test]
    fn numeric_stats_and_outliers() {
        let mut data: Vec<Value> = (0..10).map(|_| json!({ "v": 10 })).collect();
        data.push(json!({ "v": 100 }));
        data.push(json!({ "v": null }));
        let profile = DataProfiler::profile(&rows(data), None);

        let v = profile.column("v").unwrap();
        assert_eq!(v.kind, ColumnKind::Numeric);
        assert_eq!(v.cardinality, 2);
        assert_eq!(v.null_percent, 8.33);
        let stats = v.stats.as_ref().unwrap();
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 100.0);
        assert_eq!(stats.median, 10.0);
        assert_eq!(stats.outlier_count, 1);
        assert!(profile.has_outliers);
    }

    #[test]
    fn rising_series_is_a_trend() {
        let data = vec![
            json!({ "day": "2025-05-03", "cost": 130.0 }),
            json!({ "day": "2025-05-01", "cost": 100.0 }),
            json!({ "day": "2025-05-02", "cost": 110.0 }),
        ];
        let profile = DataProfiler::profile(&rows(data), None);
        let trend = profile.trend.unwrap();
        assert!(profile.has_trend);
        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.change_percent, 30.0);
        assert_eq!(trend.column, "cost");
        assert_eq!(trend.against, "day");
    }

    #[test]
    fn small_or_flat_series_has_no_trend() {
        let two = vec![json!({ "day": "2025-05-01", "cost": 1.0 }), json!({ "day": "2025-05-02", "cost": 9.0 })];
        assert!(!DataProfiler::profile(&rows(two), None).has_trend);

        let flat = vec![
            json!({ "day": "2025-05-01", "cost": 100.0 }),
            json!({ "day": "2025-05-02", "cost": 50.0 }),
            json!({ "day": "2025-05-03", "cost": 105.0 }),
        ];
        assert!(!DataProfiler::profile(&rows(flat), None).has_trend);

        let no_time = vec![json!({ "cost": 1.0 }), json!({ "cost": 2.0 }), json!({ "cost": 3.0 })];
        assert!(DataProfiler::profile(&rows(no_time), None).trend.is_none());
    }

    #[test]
    fn geographic_coverage_and_column_selection() {
        let data = vec![
            json!({ "primaryGroup": "TX", "total": 1 }),
            json!({ "primaryGroup": "CA", "total": 2 }),
            json!({ "primaryGroup": "TX", "total": 3 }),
        ];
        let profile = DataProfiler::profile(&rows(data.clone()), None);
        assert_eq!(profile.geographic_coverage, Some(2));

        let only_total = DataProfiler::profile(&rows(data), Some(&["total".to_string()]));
        assert_eq!(only_total.columns.len(), 1);
        assert_eq!(only_total.geographic_coverage, None);
    }

    #[test]
    fn empty_input_degrades_quietly() {
        let profile = DataProfiler::profile(&[], None);
        assert_eq!(profile.row_count, 0);
        assert!(profile.columns.is_empty());
        assert_eq!(profile.describe(), "No rows to describe.");

        let profile = DataProfiler::profile(&[], Some(&["x".to_string()]));
        assert_eq!(profile.columns[0].kind, ColumnKind::Unknown);
        assert_eq!(profile.columns[0].null_percent, 0.0);
    }

    #[test]
    fn describe_mentions_signals() {
        let data = vec![
            json!({ "day": "2025-05-01", "cost": 100.0, "state": "TX" }),
            json!({ "day": "2025-05-02", "cost": 100.0, "state": "CA" }),
            json!({ "day": "2025-05-03", "cost": 80.0, "state": "GA" }),
        ];
        let text = DataProfiler::profile(&rows(data), None).describe();
        assert!(text.starts_with("3 rows across 3 columns."));
        assert!(text.contains("cost trends down 20.0% over day."));
        assert!(text.contains("Covers 3 distinct locations."));
    }
}
