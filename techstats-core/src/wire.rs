//! Normalization of upstream JSON payloads into canonical series.
//!
//! The API has shipped several payload shapes over time. Everything that
//! reaches the reconciler goes through one of the functions here first, so
//! no other module needs to probe optional fields.
//!
//! Accepted counts shapes (`repo-counts`, `primary-languages`):
//!
//! ```text
//! [{"date": "2025-W48", "counts": {"rust": 12, "go": 9}}]   nested
//! [{"date": "2025-W48", "rust": 12, "go": 9}]               flat
//! [{"date": "2025-01-01", "count": 1023}]                   single total
//! ```
//!
//! Accepted comparison shapes (`repo-comparison`):
//!
//! ```text
//! {"123": {"name": "apache/spark", "history": [{"date": .., "stars": ..}]}}
//! [{"date": "2025-W48", "repos": {"apache/spark": {"stars": ..}}}]
//! ```

use crate::error::WireError;
use crate::range::RepoMetric;
use crate::series::{ComparisonSeries, RepoListing, SeriesKey, TimeSeriesPoint};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Series key used for the single-total payload shape.
pub const TOTAL_KEY: &str = "total";

/// Read a JSON value as a non-negative count.
///
/// Numbers and numeric strings are accepted; negatives clamp to zero;
/// anything else is `None`.
pub fn as_count(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() {
        Some(n.max(0.0))
    } else {
        None
    }
}

fn date_of(entry: &Map<String, Value>) -> Option<String> {
    match entry.get("date")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

// ============================================================================
// COUNTS
// ============================================================================

/// Normalize a topic- or language-keyed payload.
///
/// Entries without a usable `date` are dropped. A top-level value that is
/// not an array is a shape error; `null` is read as "no data".
pub fn normalize_counts(payload: &Value) -> Result<Vec<TimeSeriesPoint>, WireError> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(WireError::UnexpectedShape {
                path: "$".to_string(),
                expected: "array",
                found: describe(other),
            })
        }
    };

    let mut points = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(obj) = entry.as_object() else {
            continue;
        };
        let Some(date) = date_of(obj) else {
            continue;
        };
        let mut point = TimeSeriesPoint::new(date);

        if let Some(Value::Object(counts)) = obj.get("counts") {
            for (key, value) in counts {
                if let Some(n) = as_count(value) {
                    point.counts.insert(SeriesKey::from(key.as_str()), n);
                }
            }
        } else {
            let flat: Vec<(&String, &Value)> = obj.iter().filter(|(k, _)| *k != "date").collect();
            let single_total = flat.len() == 1 && flat[0].0 == "count";
            for (key, value) in flat {
                if let Some(n) = as_count(value) {
                    let key = if single_total { TOTAL_KEY } else { key.as_str() };
                    point.counts.insert(SeriesKey::from(key), n);
                }
            }
        }
        points.push(point);
    }
    Ok(points)
}

// ============================================================================
// REPO COMPARISON
// ============================================================================

/// Normalize a repo-comparison payload for one metric.
///
/// Points are keyed by repository identifier and carry the metric value;
/// `names` maps each identifier to its display name. Points come out in
/// first-seen date order; callers sort.
pub fn normalize_comparison(
    payload: &Value,
    metric: RepoMetric,
) -> Result<ComparisonSeries, WireError> {
    match payload {
        Value::Null => Ok(ComparisonSeries::default()),
        Value::Object(repos) => Ok(comparison_from_history_map(repos, metric)),
        Value::Array(periods) => Ok(comparison_from_periods(periods, metric)),
        other => Err(WireError::UnexpectedShape {
            path: "$".to_string(),
            expected: "object or array",
            found: describe(other),
        }),
    }
}

fn comparison_from_history_map(repos: &Map<String, Value>, metric: RepoMetric) -> ComparisonSeries {
    let mut by_date: IndexMap<String, TimeSeriesPoint> = IndexMap::new();
    let mut names = IndexMap::new();

    for (repo_id, repo) in repos {
        let key = SeriesKey::from(repo_id.as_str());
        let name = repo
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(repo_id.as_str())
            .to_string();
        names.insert(key.clone(), name);

        let Some(history) = repo.get("history").and_then(Value::as_array) else {
            continue;
        };
        for record in history {
            let Some(obj) = record.as_object() else {
                continue;
            };
            let Some(date) = date_of(obj) else {
                continue;
            };
            let point = by_date
                .entry(date.clone())
                .or_insert_with(|| TimeSeriesPoint::new(date));
            if let Some(n) = obj.get(metric.field()).and_then(as_count) {
                point.counts.insert(key.clone(), n);
            }
        }
    }

    ComparisonSeries {
        points: by_date.into_values().collect(),
        names,
    }
}

fn comparison_from_periods(periods: &[Value], metric: RepoMetric) -> ComparisonSeries {
    let mut points = Vec::with_capacity(periods.len());
    let mut names = IndexMap::new();

    for period in periods {
        let Some(obj) = period.as_object() else {
            continue;
        };
        let Some(date) = date_of(obj) else {
            continue;
        };
        let mut point = TimeSeriesPoint::new(date);
        if let Some(Value::Object(repos)) = obj.get("repos") {
            for (repo_name, metrics) in repos {
                let key = SeriesKey::from(repo_name.as_str());
                names
                    .entry(key.clone())
                    .or_insert_with(|| repo_name.clone());
                if let Some(n) = metrics.get(metric.field()).and_then(as_count) {
                    point.counts.insert(key, n);
                }
            }
        }
        points.push(point);
    }

    ComparisonSeries { points, names }
}

// ============================================================================
// REPO LIST
// ============================================================================

/// Normalize the `repo-list` payload. Entries without a name are dropped.
pub fn normalize_repo_list(payload: &Value) -> Result<Vec<RepoListing>, WireError> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(WireError::UnexpectedShape {
                path: "$".to_string(),
                expected: "array",
                found: describe(other),
            })
        }
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let name = obj.get("name")?.as_str()?.to_string();
            let id = match obj.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => name.clone(),
            };
            let stars = obj.get("stars").and_then(as_count).unwrap_or(0.0);
            Some(RepoListing {
                id: SeriesKey::from(id),
                name,
                stars,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_counts_shape() {
        let payload = json!([
            {"date": "2025-W47", "counts": {"rust": 3, "go": "4"}},
            {"date": "2025-W48", "counts": {"rust": 5, "go": 6}}
        ]);
        let points = normalize_counts(&payload).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].count("go"), 4.0);
        let keys: Vec<&str> = points[1].keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["rust", "go"]);
    }

    #[test]
    fn test_flat_counts_shape() {
        let payload = json!([{"date": "2025-W48", "spark": 10, "dbt": 7}]);
        let points = normalize_counts(&payload).unwrap();
        assert_eq!(points[0].count("spark"), 10.0);
        assert_eq!(points[0].count("dbt"), 7.0);
    }

    #[test]
    fn test_single_total_shape() {
        let payload = json!([{"date": "2025-01-01", "count": 1023}]);
        let points = normalize_counts(&payload).unwrap();
        assert_eq!(points[0].count(TOTAL_KEY), 1023.0);
    }

    #[test]
    fn test_counts_drop_dateless_and_clamp_negative() {
        let payload = json!([
            {"counts": {"rust": 1}},
            {"date": "2025-W01", "counts": {"rust": -4, "go": null}}
        ]);
        let points = normalize_counts(&payload).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].count("rust"), 0.0);
        assert!(!points[0].counts.contains_key("go"));
    }

    #[test]
    fn test_counts_rejects_object_payload() {
        assert!(normalize_counts(&json!({"date": "x"})).is_err());
        assert!(normalize_counts(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_comparison_history_map_shape() {
        let payload = json!({
            "1": {"name": "apache/spark", "history": [
                {"date": "2025-W47", "stars": 100, "forks": 5},
                {"date": "2025-W48", "stars": 120, "forks": 6}
            ]},
            "2": {"name": "dbt-labs/dbt-core", "history": [
                {"date": "2025-W48", "stars": 50, "forks": 2}
            ]}
        });
        let series = normalize_comparison(&payload, RepoMetric::Stars).unwrap();
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[1].count("1"), 120.0);
        assert_eq!(series.points[1].count("2"), 50.0);
        assert!(!series.points[0].counts.contains_key("2"));
        assert_eq!(series.name_of(&SeriesKey::from("2")), "dbt-labs/dbt-core");

        let forks = normalize_comparison(&payload, RepoMetric::Forks).unwrap();
        assert_eq!(forks.points[0].count("1"), 5.0);
    }

    #[test]
    fn test_comparison_period_shape() {
        let payload = json!([
            {"date": "2025-01-01", "repos": {"apache/airflow": {"stars": 7, "open_issues": 2}}}
        ]);
        let series = normalize_comparison(&payload, RepoMetric::OpenIssues).unwrap();
        assert_eq!(series.points[0].count("apache/airflow"), 2.0);
        assert_eq!(series.name_of(&SeriesKey::from("apache/airflow")), "apache/airflow");
    }

    #[test]
    fn test_repo_list_numeric_ids() {
        let payload = json!([
            {"id": 42, "name": "apache/spark", "stars": 39000},
            {"id": "R_1", "name": "duckdb/duckdb"},
            {"id": 7}
        ]);
        let repos = normalize_repo_list(&payload).unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].id.as_str(), "42");
        assert_eq!(repos[1].stars, 0.0);
    }
}
