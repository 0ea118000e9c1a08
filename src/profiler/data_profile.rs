use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Temporal,
    Geographic,
    /// Every sampled value was null
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Values further than two standard deviations from the mean
    pub outlier_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub cardinality: usize,
    pub null_percent: f64,
    pub stats: Option<NumericStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Numeric column the trend is measured on
    pub column: String,
    /// Temporal column rows were ordered by
    pub against: String,
    pub direction: TrendDirection,
    pub change_percent: f64,
}

/// Descriptive summary of a result set. Derived, read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataProfile {
    pub row_count: usize,
    pub columns: Vec<ColumnProfile>,
    pub has_trend: bool,
    pub trend: Option<Trend>,
    pub has_outliers: bool,
    /// Distinct values of the first geographic column
    pub geographic_coverage: Option<usize>,
}

impl DataProfile {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// One-paragraph annotation for the chart description.
    pub fn describe(&self) -> String {
        if self.row_count == 0 {
            return "No rows to describe.".to_string();
        }

        let mut parts = vec![format!(
            "{} row{} across {} column{}.",
            self.row_count,
            if self.row_count == 1 { "" } else { "s" },
            self.columns.len(),
            if self.columns.len() == 1 { "" } else { "s" },
        )];

        if let Some((name, s)) = self.columns.iter().find_map(|c| c.stats.as_ref().map(|s| (&c.name, s))) {
            parts.push(format!(
                "{name} ranges from {:.2} to {:.2} (mean {:.2}, median {:.2}).",
                s.min, s.max, s.mean, s.median
            ));
        }
        if let Some(t) = &self.trend {
            let direction = match t.direction {
                TrendDirection::Up => "up",
                TrendDirection::Down => "down",
            };
            parts.push(format!("{} trends {} {:.1}% over {}.", t.column, direction, t.change_percent.abs(), t.against));
        }
        if self.has_outliers {
            let outliers: usize = self.columns.iter().filter_map(|c| c.stats.as_ref()).map(|s| s.outlier_count).sum();
            parts.push(format!("{outliers} outlier value{} detected.", if outliers == 1 { "" } else { "s" }));
        }
        if let Some(coverage) = self.geographic_coverage {
            parts.push(format!("Covers {coverage} distinct location{}.", if coverage == 1 { "" } else { "s" }));
        }
        parts.join(" ")
    }
}
