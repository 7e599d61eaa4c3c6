use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::time::deserialize_instant;
use crate::error::{DashError, DashResult};

/// One sample of a sensor time series.
///
/// The same shape carries both value samples (threshold fields populated)
/// and derivative samples (rolling average and peak fields populated).
/// Peaks are sparse: `None` means "no peak at this timestamp".
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeriesPoint {
    #[serde(deserialize_with = "deserialize_instant", alias = "dt")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, alias = "value_10")]
    pub rolling_avg_10: Option<f64>,
    #[serde(default, alias = "peaks_pos")]
    pub positive_peak: Option<f64>,
    #[serde(default, alias = "peaks_neg")]
    pub negative_peak: Option<f64>,
    #[serde(default, alias = "max_val")]
    pub max_threshold: Option<f64>,
    #[serde(default, alias = "warn")]
    pub warn_threshold: Option<f64>,
    #[serde(default, alias = "alarm")]
    pub alarm_threshold: Option<f64>,
}

impl SeriesPoint {
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
            rolling_avg_10: None,
            positive_peak: None,
            negative_peak: None,
            max_threshold: None,
            warn_threshold: None,
            alarm_threshold: None,
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, max: f64, warn: f64, alarm: f64) -> Self {
        self.max_threshold = Some(max);
        self.warn_threshold = Some(warn);
        self.alarm_threshold = Some(alarm);
        self
    }

    #[must_use]
    pub fn with_rolling_avg(mut self, rolling_avg_10: f64) -> Self {
        self.rolling_avg_10 = Some(rolling_avg_10);
        self
    }

    #[must_use]
    pub fn with_peaks(mut self, positive: Option<f64>, negative: Option<f64>) -> Self {
        self.positive_peak = positive;
        self.negative_peak = negative;
        self
    }

    /// Epoch milliseconds, the x-coordinate used on time axes.
    #[must_use]
    pub fn time_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// History of one sensor over the requested range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorSeries {
    #[serde(alias = "sensorID")]
    pub sensor_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "y_max")]
    pub y_axis_max: f64,
    #[serde(default, alias = "deriv_y_min")]
    pub derivative_y_min: f64,
    #[serde(default, alias = "deriv_y_max")]
    pub derivative_y_max: f64,
    #[serde(default, alias = "values")]
    pub value_points: Vec<SeriesPoint>,
    #[serde(default, alias = "deriv")]
    pub derivative_points: Vec<SeriesPoint>,
}

impl SensorSeries {
    #[must_use]
    pub fn new(sensor_id: impl Into<String>, y_axis_max: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            name: None,
            y_axis_max,
            derivative_y_min: 0.0,
            derivative_y_max: 0.0,
            value_points: Vec::new(),
            derivative_points: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_derivative_range(mut self, y_min: f64, y_max: f64) -> Self {
        self.derivative_y_min = y_min;
        self.derivative_y_max = y_max;
        self
    }

    #[must_use]
    pub fn with_value_points(mut self, points: Vec<SeriesPoint>) -> Self {
        self.value_points = points;
        self
    }

    #[must_use]
    pub fn with_derivative_points(mut self, points: Vec<SeriesPoint>) -> Self {
        self.derivative_points = points;
        self
    }

    /// Legend name of the primary line; falls back to the sensor id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.sensor_id)
    }

    pub fn validate(&self) -> DashResult<()> {
        if self.sensor_id.is_empty() {
            return Err(DashError::MalformedSeries(
                "series sensor id must not be empty".to_owned(),
            ));
        }
        for (label, bound) in [
            ("y_axis_max", self.y_axis_max),
            ("derivative_y_min", self.derivative_y_min),
            ("derivative_y_max", self.derivative_y_max),
        ] {
            if !bound.is_finite() {
                return Err(DashError::MalformedSeries(format!(
                    "series `{}` has non-finite {label}",
                    self.sensor_id
                )));
            }
        }
        check_ascending(&self.sensor_id, "value", &self.value_points)?;
        check_ascending(&self.sensor_id, "derivative", &self.derivative_points)
    }
}

fn check_ascending(sensor_id: &str, stream: &str, points: &[SeriesPoint]) -> DashResult<()> {
    if let Some(position) = points
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(DashError::MalformedSeries(format!(
            "{stream} points of `{sensor_id}` are not time-ordered at index {}",
            position + 1
        )));
    }
    Ok(())
}

/// Every sensor series of one measurement point, in display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeriesSet {
    series: Vec<SensorSeries>,
}

impl TimeSeriesSet {
    pub fn new(series: Vec<SensorSeries>) -> DashResult<Self> {
        for entry in &series {
            entry.validate()?;
        }
        Ok(Self { series })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    #[must_use]
    pub fn series(&self) -> &[SensorSeries] {
        &self.series
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SensorSeries> {
        self.series.iter()
    }
}

impl<'a> IntoIterator for &'a TimeSeriesSet {
    type Item = &'a SensorSeries;
    type IntoIter = std::slice::Iter<'a, SensorSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

impl TryFrom<Vec<SensorSeries>> for TimeSeriesSet {
    type Error = DashError;

    fn try_from(series: Vec<SensorSeries>) -> DashResult<Self> {
        Self::new(series)
    }
}
