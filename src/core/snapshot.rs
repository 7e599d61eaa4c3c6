use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::core::SensorStatus;
use crate::core::time::WireInstant;
use crate::error::{DashError, DashResult};

/// Latest reading of every sensor at one measurement point.
///
/// Stored column-wise: index `i` of every column refers to the same sensor.
/// Threshold columns are optional as a whole; a missing column means the
/// corresponding overlay is not drawn at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorSnapshot {
    sensor_ids: Vec<String>,
    values: Vec<f64>,
    color_tokens: Vec<String>,
    warn_thresholds: Option<Vec<f64>>,
    alarm_thresholds: Option<Vec<f64>>,
    max_values: Option<Vec<f64>>,
    tank_heights: Option<Vec<f64>>,
    measured_at: Option<Vec<DateTime<Utc>>>,
}

/// Borrowed row view of one sensor in a [`SensorSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEntry<'a> {
    pub sensor_id: &'a str,
    pub value: f64,
    pub color_token: &'a str,
    pub warn_threshold: Option<f64>,
    pub alarm_threshold: Option<f64>,
    pub max_value: Option<f64>,
    pub tank_height: Option<f64>,
    pub measured_at: Option<DateTime<Utc>>,
}

impl SensorSnapshot {
    /// Creates a snapshot from the mandatory columns.
    pub fn new(
        sensor_ids: Vec<String>,
        values: Vec<f64>,
        color_tokens: Vec<String>,
    ) -> DashResult<Self> {
        let len = sensor_ids.len();
        check_column_len("value", values.len(), len)?;
        check_column_len("color", color_tokens.len(), len)?;
        Ok(Self {
            sensor_ids,
            values,
            color_tokens,
            ..Self::default()
        })
    }

    pub fn with_warn_thresholds(mut self, column: Vec<f64>) -> DashResult<Self> {
        check_column_len("warn", column.len(), self.len())?;
        self.warn_thresholds = Some(column);
        Ok(self)
    }

    pub fn with_alarm_thresholds(mut self, column: Vec<f64>) -> DashResult<Self> {
        check_column_len("alarm", column.len(), self.len())?;
        self.alarm_thresholds = Some(column);
        Ok(self)
    }

    pub fn with_max_values(mut self, column: Vec<f64>) -> DashResult<Self> {
        check_column_len("max_val", column.len(), self.len())?;
        self.max_values = Some(column);
        Ok(self)
    }

    pub fn with_tank_heights(mut self, column: Vec<f64>) -> DashResult<Self> {
        check_column_len("tank_height", column.len(), self.len())?;
        self.tank_heights = Some(column);
        Ok(self)
    }

    pub fn with_measured_at(mut self, column: Vec<DateTime<Utc>>) -> DashResult<Self> {
        check_column_len("dt", column.len(), self.len())?;
        self.measured_at = Some(column);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sensor_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensor_ids.is_empty()
    }

    #[must_use]
    pub fn sensor_ids(&self) -> &[String] {
        &self.sensor_ids
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn color_tokens(&self) -> &[String] {
        &self.color_tokens
    }

    #[must_use]
    pub fn warn_thresholds(&self) -> Option<&[f64]> {
        self.warn_thresholds.as_deref()
    }

    #[must_use]
    pub fn alarm_thresholds(&self) -> Option<&[f64]> {
        self.alarm_thresholds.as_deref()
    }

    #[must_use]
    pub fn max_values(&self) -> Option<&[f64]> {
        self.max_values.as_deref()
    }

    #[must_use]
    pub fn tank_heights(&self) -> Option<&[f64]> {
        self.tank_heights.as_deref()
    }

    #[must_use]
    pub fn entry(&self, index: usize) -> Option<SensorEntry<'_>> {
        let column = |column: &Option<Vec<f64>>| {
            column.as_ref().and_then(|values| values.get(index).copied())
        };
        Some(SensorEntry {
            sensor_id: self.sensor_ids.get(index)?,
            value: *self.values.get(index)?,
            color_token: self.color_tokens.get(index)?,
            warn_threshold: column(&self.warn_thresholds),
            alarm_threshold: column(&self.alarm_thresholds),
            max_value: column(&self.max_values),
            tank_height: column(&self.tank_heights),
            measured_at: self
                .measured_at
                .as_ref()
                .and_then(|column| column.get(index).copied()),
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = SensorEntry<'_>> + '_ {
        (0..self.len()).filter_map(|index| self.entry(index))
    }

    /// Status of every sensor, in snapshot order.
    #[must_use]
    pub fn statuses(&self, now: DateTime<Utc>, stale_after: Duration) -> Vec<SensorStatus> {
        self.entries()
            .map(|entry| {
                SensorStatus::classify_at(
                    entry.value,
                    entry.warn_threshold,
                    entry.alarm_threshold,
                    entry.measured_at,
                    now,
                    stale_after,
                )
            })
            .collect()
    }
}

fn check_column_len(column: &str, actual: usize, expected: usize) -> DashResult<()> {
    if actual != expected {
        return Err(DashError::MalformedSeries(format!(
            "snapshot column `{column}` has {actual} entries, expected {expected}"
        )));
    }
    Ok(())
}

/// Wire shape of one measurement point in the backend's latest-values response.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotPayload {
    #[serde(alias = "mp_name", alias = "sensor_id")]
    pub sensor_name: Vec<String>,
    pub value: Vec<f64>,
    #[serde(default)]
    pub color: Option<Vec<String>>,
    #[serde(default)]
    pub warn: Option<Vec<f64>>,
    #[serde(default)]
    pub alarm: Option<Vec<f64>>,
    #[serde(default)]
    pub max_val: Option<Vec<f64>>,
    #[serde(default)]
    pub tank_height: Option<Vec<f64>>,
    #[serde(default)]
    pub dt: Option<Vec<WireInstant>>,
}

impl TryFrom<SnapshotPayload> for SensorSnapshot {
    type Error = DashError;

    fn try_from(payload: SnapshotPayload) -> DashResult<Self> {
        let len = payload.sensor_name.len();
        let colors = payload.color.unwrap_or_else(|| vec![String::new(); len]);
        let mut snapshot = Self::new(payload.sensor_name, payload.value, colors)?;
        if let Some(column) = payload.warn {
            snapshot = snapshot.with_warn_thresholds(column)?;
        }
        if let Some(column) = payload.alarm {
            snapshot = snapshot.with_alarm_thresholds(column)?;
        }
        if let Some(column) = payload.max_val {
            snapshot = snapshot.with_max_values(column)?;
        }
        if let Some(column) = payload.tank_height {
            snapshot = snapshot.with_tank_heights(column)?;
        }
        if let Some(column) = payload.dt {
            snapshot =
                snapshot.with_measured_at(column.into_iter().map(|WireInstant(dt)| dt).collect())?;
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::{SensorSnapshot, SnapshotPayload};
    use crate::error::DashError;

    fn two_sensors() -> SensorSnapshot {
        SensorSnapshot::new(
            vec!["A".to_owned(), "B".to_owned()],
            vec![40.0, 95.0],
            vec!["normal".to_owned(), "alarm".to_owned()],
        )
        .expect("aligned columns")
    }

    #[test]
    fn mismatched_column_is_malformed() {
        let error = two_sensors()
            .with_warn_thresholds(vec![60.0])
            .expect_err("short warn column must fail");
        assert!(matches!(error, DashError::MalformedSeries(_)));
        assert!(error.to_string().contains("`warn` has 1 entries, expected 2"));
    }

    #[test]
    fn entries_align_columns_by_index() {
        let snapshot = two_sensors()
            .with_alarm_thresholds(vec![90.0, 91.0])
            .expect("alarm column");
        let second = snapshot.entry(1).expect("second sensor");
        assert_eq!(second.sensor_id, "B");
        assert_eq!(second.value, 95.0);
        assert_eq!(second.alarm_threshold, Some(91.0));
        assert_eq!(second.warn_threshold, None);
        assert!(snapshot.entry(2).is_none());
    }

    #[test]
    fn payload_without_colors_gets_default_tokens() {
        let payload: SnapshotPayload = serde_json::from_str(
            r#"{"mp_name": ["A"], "value": [12.5], "warn": [30.0], "dt": ["2024-01-01 10:00:00"]}"#,
        )
        .expect("payload");
        let snapshot = SensorSnapshot::try_from(payload).expect("snapshot");
        assert_eq!(snapshot.color_tokens(), [String::new()]);
        assert_eq!(snapshot.warn_thresholds(), Some(&[30.0][..]));
        assert!(snapshot.max_values().is_none());
    }
}
