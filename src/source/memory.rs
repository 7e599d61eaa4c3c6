use std::cell::Cell;

use indexmap::IndexMap;

use crate::core::{SensorSeries, SensorSnapshot, SeriesPoint, TimeRange, TimeSeriesSet};
use crate::error::{DashError, DashResult};

use super::DataSource;

/// In-process data source for tests, demos and offline hosts.
///
/// Range requests return every stored series trimmed to the window.
#[derive(Debug, Default)]
pub struct MemorySource {
    latest: IndexMap<String, SensorSnapshot>,
    history: IndexMap<String, TimeSeriesSet>,
    offline: Cell<bool>,
    requests: Cell<usize>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_latest(mut self, point: impl Into<String>, snapshot: SensorSnapshot) -> Self {
        self.latest.insert(point.into(), snapshot);
        self
    }

    #[must_use]
    pub fn with_history(mut self, point: impl Into<String>, series: TimeSeriesSet) -> Self {
        self.history.insert(point.into(), series);
        self
    }

    /// While offline every fetch fails with [`DashError::DataUnavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Number of fetches served or refused so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    fn begin(&self) -> DashResult<()> {
        self.requests.set(self.requests.get() + 1);
        if self.offline.get() {
            return Err(DashError::DataUnavailable("source offline".to_owned()));
        }
        Ok(())
    }
}

fn within(points: &[SeriesPoint], range: TimeRange) -> Vec<SeriesPoint> {
    points
        .iter()
        .filter(|point| point.timestamp >= range.start() && point.timestamp <= range.end())
        .copied()
        .collect()
}

fn trim(series: &SensorSeries, range: TimeRange) -> SensorSeries {
    SensorSeries {
        value_points: within(&series.value_points, range),
        derivative_points: within(&series.derivative_points, range),
        ..series.clone()
    }
}

impl DataSource for MemorySource {
    async fn fetch_latest(&self) -> DashResult<IndexMap<String, SensorSnapshot>> {
        self.begin()?;
        Ok(self.latest.clone())
    }

    async fn fetch_range(&self, range: TimeRange) -> DashResult<IndexMap<String, TimeSeriesSet>> {
        self.begin()?;
        self.history
            .iter()
            .map(|(point, set)| {
                let trimmed = set.iter().map(|series| trim(series, range)).collect();
                Ok((point.clone(), TimeSeriesSet::new(trimmed)?))
            })
            .collect()
    }

    async fn fetch_available_points(&self) -> DashResult<Vec<String>> {
        self.begin()?;
        Ok(self.latest.keys().chain(self.history.keys()).fold(
            Vec::new(),
            |mut names, name| {
                if !names.contains(name) {
                    names.push(name.clone());
                }
                names
            },
        ))
    }
}
