use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};

/// Largest staleness window, in minutes, that fits a [`TimeDelta`].
pub const MAX_STALE_AFTER_MINUTES: i64 = i64::MAX / 60_000;

/// Layout constants of the dashboard charts.
///
/// Serializable so hosts can ship tuned layouts next to the style file.
/// Percentages are of the chart container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Upper bound of the fill-level y-axis.
    #[serde(default = "default_fill_y_max")]
    pub fill_y_max: f64,
    #[serde(default = "default_bar_width_pct")]
    pub bar_width_pct: f64,
    /// Left offset of the first time-series pane.
    #[serde(default = "default_pane_origin_pct")]
    pub pane_origin_pct: f64,
    /// Width shared by all panes of the value chart.
    #[serde(default = "default_value_width_budget_pct")]
    pub value_width_budget_pct: f64,
    /// Width shared by all panes of the derivative chart.
    #[serde(default = "default_derivative_width_budget_pct")]
    pub derivative_width_budget_pct: f64,
    #[serde(default = "default_value_top_pct")]
    pub value_top_pct: f64,
    #[serde(default = "default_derivative_top_pct")]
    pub derivative_top_pct: f64,
    /// Bottom margin under the grids, reserved for rotated labels and sliders.
    #[serde(default = "default_grid_bottom_pct")]
    pub grid_bottom_pct: f64,
    #[serde(default = "default_slider_height_pct")]
    pub slider_height_pct: f64,
    #[serde(default = "default_slider_bottom_pct")]
    pub slider_bottom_pct: f64,
    #[serde(default = "default_time_label_rotate_deg")]
    pub time_label_rotate_deg: f64,
    /// Delay of the one-off resize pass after the first chart is created.
    #[serde(default = "default_deferred_resize_ms")]
    pub deferred_resize_ms: u64,
    /// Readings older than this are reported as stale.
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fill_y_max: default_fill_y_max(),
            bar_width_pct: default_bar_width_pct(),
            pane_origin_pct: default_pane_origin_pct(),
            value_width_budget_pct: default_value_width_budget_pct(),
            derivative_width_budget_pct: default_derivative_width_budget_pct(),
            value_top_pct: default_value_top_pct(),
            derivative_top_pct: default_derivative_top_pct(),
            grid_bottom_pct: default_grid_bottom_pct(),
            slider_height_pct: default_slider_height_pct(),
            slider_bottom_pct: default_slider_bottom_pct(),
            time_label_rotate_deg: default_time_label_rotate_deg(),
            deferred_resize_ms: default_deferred_resize_ms(),
            stale_after_minutes: default_stale_after_minutes(),
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn with_fill_y_max(mut self, fill_y_max: f64) -> Self {
        self.fill_y_max = fill_y_max;
        self
    }

    #[must_use]
    pub fn with_width_budgets(mut self, value_pct: f64, derivative_pct: f64) -> Self {
        self.value_width_budget_pct = value_pct;
        self.derivative_width_budget_pct = derivative_pct;
        self
    }

    #[must_use]
    pub fn with_deferred_resize_ms(mut self, deferred_resize_ms: u64) -> Self {
        self.deferred_resize_ms = deferred_resize_ms;
        self
    }

    #[must_use]
    pub fn with_stale_after_minutes(mut self, minutes: i64) -> Self {
        self.stale_after_minutes = minutes;
        self
    }

    #[must_use]
    pub fn deferred_resize_delay(&self) -> Duration {
        Duration::from_millis(self.deferred_resize_ms)
    }

    /// Staleness window; saturates at [`TimeDelta::MAX`] for unvalidated values.
    #[must_use]
    pub fn stale_after(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.stale_after_minutes).unwrap_or(TimeDelta::MAX)
    }

    pub fn validate(&self) -> DashResult<()> {
        if !self.fill_y_max.is_finite() || self.fill_y_max <= 0.0 {
            return Err(DashError::InvalidConfig(
                "fill_y_max must be finite and > 0".to_owned(),
            ));
        }
        for (name, value) in [
            ("bar_width_pct", self.bar_width_pct),
            ("value_width_budget_pct", self.value_width_budget_pct),
            ("derivative_width_budget_pct", self.derivative_width_budget_pct),
            ("slider_height_pct", self.slider_height_pct),
        ] {
            if !value.is_finite() || value <= 0.0 || value > 100.0 {
                return Err(DashError::InvalidConfig(format!(
                    "{name} must be in (0, 100], got {value}"
                )));
            }
        }
        for (name, value) in [
            ("pane_origin_pct", self.pane_origin_pct),
            ("value_top_pct", self.value_top_pct),
            ("derivative_top_pct", self.derivative_top_pct),
            ("grid_bottom_pct", self.grid_bottom_pct),
            ("slider_bottom_pct", self.slider_bottom_pct),
        ] {
            if !value.is_finite() || !(0.0..100.0).contains(&value) {
                return Err(DashError::InvalidConfig(format!(
                    "{name} must be in [0, 100), got {value}"
                )));
            }
        }
        if !self.time_label_rotate_deg.is_finite() {
            return Err(DashError::InvalidConfig(
                "time_label_rotate_deg must be finite".to_owned(),
            ));
        }
        if !(1..=MAX_STALE_AFTER_MINUTES).contains(&self.stale_after_minutes) {
            return Err(DashError::InvalidConfig(format!(
                "stale_after_minutes must be in [1, {MAX_STALE_AFTER_MINUTES}], got {}",
                self.stale_after_minutes
            )));
        }
        Ok(())
    }
}

fn default_fill_y_max() -> f64 {
    160.0
}

fn default_bar_width_pct() -> f64 {
    90.0
}

fn default_pane_origin_pct() -> f64 {
    5.0
}

fn default_value_width_budget_pct() -> f64 {
    92.0
}

fn default_derivative_width_budget_pct() -> f64 {
    86.0
}

fn default_value_top_pct() -> f64 {
    5.0
}

fn default_derivative_top_pct() -> f64 {
    7.0
}

fn default_grid_bottom_pct() -> f64 {
    35.0
}

fn default_slider_height_pct() -> f64 {
    8.0
}

fn default_slider_bottom_pct() -> f64 {
    3.0
}

fn default_time_label_rotate_deg() -> f64 {
    45.0
}

fn default_deferred_resize_ms() -> u64 {
    100
}

fn default_stale_after_minutes() -> i64 {
    15
}
