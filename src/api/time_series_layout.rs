use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    PaneGeometry, PaneId, SensorSeries, SeriesPoint, TimeSeriesSet, ZoomControlId,
    ZoomControlKind, partition_panes,
};
use crate::render::{
    AxisKind, AxisLabelSpec, AxisLineSpec, AxisSpec, Color, GridSpec, ItemStyle, LayoutSpec,
    LegendSpec, LineStrokeStyle, LineStyle, Percent, RenderableColor, SeriesData, SeriesKind,
    SeriesSpec, SymbolKind, TextAlign, TextStyle, TitleSpec, TitleTextStyle, ToolboxSpec,
    TooltipSpec, ZoomControlSpec,
};

use super::{DashboardConfig, ResolvedTheme};

pub const TIME_LABEL_FORMAT: &str = "{yyyy}-{MM}-{dd} {HH}:{mm}";
const GRID_HEIGHT_PCT: f64 = 65.0;
const PEAK_SYMBOL_SIZE: f64 = 15.0;

/// Which stream of each sensor a time-series chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesMode {
    /// Raw fill level with its threshold lines.
    Value,
    /// Rate of change with rolling average and peak markers.
    Derivative,
}

impl SeriesMode {
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Value => "cm",
            Self::Derivative => "cm/h",
        }
    }

    #[must_use]
    pub const fn tooltip_label(self) -> &'static str {
        match self {
            Self::Value => "Value",
            Self::Derivative => "Derivation",
        }
    }

    fn width_budget_pct(self, config: &DashboardConfig) -> f64 {
        match self {
            Self::Value => config.value_width_budget_pct,
            Self::Derivative => config.derivative_width_budget_pct,
        }
    }

    fn top_pct(self, config: &DashboardConfig) -> f64 {
        match self {
            Self::Value => config.value_top_pct,
            Self::Derivative => config.derivative_top_pct,
        }
    }

    fn points(self, series: &SensorSeries) -> &[SeriesPoint] {
        match self {
            Self::Value => &series.value_points,
            Self::Derivative => &series.derivative_points,
        }
    }
}

/// Stable pane identifiers for a series set, in display order.
///
/// Ids derive from the sensor id; a repeated sensor id gets `#<index>`
/// appended so every pane stays addressable.
#[must_use]
pub fn pane_ids(series_set: &TimeSeriesSet) -> Vec<PaneId> {
    let mut seen = IndexSet::new();
    series_set
        .iter()
        .enumerate()
        .map(|(index, series)| {
            let id = if seen.insert(series.sensor_id.as_str()) {
                series.sensor_id.clone()
            } else {
                format!("{}#{index}", series.sensor_id)
            };
            PaneId::new(id)
        })
        .collect()
}

/// Builds the multi-pane chart for one mode.
///
/// Every sensor gets its own grid column with an x/y axis pair, a centered
/// title, a tooltip and a slider plus inside zoom control tagged with the
/// pane id. An absent or empty set yields the placeholder layout, which the
/// caller must apply on a cleared surface.
#[must_use]
pub fn build_time_series_layout(
    series_set: Option<&TimeSeriesSet>,
    mode: SeriesMode,
    theme: &ResolvedTheme,
    config: &DashboardConfig,
) -> LayoutSpec {
    let Some(series_set) = series_set.filter(|set| !set.is_empty()) else {
        debug!(mode = ?mode, "no series, building placeholder layout");
        let mut spec = LayoutSpec::placeholder(theme.background_color.clone());
        spec.text_style = Some(TextStyle {
            color: theme.line_color.clone(),
        });
        return spec;
    };

    let geometry = partition_panes(
        series_set.len(),
        config.pane_origin_pct,
        mode.width_budget_pct(config),
    );
    let top = Percent(mode.top_pct(config));

    let mut spec = LayoutSpec::placeholder(theme.background_color.clone());
    spec.text_style = Some(TextStyle {
        color: theme.line_color.clone(),
    });
    spec.legend = LegendSpec {
        show: true,
        top: Some(Percent(0.0)),
    };
    spec.toolbox = Some(ToolboxSpec::default());

    for ((series, pane), cell) in series_set.iter().zip(pane_ids(series_set)).zip(geometry) {
        let index = cell.index;
        spec.grid.push(GridSpec {
            left: Percent(cell.left_pct),
            width: Percent(cell.width_pct),
            top,
            bottom: Percent(config.grid_bottom_pct),
            height: Some(Percent(GRID_HEIGHT_PCT)),
        });
        spec.title.push(pane_title(series, cell, top));
        spec.x_axis.push(time_axis(index, config));
        spec.y_axis.push(match mode {
            SeriesMode::Value => AxisSpec::new(AxisKind::Value)
                .with_grid_index(index)
                .with_range(0.0, series.y_axis_max),
            SeriesMode::Derivative => AxisSpec::new(AxisKind::Value)
                .with_grid_index(index)
                .with_range(series.derivative_y_min, series.derivative_y_max),
        });
        spec.tooltip.push(TooltipSpec::axis(mode.tooltip_label(), mode.unit()));
        match mode {
            SeriesMode::Value => push_value_series(&mut spec.series, series, &pane, index),
            SeriesMode::Derivative => {
                push_derivative_series(&mut spec.series, series, &pane, index);
            }
        }
        spec.data_zoom.extend(zoom_controls(mode, &pane, index, config));
    }

    debug!(
        mode = ?mode,
        panes = spec.pane_count(),
        series = spec.series.len(),
        "time-series layout built"
    );
    spec
}

fn pane_title(series: &SensorSeries, cell: PaneGeometry, top: Percent) -> TitleSpec {
    TitleSpec {
        text: series.sensor_id.clone(),
        left: Percent(cell.center_pct()),
        top,
        text_align: TextAlign::Center,
        text_style: TitleTextStyle::default(),
    }
}

fn time_axis(index: usize, config: &DashboardConfig) -> AxisSpec {
    let mut axis = AxisSpec::new(AxisKind::Time).with_grid_index(index);
    axis.boundary_gap = Some(false);
    axis.axis_line = Some(AxisLineSpec {
        show: true,
        on_zero: Some(false),
        line_style: None,
    });
    axis.axis_label = Some(AxisLabelSpec {
        formatter: Some(TIME_LABEL_FORMAT.to_owned()),
        rotate: Some(config.time_label_rotate_deg),
        inside: None,
        color: None,
    });
    axis
}

fn line(
    name: &str,
    pane: &PaneId,
    index: usize,
    points: &[SeriesPoint],
    field: impl Fn(&SeriesPoint) -> Option<f64>,
    style: LineStyle,
) -> SeriesSpec {
    let data = points
        .iter()
        .map(|point| (point.time_ms(), field(point)))
        .collect();
    let mut series = SeriesSpec::new(SeriesKind::Line, SeriesData::TimePoints(data))
        .named(name)
        .on_pane(pane.clone(), index);
    series.smooth = Some(true);
    series.symbol = Some(SymbolKind::None);
    series.line_style = Some(style);
    series
}

fn line_style(color: &'static str, width: f64, stroke: Option<LineStrokeStyle>) -> LineStyle {
    LineStyle {
        color: Some(Color::from_static(color)),
        width: Some(width),
        stroke,
    }
}

fn push_value_series(
    out: &mut Vec<SeriesSpec>,
    series: &SensorSeries,
    pane: &PaneId,
    index: usize,
) {
    let points = SeriesMode::Value.points(series);
    let dashed = Some(LineStrokeStyle::Dashed);
    out.push(line(
        series.display_name(),
        pane,
        index,
        points,
        |point| point.value,
        line_style("lightblue", 3.0, None),
    ));
    out.push(line(
        "Max",
        pane,
        index,
        points,
        |point| point.max_threshold,
        line_style("blue", 1.0, dashed),
    ));
    out.push(line(
        "Warn",
        pane,
        index,
        points,
        |point| point.warn_threshold,
        line_style("orange", 1.0, dashed),
    ));
    out.push(line(
        "Alarm",
        pane,
        index,
        points,
        |point| point.alarm_threshold,
        line_style("red", 1.0, dashed),
    ));
}

fn push_derivative_series(
    out: &mut Vec<SeriesSpec>,
    series: &SensorSeries,
    pane: &PaneId,
    index: usize,
) {
    let points = SeriesMode::Derivative.points(series);
    let mut raw = line(
        "Derivation [cm/h]",
        pane,
        index,
        points,
        |point| point.value,
        line_style("grey", 1.0, None),
    );
    raw.silent = Some(true);
    out.push(raw);
    out.push(line(
        "Avg of 10 of Derivation [cm/h]",
        pane,
        index,
        points,
        |point| point.rolling_avg_10,
        line_style("orange", 3.0, None),
    ));
    out.push(peaks("Positive Peaks", pane, index, points, |point| {
        point.positive_peak
    }));
    out.push(peaks("Negative Peaks", pane, index, points, |point| {
        point.negative_peak
    }));
}

/// Sparse scatter: timestamps without a peak are left out entirely.
fn peaks(
    name: &str,
    pane: &PaneId,
    index: usize,
    points: &[SeriesPoint],
    field: impl Fn(&SeriesPoint) -> Option<f64>,
) -> SeriesSpec {
    let data = points
        .iter()
        .filter_map(|point| field(point).map(|peak| (point.time_ms(), Some(peak))))
        .collect();
    let mut series = SeriesSpec::new(SeriesKind::Scatter, SeriesData::TimePoints(data))
        .named(name)
        .on_pane(pane.clone(), index);
    series.symbol = Some(SymbolKind::Triangle);
    series.symbol_size = Some(PEAK_SYMBOL_SIZE);
    series.item_style = Some(ItemStyle::fill(RenderableColor::Solid(Color::from_static(
        "red",
    ))));
    series
}

fn zoom_controls(
    mode: SeriesMode,
    pane: &PaneId,
    index: usize,
    config: &DashboardConfig,
) -> [ZoomControlSpec; 2] {
    let mut slider = ZoomControlSpec::new(ZoomControlKind::Slider);
    slider.id = Some(ZoomControlId::slider(pane.clone()));
    slider.x_axis_index = Some(index);

    let mut inside = ZoomControlSpec::new(ZoomControlKind::Inside).full_window();
    inside.id = Some(ZoomControlId::inside(pane.clone()));
    inside.y_axis_index = Some(index);

    match mode {
        SeriesMode::Value => {
            slider = slider.full_window();
            slider.show = Some(true);
            slider.height = Some(Percent(config.slider_height_pct));
            slider.bottom = Some(Percent(config.slider_bottom_pct));
            inside.show = Some(false);
        }
        // Hidden: the derivative chart follows the value chart's sliders.
        SeriesMode::Derivative => slider.show = Some(false),
    }
    [slider, inside]
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{SeriesMode, build_time_series_layout, pane_ids};
    use crate::api::{DashboardConfig, ResolvedTheme, StyleConfig, ThemeVariant};
    use crate::core::{PaneId, SensorSeries, SeriesPoint, TimeSeriesSet, ZoomControlKind};
    use crate::render::SeriesData;

    fn theme() -> ResolvedTheme {
        ResolvedTheme::for_variant(ThemeVariant::Light, &StyleConfig::default())
    }

    fn derivative_series() -> SensorSeries {
        let at = |minute| Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap();
        SensorSeries::new("T1", 150.0)
            .with_derivative_range(-5.0, 5.0)
            .with_derivative_points(vec![
                SeriesPoint::new(at(0), 0.5).with_rolling_avg(0.4),
                SeriesPoint::new(at(10), 2.5)
                    .with_rolling_avg(0.9)
                    .with_peaks(Some(2.5), None),
                SeriesPoint::new(at(20), -1.0)
                    .with_rolling_avg(0.2)
                    .with_peaks(None, Some(-1.0)),
            ])
    }

    #[test]
    fn repeated_sensor_ids_get_distinct_panes() {
        let set = TimeSeriesSet::new(vec![
            SensorSeries::new("T1", 100.0),
            SensorSeries::new("T1", 100.0),
        ])
        .expect("set");
        assert_eq!(pane_ids(&set), vec![PaneId::new("T1"), PaneId::new("T1#1")]);
    }

    #[test]
    fn derivative_peaks_are_sparse() {
        let set = TimeSeriesSet::new(vec![derivative_series()]).expect("set");
        let spec = build_time_series_layout(
            Some(&set),
            SeriesMode::Derivative,
            &theme(),
            &DashboardConfig::default(),
        );
        let positive = spec.series_named("Positive Peaks").next().expect("positive peaks");
        assert_eq!(positive.data.len(), 1);
        let raw = spec.series_named("Derivation [cm/h]").next().expect("raw derivative");
        assert_eq!(raw.silent, Some(true));
        assert_eq!(spec.y_axis[0].min, Some(-5.0));
        assert_eq!(spec.tooltip[0].content(2.5), "2.5 cm/h");
    }

    #[test]
    fn derivative_sliders_are_hidden_but_identified() {
        let set = TimeSeriesSet::new(vec![derivative_series()]).expect("set");
        let spec = build_time_series_layout(
            Some(&set),
            SeriesMode::Derivative,
            &theme(),
            &DashboardConfig::default(),
        );
        let (id, slider) = spec
            .zoom_controls(ZoomControlKind::Slider)
            .next()
            .expect("slider");
        assert_eq!(id.to_string(), "T1/slider");
        assert_eq!(slider.show, Some(false));
        assert_eq!(slider.x_axis_index, Some(0));
    }

    #[test]
    fn value_mode_plots_threshold_lines_from_points() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let series = SensorSeries::new("T1", 150.0).with_value_points(vec![
            SeriesPoint::new(at, 80.0).with_thresholds(140.0, 60.0, 30.0),
        ]);
        let set = TimeSeriesSet::new(vec![series]).expect("set");
        let spec = build_time_series_layout(
            Some(&set),
            SeriesMode::Value,
            &theme(),
            &DashboardConfig::default(),
        );
        let warn = spec.series_named("Warn").next().expect("warn line");
        assert_eq!(
            warn.data,
            SeriesData::TimePoints(vec![(at.timestamp_millis(), Some(60.0))])
        );
        assert_eq!(spec.y_axis[0].max, Some(150.0));
        assert_eq!(spec.series.len(), 4);
    }

    #[test]
    fn missing_set_yields_placeholder() {
        let spec = build_time_series_layout(
            None,
            SeriesMode::Value,
            &theme(),
            &DashboardConfig::default(),
        );
        assert!(spec.is_placeholder());
        assert!(spec.toolbox.is_some());
    }
}
