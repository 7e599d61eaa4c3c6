use serde::{Serialize, Serializer};

use crate::core::{PaneId, ZoomControlId, ZoomControlKind};
use crate::error::{DashError, DashResult};
use crate::render::{Color, LineStrokeStyle, RenderableColor};

/// Percentage of the chart container, serialized as `"12.5%"`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(pub f64);

impl Percent {
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}%", self.0))
    }
}

/// Declarative description of one chart, applied to a handle as a whole.
///
/// Serializes to an ECharts option tree. Builders produce a fresh value on
/// every rebuild; nothing is patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSpec {
    pub background_color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_style: Option<TextStyle>,
    pub grid: Vec<GridSpec>,
    pub title: Vec<TitleSpec>,
    pub x_axis: Vec<AxisSpec>,
    pub y_axis: Vec<AxisSpec>,
    pub series: Vec<SeriesSpec>,
    pub data_zoom: Vec<ZoomControlSpec>,
    pub tooltip: Vec<TooltipSpec>,
    pub legend: LegendSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolbox: Option<ToolboxSpec>,
}

impl LayoutSpec {
    /// Spec with nothing to plot: no grids, axes or series, but legend and
    /// toolbox still populated so the chart chrome stays usable.
    #[must_use]
    pub fn placeholder(background_color: Color) -> Self {
        Self {
            background_color,
            text_style: None,
            grid: Vec::new(),
            title: Vec::new(),
            x_axis: Vec::new(),
            y_axis: Vec::new(),
            series: Vec::new(),
            data_zoom: Vec::new(),
            tooltip: Vec::new(),
            legend: LegendSpec::default(),
            toolbox: Some(ToolboxSpec::default()),
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.grid.is_empty()
            && self.x_axis.is_empty()
            && self.y_axis.is_empty()
            && self.series.is_empty()
    }

    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.grid.len()
    }

    pub fn series_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SeriesSpec> + 'a {
        self.series
            .iter()
            .filter(move |series| series.name.as_deref() == Some(name))
    }

    pub fn series_of_pane<'a>(
        &'a self,
        pane: &'a PaneId,
    ) -> impl Iterator<Item = &'a SeriesSpec> + 'a {
        self.series
            .iter()
            .filter(move |series| series.pane.as_ref() == Some(pane))
    }

    /// Zoom controls of one kind that carry a stable id, in declaration order.
    pub fn zoom_controls(
        &self,
        kind: ZoomControlKind,
    ) -> impl Iterator<Item = (&ZoomControlId, &ZoomControlSpec)> + '_ {
        self.data_zoom
            .iter()
            .filter(move |control| control.kind == kind)
            .filter_map(|control| control.id.as_ref().map(|id| (id, control)))
    }

    /// Checks internal references before the layout is handed to a surface.
    pub fn validate(&self) -> DashResult<()> {
        self.background_color.validate()?;
        for (index, series) in self.series.iter().enumerate() {
            check_axis_ref("series", index, "x", series.x_axis_index, self.x_axis.len())?;
            check_axis_ref("series", index, "y", series.y_axis_index, self.y_axis.len())?;
        }
        for (index, axis) in self.x_axis.iter().chain(&self.y_axis).enumerate() {
            if let Some(grid_index) = axis.grid_index {
                if grid_index >= self.grid.len() {
                    return Err(DashError::MalformedSeries(format!(
                        "axis {index} refers to missing grid {grid_index}"
                    )));
                }
            }
            for (bound, label) in [(axis.min, "min"), (axis.max, "max")] {
                if bound.is_some_and(|value| !value.is_finite()) {
                    return Err(DashError::MalformedSeries(format!(
                        "axis {index} has non-finite {label}"
                    )));
                }
            }
        }
        for (index, control) in self.data_zoom.iter().enumerate() {
            check_axis_ref("zoom control", index, "x", control.x_axis_index, self.x_axis.len())?;
            check_axis_ref("zoom control", index, "y", control.y_axis_index, self.y_axis.len())?;
        }
        Ok(())
    }
}

fn check_axis_ref(
    owner: &str,
    index: usize,
    axis: &str,
    reference: Option<usize>,
    available: usize,
) -> DashResult<()> {
    match reference {
        Some(axis_index) if axis_index >= available => Err(DashError::MalformedSeries(format!(
            "{owner} {index} refers to missing {axis}-axis {axis_index}"
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSpec {
    pub left: Percent,
    pub width: Percent,
    pub top: Percent,
    pub bottom: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Percent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleSpec {
    pub text: String,
    pub left: Percent,
    pub top: Percent,
    pub text_align: TextAlign,
    pub text_style: TitleTextStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleTextStyle {
    pub font_size: u32,
    pub font_weight: &'static str,
}

impl Default for TitleTextStyle {
    fn default() -> Self {
        Self {
            font_size: 14,
            font_weight: "bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Category,
    Value,
    Time,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSpec {
    #[serde(rename = "type")]
    pub kind: AxisKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary_gap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_label: Option<AxisLabelSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_line: Option<AxisLineSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_tick: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<u32>,
}

impl AxisSpec {
    #[must_use]
    pub fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            grid_index: None,
            data: None,
            min: None,
            max: None,
            boundary_gap: None,
            axis_label: None,
            axis_line: None,
            axis_tick: None,
            z: None,
        }
    }

    #[must_use]
    pub fn with_grid_index(mut self, grid_index: usize) -> Self {
        self.grid_index = Some(grid_index);
        self
    }

    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLabelSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLineSpec {
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub show: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Line,
    Bar,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    None,
    Triangle,
    Circle,
}

/// Series payload, in the shape the chart library takes for each series type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    /// Plain values at category positions.
    Values(Vec<f64>),
    /// Values at category positions, each with its own fill.
    Items(Vec<BarItem>),
    /// `[epoch_millis, value]` pairs on a time axis; `None` leaves a gap.
    TimePoints(Vec<(i64, Option<f64>)>),
}

impl SeriesData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Values(values) => values.len(),
            Self::Items(items) => items.len(),
            Self::TimePoints(points) => points.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values in order, skipping gaps.
    #[must_use]
    pub fn numeric_values(&self) -> Vec<f64> {
        match self {
            Self::Values(values) => values.clone(),
            Self::Items(items) => items.iter().map(|item| item.value).collect(),
            Self::TimePoints(points) => points.iter().filter_map(|(_, value)| *value).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarItem {
    pub value: f64,
    pub item_style: ItemStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub stroke: Option<LineStrokeStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<RenderableColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_type: Option<LineStrokeStyle>,
}

impl ItemStyle {
    #[must_use]
    pub fn fill(color: RenderableColor) -> Self {
        Self {
            color: Some(color),
            border_color: None,
            border_width: None,
            border_type: None,
        }
    }

    /// Transparent fill with a visible border.
    #[must_use]
    pub fn outline(border_color: Color, border_type: LineStrokeStyle) -> Self {
        Self {
            color: Some(RenderableColor::Solid(Color::TRANSPARENT)),
            border_color: Some(border_color),
            border_width: Some(1.0),
            border_type: Some(border_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Pane the series belongs to; host metadata, not part of the option tree.
    #[serde(skip)]
    pub pane: Option<PaneId>,
    pub data: SeriesData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_style: Option<ItemStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_width: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_gap: Option<Percent>,
}

impl SeriesSpec {
    #[must_use]
    pub fn new(kind: SeriesKind, data: SeriesData) -> Self {
        Self {
            kind,
            name: None,
            pane: None,
            data,
            x_axis_index: None,
            y_axis_index: None,
            smooth: None,
            symbol: None,
            symbol_size: None,
            silent: None,
            show_background: None,
            line_style: None,
            item_style: None,
            bar_width: None,
            bar_gap: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Binds the series to pane `index` (its x/y axis pair) and records its id.
    #[must_use]
    pub fn on_pane(mut self, pane: PaneId, index: usize) -> Self {
        self.pane = Some(pane);
        self.x_axis_index = Some(index);
        self.y_axis_index = Some(index);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomControlSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ZoomControlId>,
    #[serde(rename = "type")]
    pub kind: ZoomControlKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Percent>,
}

impl ZoomControlSpec {
    #[must_use]
    pub fn new(kind: ZoomControlKind) -> Self {
        Self {
            id: None,
            kind,
            show: None,
            x_axis_index: None,
            y_axis_index: None,
            start: None,
            end: None,
            height: None,
            bottom: None,
        }
    }

    #[must_use]
    pub fn full_window(mut self) -> Self {
        self.start = Some(0.0);
        self.end = Some(100.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTrigger {
    Axis,
    Item,
}

/// Single-value tooltip: `<label>` header plus `"<value> <unit>"`.
///
/// ECharts only accepts tooltip formatters as functions, so `label` and
/// `unit` stay out of the option JSON. Hosts install a formatter that
/// renders [`TooltipSpec::content`] under [`TooltipSpec::label`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipSpec {
    pub trigger: TooltipTrigger,
    #[serde(skip)]
    pub label: String,
    #[serde(skip)]
    pub unit: String,
}

impl TooltipSpec {
    #[must_use]
    pub fn axis(label: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            trigger: TooltipTrigger::Axis,
            label: label.into(),
            unit: unit.into(),
        }
    }

    /// Tooltip body for the hovered value.
    #[must_use]
    pub fn content(&self, value: f64) -> String {
        format!("{value} {}", self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSpec {
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Percent>,
}

impl Default for LegendSpec {
    fn default() -> Self {
        Self {
            show: true,
            top: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolboxSpec {
    pub show: bool,
    pub orient: Orientation,
    pub feature: ToolboxFeatures,
}

impl Default for ToolboxSpec {
    fn default() -> Self {
        Self {
            show: true,
            orient: Orientation::Horizontal,
            feature: ToolboxFeatures::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolboxFeatures {
    pub data_zoom: ToolboxDataZoom,
    pub data_view: ToolboxDataView,
    pub restore: Empty,
    pub save_as_image: Empty,
}

impl Default for ToolboxFeatures {
    fn default() -> Self {
        Self {
            data_zoom: ToolboxDataZoom {
                y_axis_index: "none",
            },
            data_view: ToolboxDataView { read_only: false },
            restore: Empty {},
            save_as_image: Empty {},
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolboxDataZoom {
    pub y_axis_index: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolboxDataView {
    pub read_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::{
        AxisKind, AxisSpec, LayoutSpec, Percent, SeriesData, SeriesKind, SeriesSpec, TooltipSpec,
    };
    use crate::render::Color;

    #[test]
    fn placeholder_keeps_legend_and_toolbox() {
        let spec = LayoutSpec::placeholder(Color::TRANSPARENT);
        assert!(spec.is_placeholder());
        let json = serde_json::to_value(&spec).expect("serialize placeholder");
        assert_eq!(json["grid"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["legend"]["show"], true);
        assert_eq!(json["toolbox"]["feature"]["dataZoom"]["yAxisIndex"], "none");
        assert_eq!(json["toolbox"]["feature"]["dataView"]["readOnly"], false);
    }

    #[test]
    fn percent_serializes_with_suffix() {
        assert_eq!(
            serde_json::to_string(&Percent(12.5)).expect("serialize"),
            "\"12.5%\""
        );
    }

    #[test]
    fn validate_rejects_dangling_axis_reference() {
        let mut spec = LayoutSpec::placeholder(Color::TRANSPARENT);
        spec.x_axis.push(AxisSpec::new(AxisKind::Time));
        let mut series = SeriesSpec::new(SeriesKind::Line, SeriesData::TimePoints(Vec::new()));
        series.x_axis_index = Some(0);
        series.y_axis_index = Some(0);
        spec.series.push(series);
        let error = spec.validate().expect_err("missing y axis must fail");
        assert!(error.to_string().contains("missing y-axis 0"));
    }

    #[test]
    fn time_points_serialize_as_pairs_with_null_gaps() {
        let data = SeriesData::TimePoints(vec![(1_000, Some(2.5)), (2_000, None)]);
        assert_eq!(
            serde_json::to_string(&data).expect("serialize"),
            "[[1000,2.5],[2000,null]]"
        );
        assert_eq!(data.numeric_values(), vec![2.5]);
    }

    #[test]
    fn tooltip_json_carries_only_the_trigger() {
        let tooltip = TooltipSpec::axis("Value", "cm");
        let json = serde_json::to_value(&tooltip).expect("serialize tooltip");
        assert_eq!(json, serde_json::json!({"trigger": "axis"}));
        assert_eq!(tooltip.content(80.0), "80 cm");
    }
}
