use tracing::debug;

use crate::core::{SensorSnapshot, ZoomControlKind};
use crate::render::{
    AxisKind, AxisLabelSpec, AxisLineSpec, AxisSpec, BarItem, Color, ItemStyle, LayoutSpec,
    LegendSpec, LineStrokeStyle, Percent, RenderableColor, SeriesData, SeriesKind, SeriesSpec,
    TextStyle, Visibility, ZoomControlSpec,
};

use super::gradient_resolver::{FALLBACK_COLOR, resolve_palette};
use super::{DashboardConfig, ResolvedTheme, StyleConfig};

/// Threshold outline drawn over the fill bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOverlay {
    Warn,
    Alarm,
    Max,
    TankHeight,
}

impl FillOverlay {
    pub const ALL: [Self; 4] = [Self::Warn, Self::Alarm, Self::Max, Self::TankHeight];

    /// Series name shown in the legend and tooltips.
    #[must_use]
    pub const fn series_name(self) -> &'static str {
        match self {
            Self::Warn => "Warn",
            Self::Alarm => "Alarm",
            Self::Max => "Max",
            Self::TankHeight => "Tank Height",
        }
    }

    fn border(self) -> (Color, LineStrokeStyle) {
        match self {
            Self::Warn => (Color::from_static("orange"), LineStrokeStyle::Dashed),
            Self::Alarm => (Color::from_static("red"), LineStrokeStyle::Dashed),
            Self::Max => (Color::from_static("blue"), LineStrokeStyle::Dashed),
            Self::TankHeight => (Color::from_static("rgba(0,191,255,1)"), LineStrokeStyle::Solid),
        }
    }

    fn column(self, snapshot: &SensorSnapshot) -> Option<&[f64]> {
        match self {
            Self::Warn => snapshot.warn_thresholds(),
            Self::Alarm => snapshot.alarm_thresholds(),
            Self::Max => snapshot.max_values(),
            Self::TankHeight => snapshot.tank_heights(),
        }
    }
}

/// Builds the single bar chart of the latest fill levels.
///
/// One bar per sensor in snapshot order, filled with the gradient of its
/// color token. Each threshold column present in the snapshot adds one
/// outline series drawn on top of the bars; absent columns add nothing.
/// Values are passed through as-is, including those above the axis range.
#[must_use]
pub fn build_fill_level_layout(
    snapshot: &SensorSnapshot,
    style: &StyleConfig,
    theme: &ResolvedTheme,
    config: &DashboardConfig,
) -> LayoutSpec {
    let palette = resolve_palette(snapshot.color_tokens(), style);
    let bar_width = Percent(config.bar_width_pct);

    let items = snapshot
        .values()
        .iter()
        .enumerate()
        .map(|(index, &value)| BarItem {
            value,
            item_style: ItemStyle::fill(palette_color(&palette, index)),
        })
        .collect();
    let mut primary = SeriesSpec::new(SeriesKind::Bar, SeriesData::Items(items));
    primary.show_background = Some(false);
    primary.bar_width = Some(bar_width);

    let mut series = vec![primary];
    for overlay in FillOverlay::ALL {
        let Some(column) = overlay.column(snapshot) else {
            continue;
        };
        let (border, stroke) = overlay.border();
        let mut outline = SeriesSpec::new(SeriesKind::Bar, SeriesData::Values(column.to_vec()))
            .named(overlay.series_name());
        outline.show_background = Some(false);
        outline.item_style = Some(ItemStyle::outline(border, stroke));
        outline.bar_width = Some(bar_width);
        outline.bar_gap = Some(Percent(-100.0));
        series.push(outline);
    }

    let mut x_axis = AxisSpec::new(AxisKind::Category);
    x_axis.data = Some(snapshot.sensor_ids().to_vec());
    x_axis.axis_label = Some(AxisLabelSpec {
        formatter: None,
        rotate: None,
        inside: Some(true),
        color: Some(Color::from_static("#fff")),
    });
    x_axis.axis_tick = Some(Visibility { show: false });
    x_axis.axis_line = Some(hidden_axis_line());
    x_axis.z = Some(10);

    let mut y_axis = AxisSpec::new(AxisKind::Value).with_range(0.0, config.fill_y_max);
    y_axis.axis_label = Some(AxisLabelSpec {
        formatter: None,
        rotate: None,
        inside: None,
        color: Some(Color::from_static("#888")),
    });
    y_axis.axis_tick = Some(Visibility { show: false });
    y_axis.axis_line = Some(hidden_axis_line());

    debug!(
        sensors = snapshot.len(),
        overlays = series.len() - 1,
        "fill-level layout built"
    );

    LayoutSpec {
        background_color: theme.background_color.clone(),
        text_style: Some(TextStyle {
            color: theme.line_color.clone(),
        }),
        grid: Vec::new(),
        title: Vec::new(),
        x_axis: vec![x_axis],
        y_axis: vec![y_axis],
        series,
        data_zoom: vec![ZoomControlSpec::new(ZoomControlKind::Inside)],
        tooltip: Vec::new(),
        legend: LegendSpec {
            show: false,
            top: None,
        },
        toolbox: None,
    }
}

/// Colors are picked positionally, so the palette may be shorter than the
/// sensor list.
fn palette_color(palette: &[RenderableColor], index: usize) -> RenderableColor {
    if palette.is_empty() {
        return RenderableColor::Solid(FALLBACK_COLOR);
    }
    palette[index % palette.len()].clone()
}

fn hidden_axis_line() -> AxisLineSpec {
    AxisLineSpec {
        show: false,
        on_zero: None,
        line_style: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{FillOverlay, build_fill_level_layout, palette_color};
    use crate::api::{DashboardConfig, ResolvedTheme, StyleConfig, ThemeVariant};
    use crate::core::SensorSnapshot;
    use crate::render::{Color, RenderableColor, SeriesData};

    fn snapshot() -> SensorSnapshot {
        SensorSnapshot::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![10.0, 20.0, 30.0],
            vec!["normal".into(), "warning".into(), "normal".into()],
        )
        .expect("snapshot")
    }

    #[test]
    fn absent_columns_add_no_overlay() {
        let style = StyleConfig::default();
        let theme = ResolvedTheme::for_variant(ThemeVariant::Light, &style);
        let snapshot = snapshot()
            .with_tank_heights(vec![150.0, 150.0, 150.0])
            .expect("tank heights");
        let spec = build_fill_level_layout(&snapshot, &style, &theme, &DashboardConfig::default());
        assert_eq!(spec.series.len(), 2);
        assert_eq!(
            spec.series[1].name.as_deref(),
            Some(FillOverlay::TankHeight.series_name())
        );
    }

    #[test]
    fn y_axis_uses_configured_maximum() {
        let style = StyleConfig::default();
        let theme = ResolvedTheme::for_variant(ThemeVariant::Dark, &style);
        let config = DashboardConfig::default().with_fill_y_max(200.0);
        let spec = build_fill_level_layout(&snapshot(), &style, &theme, &config);
        assert_eq!(spec.y_axis[0].max, Some(200.0));
        assert_eq!(spec.background_color, theme.background_color);
    }

    #[test]
    fn palette_wraps_around() {
        let palette = vec![
            RenderableColor::Solid(Color::from_static("red")),
            RenderableColor::Solid(Color::from_static("green")),
        ];
        assert_eq!(palette_color(&palette, 3), palette[1]);
    }

    #[test]
    fn bar_items_carry_raw_values() {
        let style = StyleConfig::default();
        let theme = ResolvedTheme::for_variant(ThemeVariant::Light, &style);
        let spec =
            build_fill_level_layout(&snapshot(), &style, &theme, &DashboardConfig::default());
        let SeriesData::Items(items) = &spec.series[0].data else {
            panic!("primary series must carry bar items");
        };
        let values: Vec<f64> = items.iter().map(|item| item.value).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0]);
    }
}
