use futures::future::join;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{ChartSlot, SensorSnapshot, TimeRange, TimeSeriesSet};
use crate::error::{DashError, DashResult};
use crate::interaction::{ZoomEvent, ZoomRouteOutcome, ZoomSyncRouter};
use crate::render::{ApplyMode, ChartBackend, ContainerRef, HandleId, LayoutSpec};
use crate::source::{DataSource, select_point};

use super::{
    ChartInstanceRegistry, DashboardConfig, PreferenceSource, RequestGroup, RequestTicket,
    RequestTracker, ResolvedTheme, SeriesMode, StyleConfig, ThemeResolver,
    build_fill_level_layout, build_time_series_layout,
};

/// Page regions the three charts are drawn into. `None` means not on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartContainers {
    pub fill: Option<ContainerRef>,
    pub time: Option<ContainerRef>,
    pub derivative: Option<ContainerRef>,
}

impl ChartContainers {
    #[must_use]
    pub fn new(fill: &str, time: &str, derivative: &str) -> Self {
        Self {
            fill: Some(ContainerRef::new(fill)),
            time: Some(ContainerRef::new(time)),
            derivative: Some(ContainerRef::new(derivative)),
        }
    }

    #[must_use]
    pub fn get(&self, slot: ChartSlot) -> Option<&ContainerRef> {
        match slot {
            ChartSlot::Fill => self.fill.as_ref(),
            ChartSlot::Time => self.time.as_ref(),
            ChartSlot::Derivative => self.derivative.as_ref(),
        }
    }
}

/// Result of one rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { panes: usize },
    /// Data was unavailable; the empty layout was applied instead.
    Placeholder { reason: String },
    /// A newer request of the same group was issued; nothing was touched.
    Superseded,
}

/// Wires the registry, theme, builders and zoom router into the three-chart
/// tank dashboard.
///
/// Loads are split in two steps so hosts can run fetches concurrently:
/// `begin_*` hands out a ticket, `render_*` applies the response only if the
/// ticket is still the latest of its group.
pub struct Dashboard<B: ChartBackend, P> {
    registry: ChartInstanceRegistry<B>,
    themes: ThemeResolver<P>,
    style: StyleConfig,
    config: DashboardConfig,
    containers: ChartContainers,
    router: ZoomSyncRouter,
    requests: RequestTracker,
    selected_point: Option<String>,
}

impl<B: ChartBackend, P: PreferenceSource> Dashboard<B, P> {
    pub fn new(
        backend: B,
        preference: P,
        style: StyleConfig,
        config: DashboardConfig,
        containers: ChartContainers,
    ) -> DashResult<Self> {
        style.validate()?;
        config.validate()?;
        let registry = ChartInstanceRegistry::new(backend, config.deferred_resize_delay())?;
        Ok(Self {
            registry,
            themes: ThemeResolver::new(preference),
            style,
            config,
            containers,
            router: ZoomSyncRouter::new(ChartSlot::Time, ChartSlot::Derivative),
            requests: RequestTracker::new(),
            selected_point: None,
        })
    }

    /// Measurement point to show; `None` shows the first point of each response.
    pub fn select_point(&mut self, point: Option<String>) {
        self.selected_point = point;
    }

    #[must_use]
    pub fn selected_point(&self) -> Option<&str> {
        self.selected_point.as_deref()
    }

    pub fn set_containers(&mut self, containers: ChartContainers) {
        self.containers = containers;
    }

    pub fn begin_fill(&mut self) -> RequestTicket {
        self.requests.issue(RequestGroup::Fill)
    }

    pub fn begin_time(&mut self) -> RequestTicket {
        self.requests.issue(RequestGroup::TimeSeries)
    }

    /// Rebuilds the fill-level chart from a latest-values response.
    ///
    /// Unavailable data renders the chart with axes and no bars.
    pub fn render_fill(
        &mut self,
        ticket: RequestTicket,
        result: DashResult<SensorSnapshot>,
    ) -> DashResult<RenderOutcome> {
        if !self.requests.accept(ticket) {
            return Ok(RenderOutcome::Superseded);
        }
        let theme = self.themes.resolve(&self.style);
        let (snapshot, reason) = match result {
            Ok(snapshot) => (snapshot, None),
            Err(DashError::DataUnavailable(reason)) => {
                warn!(%reason, "fill data unavailable");
                (SensorSnapshot::default(), Some(reason))
            }
            Err(error) => return Err(error),
        };

        let spec = build_fill_level_layout(&snapshot, &self.style, &theme, &self.config);
        self.registry
            .acquire(ChartSlot::Fill, self.containers.fill.as_ref(), &theme.plot_theme)?;
        self.registry.apply(ChartSlot::Fill, &spec, ApplyMode::Replace)?;

        Ok(match reason {
            Some(reason) => RenderOutcome::Placeholder { reason },
            None => RenderOutcome::Rendered {
                panes: snapshot.len(),
            },
        })
    }

    /// Rebuilds the value and derivative charts from one range response and
    /// relinks their zoom controls.
    ///
    /// The two charts change together: if either surface rejects its layout,
    /// both show their previous layouts again and the zoom links stay as they
    /// were.
    pub fn render_time(
        &mut self,
        ticket: RequestTicket,
        result: DashResult<TimeSeriesSet>,
    ) -> DashResult<RenderOutcome> {
        if !self.requests.accept(ticket) {
            return Ok(RenderOutcome::Superseded);
        }
        let theme = self.themes.resolve(&self.style);
        let (series_set, reason) = match result {
            Ok(set) => (Some(set), None),
            Err(DashError::DataUnavailable(reason)) => {
                warn!(%reason, "time-series data unavailable");
                (None, Some(reason))
            }
            Err(error) => return Err(error),
        };

        let value_spec =
            build_time_series_layout(series_set.as_ref(), SeriesMode::Value, &theme, &self.config);
        let derivative_spec = build_time_series_layout(
            series_set.as_ref(),
            SeriesMode::Derivative,
            &theme,
            &self.config,
        );
        value_spec.validate()?;
        derivative_spec.validate()?;

        self.registry
            .check_target(ChartSlot::Time, self.containers.time.as_ref())?;
        self.registry
            .check_target(ChartSlot::Derivative, self.containers.derivative.as_ref())?;
        let previous_time = self.registry.applied(ChartSlot::Time).cloned();
        let previous_derivative = self.registry.applied(ChartSlot::Derivative).cloned();
        let time = self.acquire_themed(ChartSlot::Time, &theme)?;
        if let Err(error) = self.apply_pair(&theme, &value_spec, &derivative_spec) {
            self.registry.restore(ChartSlot::Time, previous_time);
            self.registry
                .restore(ChartSlot::Derivative, previous_derivative);
            return Err(error);
        }

        self.router.link(&value_spec, &derivative_spec);
        if let Some(surface) = self.registry.surface_mut(ChartSlot::Time) {
            self.router.attach(time, surface)?;
        }

        Ok(match reason {
            Some(reason) => RenderOutcome::Placeholder { reason },
            None => RenderOutcome::Rendered {
                panes: value_spec.pane_count(),
            },
        })
    }

    /// Second half of a time rebuild; the caller puts both charts back on error.
    fn apply_pair(
        &mut self,
        theme: &ResolvedTheme,
        value_spec: &LayoutSpec,
        derivative_spec: &LayoutSpec,
    ) -> DashResult<()> {
        self.acquire_themed(ChartSlot::Derivative, theme)?;
        self.registry
            .apply(ChartSlot::Time, value_spec, ApplyMode::Replace)?;
        self.registry
            .apply(ChartSlot::Derivative, derivative_spec, ApplyMode::Replace)
    }

    fn acquire_themed(
        &mut self,
        slot: ChartSlot,
        theme: &ResolvedTheme,
    ) -> DashResult<HandleId> {
        let acquired =
            self.registry
                .acquire(slot, self.containers.get(slot), &theme.plot_theme)?;
        Ok(acquired.handle_id)
    }

    /// Fetches the latest values and rebuilds the fill-level chart.
    ///
    /// Holds the dashboard for the whole fetch. To keep several loads in
    /// flight, issue tickets with `begin_*`, await [`fetch_snapshot`] /
    /// [`fetch_series_set`] and hand the results to `render_*`, or use
    /// [`Dashboard::load_all`].
    pub async fn load_fill<D: DataSource>(&mut self, source: &D) -> DashResult<RenderOutcome> {
        let ticket = self.begin_fill();
        let result = fetch_snapshot(source, self.selected_point.as_deref()).await;
        self.render_fill(ticket, result)
    }

    /// Fetches `range` and rebuilds the value and derivative charts.
    pub async fn load_time<D: DataSource>(
        &mut self,
        source: &D,
        range: TimeRange,
    ) -> DashResult<RenderOutcome> {
        let ticket = self.begin_time();
        let result = fetch_series_set(source, range, self.selected_point.as_deref()).await;
        self.render_time(ticket, result)
    }

    /// Runs the latest-values and range fetches concurrently, then rebuilds
    /// every chart. Each group reports its own outcome.
    pub async fn load_all<D: DataSource>(
        &mut self,
        source: &D,
        range: TimeRange,
    ) -> (DashResult<RenderOutcome>, DashResult<RenderOutcome>) {
        let fill_ticket = self.begin_fill();
        let time_ticket = self.begin_time();
        let point = self.selected_point.as_deref();
        let (snapshot, series_set) = join(
            fetch_snapshot(source, point),
            fetch_series_set(source, range, point),
        )
        .await;
        (
            self.render_fill(fill_ticket, snapshot),
            self.render_time(time_ticket, series_set),
        )
    }

    /// Routes a zoom gesture reported on `channel` to the linked chart.
    pub fn on_zoom(
        &mut self,
        channel: ChartSlot,
        event: &ZoomEvent,
    ) -> DashResult<ZoomRouteOutcome> {
        let Some(target) = self.registry.surface_mut(self.router.target()) else {
            debug!(channel = %channel, "zoom event without target chart");
            return Ok(ZoomRouteOutcome::NoTarget);
        };
        self.router.handle_event(channel, event, target)
    }

    pub fn on_window_resize(&mut self) -> usize {
        self.registry.on_window_resize()
    }

    pub fn on_deferred_resize(&mut self) -> usize {
        self.registry.on_deferred_resize()
    }

    /// Disposes every chart. Used on page unload.
    pub fn teardown(&mut self) {
        self.registry.teardown();
        self.router.reset();
    }

    #[must_use]
    pub fn registry(&self) -> &ChartInstanceRegistry<B> {
        &self.registry
    }

    /// Direct access to the chart instances, e.g. to resize one from the host.
    pub fn registry_mut(&mut self) -> &mut ChartInstanceRegistry<B> {
        &mut self.registry
    }

    #[must_use]
    pub fn router(&self) -> &ZoomSyncRouter {
        &self.router
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Latest values of `point`, or of the first point when `None`.
///
/// Borrows nothing from the dashboard, so it can be awaited while other
/// loads are pending.
pub async fn fetch_snapshot<D: DataSource>(
    source: &D,
    point: Option<&str>,
) -> DashResult<SensorSnapshot> {
    let by_point = source.fetch_latest().await?;
    select_point(by_point, point).map(|(_, snapshot)| snapshot)
}

/// Series of `point` within `range`, or of the first point when `None`.
pub async fn fetch_series_set<D: DataSource>(
    source: &D,
    range: TimeRange,
    point: Option<&str>,
) -> DashResult<TimeSeriesSet> {
    let by_point = source.fetch_range(range).await?;
    select_point(by_point, point).map(|(_, set)| set)
}

#[cfg(test)]
mod tests {
    use super::{ChartContainers, Dashboard, RenderOutcome};
    use crate::api::{DashboardConfig, FixedPreference, StyleConfig, ThemeVariant};
    use crate::core::{ChartSlot, SensorSnapshot};
    use crate::error::DashError;
    use crate::render::RecordingBackend;

    fn dashboard() -> Dashboard<RecordingBackend, FixedPreference> {
        Dashboard::new(
            RecordingBackend::with_mounted(["fill", "time", "deriv"]),
            FixedPreference(ThemeVariant::Light),
            StyleConfig::default(),
            DashboardConfig::default(),
            ChartContainers::new("fill", "time", "deriv"),
        )
        .expect("dashboard")
    }

    #[test]
    fn superseded_fill_ticket_touches_nothing() {
        let mut dashboard = dashboard();
        let stale = dashboard.begin_fill();
        let fresh = dashboard.begin_fill();
        let outcome = dashboard
            .render_fill(stale, Ok(SensorSnapshot::default()))
            .expect("stale render");
        assert_eq!(outcome, RenderOutcome::Superseded);
        assert!(dashboard.registry().is_empty());
        assert!(matches!(
            dashboard.render_fill(fresh, Ok(SensorSnapshot::default())),
            Ok(RenderOutcome::Rendered { panes: 0 })
        ));
    }

    #[test]
    fn unavailable_time_data_renders_placeholders() {
        let mut dashboard = dashboard();
        let ticket = dashboard.begin_time();
        let outcome = dashboard
            .render_time(ticket, Err(DashError::DataUnavailable("offline".to_owned())))
            .expect("placeholder");
        assert!(matches!(outcome, RenderOutcome::Placeholder { .. }));
        let chart = dashboard.registry().get(ChartSlot::Derivative).expect("deriv chart");
        assert!(chart.surface().current().expect("applied").is_placeholder());
    }

    #[test]
    fn malformed_data_is_surfaced() {
        let mut dashboard = dashboard();
        let ticket = dashboard.begin_time();
        let error = dashboard
            .render_time(ticket, Err(DashError::MalformedSeries("bad".to_owned())))
            .expect_err("malformed must surface");
        assert!(!error.is_recoverable());
        assert!(dashboard.registry().is_empty());
    }
}
