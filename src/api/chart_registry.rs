use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::core::ChartSlot;
use crate::error::{DashError, DashResult};
use crate::render::{ApplyMode, ChartBackend, ChartSurface, ContainerRef, HandleId, LayoutSpec};

/// What `acquire` did to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Created,
    /// Same container and theme: cleared in place.
    Reused,
    /// Container or theme changed: disposed and constructed again.
    Recreated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub handle_id: HandleId,
    pub outcome: AcquireOutcome,
}

/// Live surface of one slot together with what it was created for.
#[derive(Debug)]
pub struct ManagedChart<S> {
    handle_id: HandleId,
    container: ContainerRef,
    theme: String,
    surface: S,
    /// Last layout the surface accepted; restored when a rebuild is rejected.
    applied: Option<LayoutSpec>,
}

impl<S> ManagedChart<S> {
    #[must_use]
    pub fn handle_id(&self) -> HandleId {
        self.handle_id
    }

    #[must_use]
    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    #[must_use]
    pub fn theme(&self) -> &str {
        &self.theme
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn applied(&self) -> Option<&LayoutSpec> {
        self.applied.as_ref()
    }
}

/// Owns every chart surface of the page, keyed by slot.
///
/// The window-resize subscription is made once, when the registry is built.
/// The first surface ever created also arms one deferred resize pass, for
/// containers whose size settles after construction.
pub struct ChartInstanceRegistry<B: ChartBackend> {
    backend: B,
    charts: IndexMap<ChartSlot, ManagedChart<B::Surface>>,
    next_handle: u64,
    deferred_resize_delay: Duration,
    deferred_resize_armed: bool,
    deferred_resize_pending: bool,
}

impl<B: ChartBackend> ChartInstanceRegistry<B> {
    pub fn new(mut backend: B, deferred_resize_delay: Duration) -> DashResult<Self> {
        backend.subscribe_resize()?;
        debug!("window resize listener registered");
        Ok(Self {
            backend,
            charts: IndexMap::new(),
            next_handle: 1,
            deferred_resize_delay,
            deferred_resize_armed: false,
            deferred_resize_pending: false,
        })
    }

    /// Fails with [`DashError::RenderTargetUnavailable`] unless `container`
    /// is present and mounted. Touches nothing.
    pub fn check_target<'c>(
        &self,
        slot: ChartSlot,
        container: Option<&'c ContainerRef>,
    ) -> DashResult<&'c ContainerRef> {
        container
            .filter(|container| self.backend.is_mounted(container))
            .ok_or_else(|| DashError::RenderTargetUnavailable {
                chart: slot.as_str().to_owned(),
            })
    }

    /// Returns the surface for `slot`, creating, clearing or replacing it.
    ///
    /// An absent or unmounted container fails with
    /// [`DashError::RenderTargetUnavailable`] and leaves the slot untouched.
    pub fn acquire(
        &mut self,
        slot: ChartSlot,
        container: Option<&ContainerRef>,
        theme: &str,
    ) -> DashResult<Acquired> {
        let container = self.check_target(slot, container)?;

        if let Some(existing) = self.charts.get_mut(&slot) {
            if existing.container == *container && existing.theme == theme {
                existing.surface.clear();
                trace!(slot = %slot, handle = existing.handle_id.raw(), "chart reused");
                return Ok(Acquired {
                    handle_id: existing.handle_id,
                    outcome: AcquireOutcome::Reused,
                });
            }
        }

        let surface = self.backend.init(container, theme)?;
        let handle_id = HandleId::new(self.next_handle);
        self.next_handle += 1;
        let applied = self
            .charts
            .get_mut(&slot)
            .and_then(|previous| previous.applied.take());
        let replaced = self.charts.insert(
            slot,
            ManagedChart {
                handle_id,
                container: container.clone(),
                theme: theme.to_owned(),
                surface,
                applied,
            },
        );

        let outcome = match replaced {
            Some(previous) => {
                debug!(
                    slot = %slot,
                    old = previous.handle_id.raw(),
                    new = handle_id.raw(),
                    "chart recreated"
                );
                self.backend.dispose(previous.surface);
                AcquireOutcome::Recreated
            }
            None => {
                debug!(slot = %slot, handle = handle_id.raw(), theme, "chart created");
                AcquireOutcome::Created
            }
        };

        if !self.deferred_resize_armed {
            self.deferred_resize_armed = true;
            self.deferred_resize_pending = true;
            self.backend.schedule_deferred_resize(self.deferred_resize_delay);
        }
        Ok(Acquired { handle_id, outcome })
    }

    /// Validates `spec` and applies it to the slot's surface as a whole.
    ///
    /// Placeholder specs are applied on a cleared surface so no geometry of
    /// an earlier layout survives. Nothing is touched when validation fails.
    /// When the surface rejects the spec, the last accepted layout is put
    /// back, since `acquire` may already have cleared the surface.
    pub fn apply(&mut self, slot: ChartSlot, spec: &LayoutSpec, mode: ApplyMode) -> DashResult<()> {
        spec.validate()?;
        let chart = self
            .charts
            .get_mut(&slot)
            .ok_or_else(|| DashError::RenderTargetUnavailable {
                chart: slot.as_str().to_owned(),
            })?;
        if spec.is_placeholder() {
            chart.surface.clear();
        }
        if let Err(error) = chart.surface.set_option(spec, mode) {
            warn!(slot = %slot, %error, "chart rejected layout");
            put_back(slot, chart);
            return Err(error);
        }
        chart.applied = Some(spec.clone());
        debug!(
            slot = %slot,
            panes = spec.pane_count(),
            series = spec.series.len(),
            "layout applied"
        );
        Ok(())
    }

    /// Shows `previous` on the slot again, or leaves it cleared when `None`.
    ///
    /// Used to undo an apply that succeeded while its companion chart failed.
    pub fn restore(&mut self, slot: ChartSlot, previous: Option<LayoutSpec>) {
        let Some(chart) = self.charts.get_mut(&slot) else {
            return;
        };
        chart.applied = previous;
        chart.surface.clear();
        put_back(slot, chart);
    }

    #[must_use]
    pub fn applied(&self, slot: ChartSlot) -> Option<&LayoutSpec> {
        self.charts.get(&slot).and_then(|chart| chart.applied.as_ref())
    }

    /// Resizes every registered surface. Returns how many were resized.
    pub fn on_window_resize(&mut self) -> usize {
        for chart in self.charts.values_mut() {
            chart.surface.resize();
        }
        trace!(charts = self.charts.len(), "resize pass");
        self.charts.len()
    }

    /// Runs the deferred pass armed by the first creation; later calls are no-ops.
    pub fn on_deferred_resize(&mut self) -> usize {
        if !self.deferred_resize_pending {
            return 0;
        }
        self.deferred_resize_pending = false;
        self.on_window_resize()
    }

    #[must_use]
    pub fn get(&self, slot: ChartSlot) -> Option<&ManagedChart<B::Surface>> {
        self.charts.get(&slot)
    }

    pub fn surface_mut(&mut self, slot: ChartSlot) -> Option<&mut B::Surface> {
        self.charts.get_mut(&slot).map(|chart| &mut chart.surface)
    }

    #[must_use]
    pub fn handle_id(&self, slot: ChartSlot) -> Option<HandleId> {
        self.charts.get(&slot).map(|chart| chart.handle_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.charts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Disposes every surface; the registry is empty afterwards.
    pub fn teardown(&mut self) {
        for (slot, chart) in self.charts.drain(..) {
            trace!(slot = %slot, handle = chart.handle_id.raw(), "chart disposed");
            self.backend.dispose(chart.surface);
        }
        self.deferred_resize_pending = false;
        debug!("chart registry torn down");
    }
}

/// Re-applies the chart's last accepted layout, if any.
fn put_back<S: ChartSurface>(slot: ChartSlot, chart: &mut ManagedChart<S>) {
    let Some(previous) = chart.applied.as_ref() else {
        return;
    };
    match chart.surface.set_option(previous, ApplyMode::Replace) {
        Ok(()) => debug!(slot = %slot, "previous layout restored"),
        Err(error) => {
            warn!(slot = %slot, %error, "previous layout could not be restored");
            chart.applied = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{AcquireOutcome, ChartInstanceRegistry};
    use crate::core::ChartSlot;
    use crate::error::DashError;
    use crate::render::{
        ApplyMode, AxisKind, AxisSpec, Color, ContainerRef, LayoutSpec, RecordingBackend,
    };

    fn registry() -> ChartInstanceRegistry<RecordingBackend> {
        ChartInstanceRegistry::new(
            RecordingBackend::with_mounted(["fill", "other"]),
            Duration::from_millis(100),
        )
        .expect("registry")
    }

    #[test]
    fn theme_change_recreates_surface() {
        let mut registry = registry();
        let fill = ContainerRef::new("fill");
        let first = registry
            .acquire(ChartSlot::Fill, Some(&fill), "light")
            .expect("first");
        let second = registry
            .acquire(ChartSlot::Fill, Some(&fill), "dark")
            .expect("second");
        assert_eq!(second.outcome, AcquireOutcome::Recreated);
        assert_ne!(first.handle_id, second.handle_id);
        assert_eq!(registry.backend().disposed.len(), 1);
    }

    #[test]
    fn unmounted_container_is_unavailable() {
        let mut registry = registry();
        let error = registry
            .acquire(ChartSlot::Time, Some(&ContainerRef::new("missing")), "light")
            .expect_err("unmounted container must fail");
        assert!(matches!(
            error,
            DashError::RenderTargetUnavailable { ref chart } if chart == "timeChart"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn deferred_resize_runs_once() {
        let mut registry = registry();
        let fill = ContainerRef::new("fill");
        registry
            .acquire(ChartSlot::Fill, Some(&fill), "light")
            .expect("acquire");
        registry
            .acquire(ChartSlot::Time, Some(&ContainerRef::new("other")), "light")
            .expect("acquire");
        assert_eq!(registry.backend().deferred_resizes, vec![Duration::from_millis(100)]);
        assert_eq!(registry.on_deferred_resize(), 2);
        assert_eq!(registry.on_deferred_resize(), 0);
    }

    #[test]
    fn invalid_spec_leaves_surface_untouched() {
        let mut registry = registry();
        registry
            .acquire(ChartSlot::Fill, Some(&ContainerRef::new("fill")), "light")
            .expect("acquire");
        let mut spec = LayoutSpec::placeholder(Color::TRANSPARENT);
        spec.x_axis.push(AxisSpec::new(AxisKind::Time).with_grid_index(3));
        assert!(registry.apply(ChartSlot::Fill, &spec, ApplyMode::Replace).is_err());
        let surface = registry.get(ChartSlot::Fill).expect("chart").surface();
        assert!(surface.current().is_none());
    }

    #[test]
    fn teardown_disposes_everything() {
        let mut registry = registry();
        registry
            .acquire(ChartSlot::Fill, Some(&ContainerRef::new("fill")), "light")
            .expect("acquire");
        registry.teardown();
        assert!(registry.is_empty());
        assert_eq!(registry.backend().disposed.len(), 1);
    }
}
