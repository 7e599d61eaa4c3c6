use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{ChartSlot, PaneId, ZoomControlId, ZoomControlKind};
use crate::error::DashResult;
use crate::render::{ChartSurface, HandleId, LayoutSpec};

/// User zoom/pan gesture reported by one chart's event channel.
///
/// Bounds are window fractions along the control's axis, in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomEvent {
    pub source_axis_id: ZoomControlId,
    pub start_fraction: f64,
    pub end_fraction: f64,
}

impl ZoomEvent {
    #[must_use]
    pub fn new(source_axis_id: ZoomControlId, start_fraction: f64, end_fraction: f64) -> Self {
        Self {
            source_axis_id,
            start_fraction,
            end_fraction,
        }
    }
}

/// Zoom action dispatched to the linked chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomCommand {
    pub target: ZoomControlId,
    pub x_axis_index: usize,
    pub start: f64,
    pub end: f64,
}

/// What the router did with one event.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoomRouteOutcome {
    Dispatched(ZoomCommand),
    /// The event came from a channel other than the source chart.
    NotFromSource,
    /// The control id is not linked, e.g. left over from an older layout.
    UnknownPane,
    /// The target chart has no live surface.
    NoTarget,
}

#[derive(Debug, Clone, PartialEq)]
struct PaneLink {
    target: ZoomControlId,
    x_axis_index: usize,
}

/// Forwards zoom gestures from a source chart to the matching pane of a
/// target chart, in one direction only.
///
/// `handle_event` holds the router exclusively until the target surface has
/// taken the command, so a propagation always completes before the next event
/// is looked at.
#[derive(Debug)]
pub struct ZoomSyncRouter {
    source: ChartSlot,
    target: ChartSlot,
    links: IndexMap<ZoomControlId, PaneLink>,
    attached_to: Option<HandleId>,
}

impl ZoomSyncRouter {
    #[must_use]
    pub fn new(source: ChartSlot, target: ChartSlot) -> Self {
        Self {
            source,
            target,
            links: IndexMap::new(),
            attached_to: None,
        }
    }

    #[must_use]
    pub fn source(&self) -> ChartSlot {
        self.source
    }

    #[must_use]
    pub fn target(&self) -> ChartSlot {
        self.target
    }

    #[must_use]
    pub fn linked_panes(&self) -> Vec<&PaneId> {
        self.links.keys().map(|id| &id.pane).collect()
    }

    /// Rebuilds the pane links from the two freshly built specs.
    ///
    /// Every slider of the source is linked to the slider of the same pane in
    /// the target. Panes present in only one spec stay unlinked.
    pub fn link(&mut self, source_spec: &LayoutSpec, target_spec: &LayoutSpec) {
        let target_sliders: IndexMap<&PaneId, usize> = target_spec
            .zoom_controls(ZoomControlKind::Slider)
            .filter_map(|(id, control)| control.x_axis_index.map(|index| (&id.pane, index)))
            .collect();

        self.links.clear();
        for (source_id, _) in source_spec.zoom_controls(ZoomControlKind::Slider) {
            if let Some(&x_axis_index) = target_sliders.get(&source_id.pane) {
                self.links.insert(
                    source_id.clone(),
                    PaneLink {
                        target: ZoomControlId::slider(source_id.pane.clone()),
                        x_axis_index,
                    },
                );
            }
        }
        debug!(
            source = %self.source,
            target = %self.target,
            links = self.links.len(),
            "zoom links rebuilt"
        );
    }

    /// Forgets every link and subscription, e.g. after the charts are disposed.
    pub fn reset(&mut self) {
        self.links.clear();
        self.attached_to = None;
    }

    /// Subscribes the source surface's zoom channel once per surface.
    ///
    /// Returns `true` when a subscription was made.
    pub fn attach<S: ChartSurface>(
        &mut self,
        handle_id: HandleId,
        source_surface: &mut S,
    ) -> DashResult<bool> {
        if self.attached_to == Some(handle_id) {
            return Ok(false);
        }
        source_surface.subscribe_zoom()?;
        self.attached_to = Some(handle_id);
        trace!(source = %self.source, handle = handle_id.raw(), "zoom listener attached");
        Ok(true)
    }

    /// Decides what to do with an event fired on `channel`'s zoom channel.
    ///
    /// Origin is judged only by the channel, never by the payload.
    pub fn handle_event<S: ChartSurface>(
        &mut self,
        channel: ChartSlot,
        event: &ZoomEvent,
        target_surface: &mut S,
    ) -> DashResult<ZoomRouteOutcome> {
        if channel != self.source {
            trace!(channel = %channel, "zoom event from non-source channel ignored");
            return Ok(ZoomRouteOutcome::NotFromSource);
        }
        let Some(link) = self.links.get(&event.source_axis_id) else {
            debug!(control = %event.source_axis_id, "zoom event for unlinked pane dropped");
            return Ok(ZoomRouteOutcome::UnknownPane);
        };

        let command = ZoomCommand {
            target: link.target.clone(),
            x_axis_index: link.x_axis_index,
            start: event.start_fraction,
            end: event.end_fraction,
        };
        target_surface.dispatch_zoom(&command)?;

        trace!(
            target = %self.target,
            control = %command.target,
            start = command.start,
            end = command.end,
            "zoom propagated"
        );
        Ok(ZoomRouteOutcome::Dispatched(command))
    }
}
