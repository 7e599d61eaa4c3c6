mod layout_spec;
mod primitives;
mod recording;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use layout_spec::{
    AxisKind, AxisLabelSpec, AxisLineSpec, AxisSpec, BarItem, Empty, GridSpec, ItemStyle,
    LayoutSpec, LegendSpec, LineStyle, Orientation, Percent, SeriesData, SeriesKind, SeriesSpec,
    SymbolKind, TextAlign, TextStyle, TitleSpec, TitleTextStyle, ToolboxSpec, TooltipSpec,
    TooltipTrigger, Visibility, ZoomControlSpec,
};
pub use primitives::{
    Color, GradientKind, GradientStop, GradientStops, LineStrokeStyle, LinearGradient,
    RenderableColor,
};
pub use recording::{RecordingBackend, RecordingSurface, SurfaceCall};

use crate::error::DashResult;
use crate::interaction::ZoomCommand;

/// Registry-assigned identity of one live surface.
///
/// A new id is issued whenever a surface is (re)created, so listeners can
/// tell a reused surface from a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(u64);

impl HandleId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Reference to the page region a chart is drawn into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerRef(String);

impl ContainerRef {
    #[must_use]
    pub fn new(element_id: impl Into<String>) -> Self {
        Self(element_id.into())
    }

    #[must_use]
    pub fn element_id(&self) -> &str {
        &self.0
    }
}

/// How a spec is merged into what the surface already shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Discard every existing component and series (`notMerge`).
    Replace,
    /// Merge by component index; only for updates that keep the pane count.
    Merge,
}

/// Contract of the charting library that owns the actual drawing surfaces.
///
/// Implementations bridge to a browser chart library or stay headless; the
/// engine never touches the DOM directly.
pub trait ChartBackend {
    type Surface: ChartSurface;

    /// Whether the container exists and is attached to the page.
    fn is_mounted(&self, container: &ContainerRef) -> bool;

    /// Creates a surface bound to `container`, styled with the named theme.
    fn init(&mut self, container: &ContainerRef, theme: &str) -> DashResult<Self::Surface>;

    fn dispose(&mut self, surface: Self::Surface);

    /// Subscribes the host's window-resize notifications.
    fn subscribe_resize(&mut self) -> DashResult<()>;

    /// Requests one deferred resize pass after `delay`.
    fn schedule_deferred_resize(&mut self, delay: Duration);
}

/// One live chart surface.
pub trait ChartSurface {
    fn set_option(&mut self, spec: &LayoutSpec, mode: ApplyMode) -> DashResult<()>;

    /// Removes all series and components, keeping the container binding.
    fn clear(&mut self);

    fn resize(&mut self);

    fn dispatch_zoom(&mut self, command: &ZoomCommand) -> DashResult<()>;

    /// Starts forwarding user zoom gestures of this surface to the host.
    fn subscribe_zoom(&mut self) -> DashResult<()>;
}
