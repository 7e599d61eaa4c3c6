mod pane;
mod series;
mod slot;
mod snapshot;
mod status;
pub mod time;

pub use pane::{PaneGeometry, PaneId, ZoomControlId, ZoomControlKind, partition_panes};
pub use series::{SensorSeries, SeriesPoint, TimeSeriesSet};
pub use slot::ChartSlot;
pub use snapshot::{SensorEntry, SensorSnapshot, SnapshotPayload};
pub use status::SensorStatus;
pub use time::{RangeRequest, TimeRange, WireInstant};
