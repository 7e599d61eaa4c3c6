//! tank-charts: chart layouts for tank fill-level dashboards.
//!
//! The crate turns sensor snapshots and time series into declarative,
//! ECharts-compatible layout specs, owns the lifecycle of the chart handles
//! they are applied to, and keeps paired value/derivative charts zoomed in
//! lockstep. Fetching, DOM access and drawing stay behind traits.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod source;
pub mod telemetry;

pub use api::{ChartContainers, Dashboard, DashboardConfig, StyleConfig};
pub use render::LayoutSpec;
pub use error::{DashError, DashResult};
