mod chart_registry;
mod dashboard;
mod dashboard_config;
mod fill_level_builder;
mod gradient_resolver;
mod json_contract;
mod request_tracker;
mod style_config;
mod theme_resolver;
mod time_series_layout;

pub use chart_registry::{AcquireOutcome, Acquired, ChartInstanceRegistry, ManagedChart};
pub use dashboard::{
    ChartContainers, Dashboard, RenderOutcome, fetch_series_set, fetch_snapshot,
};
pub use dashboard_config::DashboardConfig;
pub use fill_level_builder::{FillOverlay, build_fill_level_layout};
pub use gradient_resolver::{FALLBACK_COLOR, resolve_gradient, resolve_palette};
pub use json_contract::{
    DASHBOARD_CONFIG_JSON_SCHEMA_V1, DashboardConfigJsonContractV1, LAYOUT_JSON_SCHEMA_V1,
    LayoutJsonContractV1,
};
pub use request_tracker::{RequestGroup, RequestTicket, RequestTracker};
pub use style_config::StyleConfig;
pub use theme_resolver::{
    COLOR_SCHEME_ENV, EnvPreference, FixedPreference, PreferenceSource, ResolvedTheme,
    ThemeResolver, ThemeVariant,
};
pub use time_series_layout::{
    SeriesMode, TIME_LABEL_FORMAT, build_time_series_layout, pane_ids,
};
