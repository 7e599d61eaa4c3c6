use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Stable identity of one sub-plot, derived from the sensor it shows.
///
/// Value and derivative charts built from the same series set carry the same
/// pane ids, so zoom routing survives changes in pane count or order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(String);

impl PaneId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomControlKind {
    Slider,
    Inside,
}

impl ZoomControlKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slider => "slider",
            Self::Inside => "inside",
        }
    }
}

/// Identifier of one zoom control, carried in the chart option as `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoomControlId {
    pub pane: PaneId,
    pub kind: ZoomControlKind,
}

impl ZoomControlId {
    #[must_use]
    pub fn new(pane: PaneId, kind: ZoomControlKind) -> Self {
        Self { pane, kind }
    }

    #[must_use]
    pub fn slider(pane: PaneId) -> Self {
        Self::new(pane, ZoomControlKind::Slider)
    }

    #[must_use]
    pub fn inside(pane: PaneId) -> Self {
        Self::new(pane, ZoomControlKind::Inside)
    }
}

impl fmt::Display for ZoomControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pane, self.kind.as_str())
    }
}

impl Serialize for ZoomControlId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Horizontal placement of one pane, in percent of the chart width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaneGeometry {
    pub index: usize,
    pub left_pct: f64,
    pub width_pct: f64,
}

impl PaneGeometry {
    #[must_use]
    pub fn center_pct(self) -> f64 {
        self.left_pct + self.width_pct / 2.0
    }

    #[must_use]
    pub fn right_edge_pct(self) -> f64 {
        self.left_pct + self.width_pct
    }
}

/// Splits the chart width into `count` equal columns.
///
/// Pane `i` starts at `origin_pct + i * (100 / count)` and is
/// `width_budget_pct / count` wide, so the budget controls the gutter
/// between neighbouring panes.
#[must_use]
pub fn partition_panes(count: usize, origin_pct: f64, width_budget_pct: f64) -> Vec<PaneGeometry> {
    if count == 0 {
        return Vec::new();
    }

    let stride = 100.0 / count as f64;
    let width = if width_budget_pct.is_finite() && width_budget_pct > 0.0 {
        width_budget_pct / count as f64
    } else {
        0.0
    };
    (0..count)
        .map(|index| PaneGeometry {
            index,
            left_pct: origin_pct + index as f64 * stride,
            width_pct: width,
        })
        .collect()
}
