use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{DashError, DashResult};

/// CSS color literal (`"orange"`, `"#1e90ff"`, `"rgba(0,0,0,0)"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(Cow<'static, str>);

impl Color {
    pub const TRANSPARENT: Self = Self::from_static("rgba(0,0,0,0)");

    #[must_use]
    pub const fn from_static(css: &'static str) -> Self {
        Self(Cow::Borrowed(css))
    }

    #[must_use]
    pub fn new(css: impl Into<String>) -> Self {
        Self(Cow::Owned(css.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn validate(&self) -> DashResult<()> {
        if self.0.trim().is_empty() {
            return Err(DashError::InvalidConfig(
                "color literal must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// One color stop of a gradient, `offset` in `0..=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    #[must_use]
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }

    pub fn validate(&self) -> DashResult<()> {
        if !self.offset.is_finite() || !(0.0..=1.0).contains(&self.offset) {
            return Err(DashError::InvalidConfig(format!(
                "gradient stop offset must be finite and in [0, 1], got {}",
                self.offset
            )));
        }
        self.color.validate()
    }
}

pub type GradientStops = SmallVec<[GradientStop; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
}

/// Linear gradient in the bounding box of the shape it fills.
///
/// Coordinates are relative: `(0, 0) -> (0, 1)` runs top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearGradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
    pub color_stops: GradientStops,
}

impl LinearGradient {
    #[must_use]
    pub fn top_to_bottom(stops: GradientStops) -> Self {
        Self {
            kind: GradientKind::Linear,
            x: 0.0,
            y: 0.0,
            x2: 0.0,
            y2: 1.0,
            color_stops: stops,
        }
    }
}

/// Fill of a series item: either a flat color or a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderableColor {
    Solid(Color),
    Gradient(LinearGradient),
}

impl RenderableColor {
    #[must_use]
    pub fn is_gradient(&self) -> bool {
        matches!(self, Self::Gradient(_))
    }
}

impl From<Color> for RenderableColor {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStrokeStyle {
    Solid,
    Dashed,
    Dotted,
}
