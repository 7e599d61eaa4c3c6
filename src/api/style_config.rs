use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};
use crate::render::GradientStops;

use super::ThemeVariant;

/// Static style bundle the dashboard loads once at startup.
///
/// Field names follow the JSON file shipped with the dashboard
/// (`colors`, `plotTheme`, `plotThemeDark`, `APIUrl`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Gradient stop lists keyed by color token.
    #[serde(default)]
    pub colors: IndexMap<String, GradientStops>,
    #[serde(rename = "plotTheme", default = "default_plot_theme")]
    pub plot_theme: String,
    #[serde(rename = "plotThemeDark", default = "default_plot_theme_dark")]
    pub plot_theme_dark: String,
    #[serde(rename = "APIUrl", default)]
    pub api_url: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            colors: IndexMap::new(),
            plot_theme: default_plot_theme(),
            plot_theme_dark: default_plot_theme_dark(),
            api_url: None,
        }
    }
}

impl StyleConfig {
    pub fn from_json_str(input: &str) -> DashResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| DashError::InvalidConfig(format!("failed to parse style config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_gradient(mut self, token: impl Into<String>, stops: GradientStops) -> Self {
        self.colors.insert(token.into(), stops);
        self
    }

    /// Chart-library theme name for the given variant.
    #[must_use]
    pub fn theme_name(&self, variant: ThemeVariant) -> &str {
        match variant {
            ThemeVariant::Light => &self.plot_theme,
            ThemeVariant::Dark => &self.plot_theme_dark,
        }
    }

    pub fn validate(&self) -> DashResult<()> {
        for (token, stops) in &self.colors {
            if stops.is_empty() {
                return Err(DashError::InvalidConfig(format!(
                    "color `{token}` has no gradient stops"
                )));
            }
            for stop in stops {
                stop.validate().map_err(|e| {
                    DashError::InvalidConfig(format!("color `{token}`: {e}"))
                })?;
            }
        }
        if let Some(url) = &self.api_url {
            if url.trim().is_empty() {
                return Err(DashError::InvalidConfig(
                    "APIUrl must not be empty when present".to_owned(),
                ));
            }
        }
        Ok(())
    }
}

fn default_plot_theme() -> String {
    "light".to_owned()
}

fn default_plot_theme_dark() -> String {
    "dark".to_owned()
}
