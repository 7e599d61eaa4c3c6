use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::render::Color;

use super::StyleConfig;

/// Environment variable read by [`EnvPreference`].
pub const COLOR_SCHEME_ENV: &str = "TANK_CHARTS_COLOR_SCHEME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    Light,
    Dark,
}

impl ThemeVariant {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Source of the viewer's light/dark preference.
pub trait PreferenceSource {
    /// `None` when the environment expresses no preference.
    fn color_scheme(&self) -> Option<ThemeVariant>;
}

/// Preference pinned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPreference(pub ThemeVariant);

impl PreferenceSource for FixedPreference {
    fn color_scheme(&self) -> Option<ThemeVariant> {
        Some(self.0)
    }
}

/// Preference read from [`COLOR_SCHEME_ENV`] on every resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvPreference;

impl PreferenceSource for EnvPreference {
    fn color_scheme(&self) -> Option<ThemeVariant> {
        std::env::var(COLOR_SCHEME_ENV)
            .ok()
            .and_then(|raw| ThemeVariant::parse(&raw))
    }
}

/// Palette decided for one rebuild; passed explicitly into the builders.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTheme {
    pub palette_variant: ThemeVariant,
    /// Chart-library theme name taken from the style config.
    pub plot_theme: String,
    pub line_color: Color,
    pub background_color: Color,
}

impl ResolvedTheme {
    #[must_use]
    pub fn for_variant(variant: ThemeVariant, style: &StyleConfig) -> Self {
        let (line_color, background_color) = match variant {
            ThemeVariant::Light => (
                Color::from_static("#333333"),
                Color::from_static("rgba(255,255,255,0)"),
            ),
            ThemeVariant::Dark => (
                Color::from_static("#e6e6e6"),
                Color::from_static("#100c2a"),
            ),
        };
        Self {
            palette_variant: variant,
            plot_theme: style.theme_name(variant).to_owned(),
            line_color,
            background_color,
        }
    }
}

/// Decides light/dark from the environment. Nothing is cached, so a
/// preference change is picked up by the next rebuild.
#[derive(Debug, Clone, Default)]
pub struct ThemeResolver<P> {
    preference: P,
}

impl<P: PreferenceSource> ThemeResolver<P> {
    #[must_use]
    pub fn new(preference: P) -> Self {
        Self { preference }
    }

    #[must_use]
    pub fn resolve(&self, style: &StyleConfig) -> ResolvedTheme {
        let variant = self.preference.color_scheme().unwrap_or(ThemeVariant::Light);
        debug!(variant = ?variant, "theme resolved");
        ResolvedTheme::for_variant(variant, style)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{FixedPreference, PreferenceSource, ThemeResolver, ThemeVariant};
    use crate::api::StyleConfig;

    struct Toggle(Cell<ThemeVariant>);

    impl PreferenceSource for Toggle {
        fn color_scheme(&self) -> Option<ThemeVariant> {
            Some(self.0.get())
        }
    }

    #[test]
    fn dark_preference_selects_dark_bundle() {
        let style = StyleConfig::default();
        let theme = ThemeResolver::new(FixedPreference(ThemeVariant::Dark)).resolve(&style);
        assert_eq!(theme.palette_variant, ThemeVariant::Dark);
        assert_eq!(theme.plot_theme, style.plot_theme_dark);
    }

    #[test]
    fn every_resolution_rereads_preference() {
        let style = StyleConfig::default();
        let resolver = ThemeResolver::new(Toggle(Cell::new(ThemeVariant::Light)));
        let first = resolver.resolve(&style);
        resolver.preference.0.set(ThemeVariant::Dark);
        let second = resolver.resolve(&style);
        assert_eq!(first.palette_variant, ThemeVariant::Light);
        assert_eq!(second.palette_variant, ThemeVariant::Dark);
        assert_ne!(first.background_color, second.background_color);
    }

    #[test]
    fn variant_parsing_ignores_case() {
        assert_eq!(ThemeVariant::parse(" Dark "), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::parse("sepia"), None);
    }
}
