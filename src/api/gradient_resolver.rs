use crate::render::{Color, LinearGradient, RenderableColor};

use super::StyleConfig;

/// Fill used for tokens the style config does not define.
pub const FALLBACK_COLOR: Color = Color::from_static("blue");

/// Resolves a color token to a top-to-bottom gradient from the style config.
///
/// Unknown tokens are a normal case and resolve to [`FALLBACK_COLOR`].
#[must_use]
pub fn resolve_gradient(token: &str, style: &StyleConfig) -> RenderableColor {
    match style.colors.get(token) {
        Some(stops) if !stops.is_empty() => {
            RenderableColor::Gradient(LinearGradient::top_to_bottom(stops.clone()))
        }
        _ => RenderableColor::Solid(FALLBACK_COLOR),
    }
}

/// Resolves every token in order; the result is indexed positionally.
#[must_use]
pub fn resolve_palette<S: AsRef<str>>(tokens: &[S], style: &StyleConfig) -> Vec<RenderableColor> {
    tokens
        .iter()
        .map(|token| resolve_gradient(token.as_ref(), style))
        .collect()
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::{FALLBACK_COLOR, resolve_gradient, resolve_palette};
    use crate::api::StyleConfig;
    use crate::render::{Color, GradientStop, RenderableColor};

    fn style() -> StyleConfig {
        StyleConfig::default().with_gradient(
            "warn",
            smallvec![
                GradientStop::new(0.0, Color::from_static("#ffe082")),
                GradientStop::new(1.0, Color::from_static("#ff8f00")),
            ],
        )
    }

    #[test]
    fn known_token_resolves_to_vertical_gradient() {
        let RenderableColor::Gradient(gradient) = resolve_gradient("warn", &style()) else {
            panic!("expected gradient");
        };
        assert_eq!(gradient.color_stops.len(), 2);
        assert_eq!((gradient.x, gradient.y, gradient.x2, gradient.y2), (0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn unknown_token_resolves_to_fallback() {
        assert_eq!(
            resolve_gradient("unknown", &style()),
            RenderableColor::Solid(FALLBACK_COLOR)
        );
        assert_eq!(
            resolve_gradient("warn", &StyleConfig::default()),
            RenderableColor::Solid(FALLBACK_COLOR)
        );
    }

    #[test]
    fn palette_keeps_token_order() {
        let palette = resolve_palette(&["nope", "warn"], &style());
        assert!(!palette[0].is_gradient());
        assert!(palette[1].is_gradient());
    }
}
