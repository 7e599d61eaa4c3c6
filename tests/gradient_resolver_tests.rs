use proptest::prelude::*;
use smallvec::smallvec;
use tank_charts::api::{FALLBACK_COLOR, StyleConfig, resolve_gradient, resolve_palette};
use tank_charts::render::{Color, GradientStop, RenderableColor};

fn style() -> StyleConfig {
    StyleConfig::default()
        .with_gradient(
            "warn",
            smallvec![
                GradientStop::new(0.0, Color::from_static("#ffe082")),
                GradientStop::new(1.0, Color::from_static("#ff8f00")),
            ],
        )
        .with_gradient(
            "alarm",
            smallvec![
                GradientStop::new(0.0, Color::from_static("#ef9a9a")),
                GradientStop::new(1.0, Color::from_static("#c62828")),
            ],
        )
}

#[test]
fn warn_token_resolves_to_its_two_stops() {
    let RenderableColor::Gradient(gradient) = resolve_gradient("warn", &style()) else {
        panic!("expected gradient");
    };
    assert_eq!(gradient.color_stops.len(), 2);
    assert_eq!(gradient.color_stops[0].color, Color::from_static("#ffe082"));
    assert_eq!(gradient.color_stops[1].color, Color::from_static("#ff8f00"));
}

#[test]
fn style_loaded_from_json_drives_resolution() {
    let style = StyleConfig::from_json_str(
        r##"{
            "plotTheme": "light",
            "plotThemeDark": "dark",
            "colors": {
                "normal": [
                    {"offset": 0.0, "color": "#83bff6"},
                    {"offset": 1.0, "color": "#188df0"}
                ]
            }
        }"##,
    )
    .expect("style");
    assert!(resolve_gradient("normal", &style).is_gradient());
    assert_eq!(
        resolve_gradient("alarm", &style),
        RenderableColor::Solid(FALLBACK_COLOR)
    );
}

proptest! {
    #[test]
    fn unknown_tokens_resolve_to_fallback(token in "[a-z]{1,12}") {
        prop_assume!(token != "warn" && token != "alarm");
        prop_assert_eq!(resolve_gradient(&token, &style()), RenderableColor::Solid(FALLBACK_COLOR));
    }

    #[test]
    fn palette_is_positional(tokens in prop::collection::vec(
        prop_oneof![Just("warn"), Just("alarm"), Just("normal"), Just("decrepated")],
        0..16,
    )) {
        let palette = resolve_palette(&tokens, &style());
        prop_assert_eq!(palette.len(), tokens.len());
        for (token, color) in tokens.iter().zip(&palette) {
            prop_assert_eq!(color.is_gradient(), *token == "warn" || *token == "alarm");
        }
    }
}
