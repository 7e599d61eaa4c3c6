use std::hint::black_box;

use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tank_charts::api::{
    DashboardConfig, ResolvedTheme, SeriesMode, StyleConfig, ThemeVariant,
    build_fill_level_layout, build_time_series_layout,
};
use tank_charts::core::{SensorSeries, SensorSnapshot, SeriesPoint, TimeSeriesSet};

fn week_of_samples(panes: usize) -> TimeSeriesSet {
    let start = Utc
        .with_ymd_and_hms(2024, 5, 1, 0, 0, 0)
        .single()
        .expect("valid start");
    let series = (0..panes)
        .map(|pane| {
            let values = (0..1_008)
                .map(|i| {
                    SeriesPoint::new(start + Duration::minutes(10 * i), 120.0 - i as f64 * 0.05)
                        .with_thresholds(140.0, 60.0, 30.0)
                })
                .collect();
            let derivative = (0..1_008)
                .map(|i| {
                    let peak = (i % 144 == 0).then_some(2.5);
                    SeriesPoint::new(start + Duration::minutes(10 * i), -0.3)
                        .with_rolling_avg(-0.25)
                        .with_peaks(peak, None)
                })
                .collect();
            SensorSeries::new(format!("T{pane}"), 150.0)
                .with_value_points(values)
                .with_derivative_points(derivative)
        })
        .collect();
    TimeSeriesSet::new(series).expect("valid set")
}

fn bench_time_series_layout(c: &mut Criterion) {
    let style = StyleConfig::default();
    let theme = ResolvedTheme::for_variant(ThemeVariant::Dark, &style);
    let config = DashboardConfig::default();
    let mut group = c.benchmark_group("time_series_layout_week");
    for panes in [1usize, 4, 12] {
        let set = week_of_samples(panes);
        for mode in [SeriesMode::Value, SeriesMode::Derivative] {
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), panes),
                &set,
                |b, set| {
                    b.iter(|| {
                        build_time_series_layout(Some(black_box(set)), mode, &theme, &config)
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_fill_layout(c: &mut Criterion) {
    let style = StyleConfig::default();
    let theme = ResolvedTheme::for_variant(ThemeVariant::Light, &style);
    let config = DashboardConfig::default();
    let count = 64;
    let snapshot = SensorSnapshot::new(
        (0..count).map(|i| format!("S{i}")).collect(),
        (0..count).map(|i| i as f64).collect(),
        vec!["normal".to_owned(); count],
    )
    .and_then(|s| s.with_warn_thresholds(vec![60.0; count]))
    .and_then(|s| s.with_alarm_thresholds(vec![30.0; count]))
    .expect("valid snapshot");

    c.bench_function("fill_layout_64", |b| {
        b.iter(|| build_fill_level_layout(black_box(&snapshot), &style, &theme, &config))
    });
}

fn bench_option_json(c: &mut Criterion) {
    let style = StyleConfig::default();
    let theme = ResolvedTheme::for_variant(ThemeVariant::Light, &style);
    let spec = build_time_series_layout(
        Some(&week_of_samples(4)),
        SeriesMode::Value,
        &theme,
        &DashboardConfig::default(),
    );
    c.bench_function("time_series_option_json_4_panes", |b| {
        b.iter(|| black_box(&spec).to_option_json_pretty().expect("json"))
    });
}

criterion_group!(
    benches,
    bench_time_series_layout,
    bench_fill_layout,
    bench_option_json
);
criterion_main!(benches);
