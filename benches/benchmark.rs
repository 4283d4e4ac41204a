use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;
use visual_capture::{BrowserKind, Config, OutputLayout, Resolution};

// Fast settings for all benchmarks
fn configure_fast_group(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_millis(500));
    group.sample_size(20);
}

fn benchmark_config_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");
    configure_fast_group(&mut group);

    group.bench_function("creation", |b| {
        b.iter(|| {
            let config = Config::default();
            black_box(config);
        });
    });

    group.finish();
}

fn benchmark_resolution_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    configure_fast_group(&mut group);

    let inputs = ["1920x1080", "360x640", "not-a-resolution"];

    group.bench_function("parse", |b| {
        b.iter(|| {
            for input in &inputs {
                let result = input.parse::<Resolution>();
                let _ = black_box(result);
            }
        });
    });

    group.finish();
}

fn benchmark_artifact_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("artifact_paths");
    configure_fast_group(&mut group);

    let config = Config::default();
    let layout = OutputLayout::new(&config);

    group.bench_function("screenshot_path", |b| {
        b.iter(|| {
            let path = layout.screenshot_path(
                "Desktop",
                Resolution::new(1920, 1080),
                BrowserKind::Chrome,
            );
            black_box(path);
        });
    });

    group.bench_function("video_path", |b| {
        b.iter(|| {
            let path = layout.video_path(BrowserKind::Chromium);
            black_box(path);
        });
    });

    group.finish();
}

fn benchmark_timestamp(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp");
    configure_fast_group(&mut group);

    group.bench_function("format", |b| {
        b.iter(|| {
            let ts = visual_capture::timestamp();
            black_box(ts);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_config_creation,
    benchmark_resolution_parsing,
    benchmark_artifact_paths,
    benchmark_timestamp
);
criterion_main!(benches);
