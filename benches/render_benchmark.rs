//! Rendering benchmarks for the monitoring page
//!
//! Run with: cargo bench

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use smartclass::model::{Device, DeviceFields, DeviceState, DeviceType, StatusLog};
use smartclass::views::{MonitorSnapshot, MonitoringView};

const TYPES: [DeviceType; 4] = [
    DeviceType::Light,
    DeviceType::Door,
    DeviceType::Window,
    DeviceType::MotionSensor,
];

fn fleet(count: usize) -> Vec<Device> {
    (0..count)
        .map(|i| {
            let state = DeviceState::initial(TYPES[i % TYPES.len()]);
            DeviceFields::new(format!("Device {}", i), format!("Room {}", i / 8), state)
                .into_device(i.to_string())
        })
        .collect()
}

fn history(devices: &[Device], count: usize) -> Vec<StatusLog> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let device = &devices[i % devices.len()];
            StatusLog {
                id: i.to_string(),
                device_id: device.id.clone(),
                device_name: device.name.clone(),
                new_status: device.status().to_string(),
                timestamp: now - Duration::seconds(i as i64),
            }
        })
        .collect()
}

fn bench_render_cards(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_cards");
    for count in [10, 100, 1000] {
        let devices = fleet(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &devices, |b, devices| {
            b.iter(|| MonitoringView::render_cards(black_box(devices)))
        });
    }
    group.finish();
}

fn bench_render_log_table(c: &mut Criterion) {
    let devices = fleet(200);
    let mut group = c.benchmark_group("render_log_table");
    for count in [10, 100] {
        let logs = history(&devices, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &logs, |b, logs| {
            b.iter(|| MonitoringView::render_log_table(black_box(logs), black_box(&devices)))
        });
    }
    group.finish();
}

fn bench_render_page(c: &mut Criterion) {
    let devices = fleet(100);
    let snapshot = MonitorSnapshot {
        logs: Ok(history(&devices, 10)),
        devices: Ok(devices),
        fetched_at: Utc::now(),
    };
    let view = MonitoringView::default();

    c.bench_function("render_monitoring_page", |b| {
        b.iter(|| view.render(black_box(&snapshot)))
    });
}

criterion_group!(
    benches,
    bench_render_cards,
    bench_render_log_table,
    bench_render_page
);
criterion_main!(benches);
