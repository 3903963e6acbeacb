//! Performance benchmarks for the overtime classifier.
//!
//! - Segmenting a multi-day interval
//! - Classifying a weekday evening against the global schedule
//! - Classifying an overnight run that crosses into a holiday
//! - Classify requests end to end through the router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use time_ledger::api::{AppState, create_router};
use time_ledger::calculation::{HolidayCalendar, OvertimeRules, classify_interval, segment_interval};
use time_ledger::config::{ConfigLoader, LedgerConfig};
use time_ledger::engine::Engine;
use time_ledger::models::{ResolvedSchedule, ScheduleSource};
use time_ledger::store::MemoryStore;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> LedgerConfig {
    ConfigLoader::load("./config/default")
        .expect("Failed to load config")
        .config()
        .clone()
}

fn datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn global_schedule(date: &str) -> ResolvedSchedule {
    ResolvedSchedule {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        entry_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        exit_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        tolerance_minutes: 10,
        requires_justification: true,
        source: ScheduleSource::Global,
    }
}

/// Benchmark: segmentation of intervals of growing length.
fn bench_segmentation(c: &mut Criterion) {
    let config = load_config();
    let night = config.policy().night_window;
    let start = datetime("2025-01-06 06:00:00");

    let mut group = c.benchmark_group("segment_interval");
    for days in [1_i64, 7, 31] {
        let end = start + chrono::Duration::days(days);
        group.throughput(Throughput::Elements(days as u64));
        group.bench_with_input(BenchmarkId::from_parameter(days), &end, |b, end| {
            b.iter(|| black_box(segment_interval(black_box(start), *end, &night)))
        });
    }
    group.finish();
}

/// Benchmark: classification of typical intervals.
fn bench_classification(c: &mut Criterion) {
    let config = load_config();
    let calendar = HolidayCalendar::new(config.holidays().to_vec());
    let rules = OvertimeRules {
        policy: config.policy(),
        calendar: &calendar,
    };

    let weekday = global_schedule("2025-01-06");
    c.bench_function("classify_weekday_evening", |b| {
        b.iter(|| {
            black_box(classify_interval(
                datetime("2025-01-06 08:30:00"),
                datetime("2025-01-06 23:00:00"),
                Some(&weekday),
                &rules,
            ))
        })
    });

    // Wednesday 2025-09-17 into the 18th and 19th
    let eve = global_schedule("2025-09-17");
    c.bench_function("classify_overnight_into_holiday", |b| {
        b.iter(|| {
            black_box(classify_interval(
                datetime("2025-09-17 09:00:00"),
                datetime("2025-09-18 14:00:00"),
                Some(&eve),
                &rules,
            ))
        })
    });
}

/// Benchmark: classify requests through the router, one new source per call.
fn bench_classify_route(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = load_config();
    let engine = Engine::from_config(Arc::new(MemoryStore::new()), &config)
        .expect("Failed to seed engine");
    let router = create_router(AppState::new(engine));
    let counter = AtomicU64::new(0);

    c.bench_function("classify_route", |b| {
        b.to_async(&rt).iter(|| async {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            let body = serde_json::json!({
                "employee_id": "emp_001",
                "source": {"type": "manual", "manual_entry_id": format!("bench-{}", n)},
                "start": "2025-01-06T18:00:00",
                "end": "2025-01-06T23:30:00",
                "reason": "benchmark"
            });
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/overtime/classify")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_segmentation,
    bench_classification,
    bench_classify_route,
);
criterion_main!(benches);
