use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lineup_core::window::DueWindow;

fn kickoff() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 14)
        .and_then(|d| d.and_hms_opt(15, 0, 0))
        .expect("valid kickoff")
}

fn bench_phase(c: &mut Criterion) {
    let window = DueWindow::default();
    let kickoff = kickoff();
    let probes = [
        kickoff - Duration::hours(1),
        kickoff - Duration::minutes(1),
        kickoff + Duration::minutes(30),
        kickoff + Duration::hours(1),
    ];

    c.bench_function("due_window_phase", |b| {
        b.iter(|| {
            for now in &probes {
                black_box(window.phase(black_box(kickoff), black_box(*now)));
            }
        })
    });
}

criterion_group!(benches, bench_phase);
criterion_main!(benches);
