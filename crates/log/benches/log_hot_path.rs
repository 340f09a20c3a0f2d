//! Throughput of the hot path: emitting an event through an already-built
//! subscriber.
//!
//! Only one format is benchmarked per process — `LoggerBuilder::build`
//! installs a process-global subscriber, so switching formats mid-run would
//! mean a second (panicking) global init.

use criterion::{Criterion, criterion_group, criterion_main};
use nebula_log::Config;

fn bench_compact_event(c: &mut Criterion) {
    let config = Config {
        level: "info".to_string(),
        ..Config::default()
    };
    let _guard = nebula_log::init_with(config).expect("logger init");

    c.bench_function("log_event_compact", |b| {
        b.iter(|| {
            tracing::info!(request_id = "req-1", count = 42, "handled request");
        });
    });
}

criterion_group!(benches, bench_compact_event);
criterion_main!(benches);
