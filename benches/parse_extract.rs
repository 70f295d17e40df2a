//! Benchmarks for marker parsing, anchor detection and retrieval.
//!
//! Benchmark targets:
//! - Parsing a paragraph: <100us
//! - Anchor extraction on a paragraph: <500us
//! - Cascade search over 1,000 entries: <20ms

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use waymark::models::{ConversationEntry, EntryId, NewEntry, RetrievalRequest};
use waymark::storage::InMemoryStore;
use waymark::{AnchorDetector, RetrievalEngine, facets, parse};

const PLAIN: &str = "We looked at the logs and nothing stood out yet.";
const ANNOTATED: &str = "I am {state:analytical} about this problem [context:storage] \
    &pattern:retry|backoff| We decided to use PostgreSQL because it handles our \
    write load. → This solved our performance issues. Should we shard the users table? \
    {state:weighted|focused[0.7]|tired[0.3]|} {branch:alpha|explore} ⇉ →merge{branch:alpha}";

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, text) in [("plain", PLAIN), ("annotated", ANNOTATED)] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| parse(black_box(text)));
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let detector = AnchorDetector::default();
    let mut group = c.benchmark_group("extract_anchors");
    for (name, text) in [("plain", PLAIN), ("annotated", ANNOTATED)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| detector.extract(black_box(text)));
        });
    }
    group.bench_function("facets", |b| {
        b.iter(|| facets::extract(black_box("[type:analysis] [insight:meta] &pattern:loop@active@")));
    });
    group.finish();
}

fn engine_with(count: usize) -> RetrievalEngine {
    let detector = AnchorDetector::default();
    let now = Utc::now();
    let entries = (0..count).map(|i| {
        let text = if i % 3 == 0 { ANNOTATED } else { PLAIN };
        ConversationEntry::from_new(
            NewEntry::new(text, parse(text)).with_anchors(detector.extract(text)),
            EntryId::new(format!("entry-{i:05}")),
            now - Duration::seconds(i64::try_from(i).unwrap()),
        )
    });
    RetrievalEngine::new(Arc::new(InMemoryStore::with_entries(entries)))
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for count in [100, 1_000] {
        let engine = engine_with(count);
        for (name, query) in [("content", "postgresql"), ("state", "analyzing"), ("miss", "kubernetes")] {
            let request = RetrievalRequest::new(query).with_max_tokens(500);
            group.bench_with_input(BenchmarkId::new(name, count), &request, |b, request| {
                b.iter(|| engine.search(black_box(request)).unwrap());
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_extract, bench_search);
criterion_main!(benches);
