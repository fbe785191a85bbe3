use std::sync::Arc;

use bodyner_core::annotation::parse_export;
use bodyner_core::{Lexicon, Matcher, Reconciler, RuleAnalyzer, TextAnalyzer};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

const POSTS: &[&str] = &[
    "My knee hurts and my wrist too.",
    "Pigeon pose opens the hips but my lower back always complains afterwards.",
    "Does anyone else get cramps in their calves and feet during warrior two?",
    "Keep your shoulders away from your ears and press through the palms.",
    "I finally touched my toes today!!",
];

fn bench_matcher(c: &mut Criterion) {
    let analyzer = RuleAnalyzer::new().unwrap();
    let matcher = Matcher::new(Arc::new(Lexicon::body_parts()));

    c.bench_function("analyze_and_match_single", |b| {
        b.iter(|| matcher.find(&analyzer.analyze(black_box(POSTS[0]))));
    });

    c.bench_function("analyze_and_match_batch_5", |b| {
        b.iter(|| {
            for post in POSTS {
                let _ = matcher.find(&analyzer.analyze(black_box(post)));
            }
        });
    });
}

fn bench_reconciler(c: &mut Criterion) {
    let tasks: Vec<_> = (0..200)
        .map(|i| {
            json!({
                "id": i,
                "data": { "reddit": POSTS[0] },
                "completions": [{ "result": [
                    { "value": { "start": 3, "end": 7, "labels": ["BODY_PART"] } },
                    { "value": { "start": 21, "end": 26, "labels": ["BODY_PART"] } }
                ] }]
            })
        })
        .collect();
    let tasks = parse_export(&json!(tasks).to_string()).unwrap();
    let reconciler = Reconciler::new(Arc::new(RuleAnalyzer::new().unwrap()), "reddit");

    c.bench_function("reconcile_200_tasks", |b| {
        b.iter(|| reconciler.reconcile_tasks(black_box(&tasks)));
    });
}

criterion_group!(benches, bench_matcher, bench_reconciler);
criterion_main!(benches);
