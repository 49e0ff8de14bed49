use aace_log_router::domain::{Level, LogEvent};
use aace_log_router::rules::{Rule, RuleSet};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn benchmark_admission(c: &mut Criterion) {
    let rules = RuleSet::new(vec![
        Rule::new(Level::Error, "", "", "").unwrap(),
        Rule::new(Level::Verbose, r"aace\..*", "", "").unwrap(),
        Rule::new(Level::Warn, "", "", r".*timeout.*").unwrap(),
    ]);
    let admitted = LogEvent::new(Level::Info, "aace.alexa", "AlexaClient", "dialog started");
    let rejected = LogEvent::new(Level::Info, "navigation", "NavClient", "route updated");

    let mut group = c.benchmark_group("admission");
    group.bench_function("admit_matching_event", |b| {
        b.iter(|| rules.admits(black_box(&admitted)));
    });
    group.bench_function("reject_non_matching_event", |b| {
        b.iter(|| rules.admits(black_box(&rejected)));
    });
    group.finish();
}

fn benchmark_level_only_rule(c: &mut Criterion) {
    let rules = RuleSet::new(vec![Rule::new(Level::Warn, "", "", "").unwrap()]);
    let event = LogEvent::new(Level::Info, "core", "Engine", "below threshold");

    c.bench_function("level_only_reject", |b| {
        b.iter(|| rules.admits(black_box(&event)));
    });
}

criterion_group!(benches, benchmark_admission, benchmark_level_only_rule);
criterion_main!(benches);
