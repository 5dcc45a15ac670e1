//! 过滤解析器性能基准测试
//!
//! 覆盖叶子展开、单值匹配和完整规则集解析。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use filter_engine::{
    Condition, FilterResolver, FilterValues, MatchMode, Modifiers, NotificationEvent, Rule,
    match_condition, match_value,
};
use serde_json::{Value, json};
use std::hint::black_box;

fn create_event() -> NotificationEvent {
    serde_json::from_value(json!({
        "notification_type": "MEDIA_PENDING",
        "media": {"media_type": "tv", "tmdbId": "94605", "status": "PENDING", "status4k": "UNKNOWN"},
        "request": {"request_id": "13", "requestedBy_username": "user2"},
        "extra": [{"name": "Requested Seasons", "value": "1, 2"}]
    }))
    .expect("valid event")
}

fn create_record() -> Value {
    json!({
        "id": 94605,
        "originalName": "Arcane",
        "originalLanguage": "en",
        "genres": [
            {"id": 16, "name": "Animation"},
            {"id": 10765, "name": "Sci-Fi & Fantasy"},
            {"id": 10759, "name": "Action & Adventure"}
        ],
        "networks": [{"id": 213, "name": "Netflix"}],
        "contentRatings": {"results": [{"iso_3166_1": "US", "rating": "TV-14"}]},
        "keywords": [
            {"id": 2343, "name": "magic"},
            {"id": 9715, "name": "superhero"},
            {"id": 210024, "name": "anime"}
        ]
    })
}

/// 生成 n 条不会命中的规则，最后一条命中
fn create_rules(n: usize) -> Vec<Rule> {
    let mut rules: Vec<Rule> = (0..n.saturating_sub(1))
        .map(|i| {
            let mut rule: Rule = serde_json::from_value(json!({
                "media_type": "tv",
                "conditions": {
                    "keywords": {"exclude": "anime"},
                    "originalLanguage": format!("lang-{}", i)
                },
                "apply": format!("sonarr-{}", i)
            }))
            .expect("valid rule");
            rule.conditions.insert(
                "genres".to_string(),
                Condition::Modifiers(Modifiers::default().with_include(FilterValues::one("drama"))),
            );
            rule
        })
        .collect();

    rules.push(
        serde_json::from_value(json!({
            "media_type": "tv",
            "conditions": {"genres": "animation", "keywords": {"require": "magic"}, "max_seasons": 3},
            "apply": "sonarr-anime"
        }))
        .expect("valid rule"),
    );
    rules
}

/// 单值匹配基准
fn bench_match_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_value");

    let record = create_record();
    let genres = &record["genres"];
    let filter = FilterValues::new(["Animation", "Drama"]);

    group.bench_function("substring", |b| {
        b.iter(|| match_value(black_box(&filter), black_box(genres), MatchMode::Substring))
    });

    group.bench_function("exact", |b| {
        b.iter(|| match_value(black_box(&filter), black_box(genres), MatchMode::Exact))
    });

    let condition = Condition::Modifiers(
        Modifiers::default()
            .with_require(FilterValues::one("animation"))
            .with_include(FilterValues::one("fantasy"))
            .with_exclude(FilterValues::one("horror")),
    );
    group.bench_function("modifiers", |b| {
        b.iter(|| match_condition(black_box(&condition), black_box(genres)))
    });

    group.bench_function("whole_record", |b| {
        b.iter(|| match_value(black_box(&filter), black_box(&record), MatchMode::Substring))
    });

    group.finish();
}

/// 规则数量扩展性基准
fn bench_resolve_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_scaling");

    let event = create_event();
    let record = create_record();

    for size in [1, 10, 50, 100].iter() {
        let rules = create_rules(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| FilterResolver::resolve(black_box(&event), black_box(&record), black_box(&rules)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_match_value, bench_resolve_scaling);
criterion_main!(benches);
